//! Built-in shortcut commands.

use crate::config::EditorConfig;
use crate::input::KeyEvent;
use crate::shortcuts::ShortcutRegistry;
use fx_core::{Canvas, FxResult, ObjectId, ObjectKind};

/// Register delete, group/ungroup, nudge, rotate, z-order and select-all.
pub fn install_default_shortcuts(
    registry: &mut ShortcutRegistry,
    config: &EditorConfig,
) -> FxResult<()> {
    registry.register("delete", delete_selection)?;
    registry.register("backspace", delete_selection)?;
    registry.register("ctrl+g", toggle_group)?;
    registry.register("ctrl+a", select_all)?;

    for (key, dx, dy) in [
        ("arrowleft", -1.0, 0.0),
        ("arrowright", 1.0, 0.0),
        ("arrowup", 0.0, -1.0),
        ("arrowdown", 0.0, 1.0),
    ] {
        let (small, large) = (config.move_step, config.move_step_large);
        registry.register(key, move |canvas, _| nudge(canvas, dx * small, dy * small))?;
        registry.register(&format!("{key}+shift"), move |canvas, _| {
            nudge(canvas, dx * large, dy * large)
        })?;
    }

    registry.register("arrowdown+ctrl", |canvas, _| reorder(canvas, Canvas::send_backwards))?;
    registry.register("arrowdown+shift+ctrl", |canvas, _| reorder(canvas, Canvas::send_to_back))?;
    registry.register("arrowup+ctrl", |canvas, _| reorder(canvas, Canvas::bring_forward))?;
    registry.register("arrowup+shift+ctrl", |canvas, _| reorder(canvas, Canvas::bring_to_front))?;

    for (key, sign) in [("arrowleft", -1.0), ("arrowright", 1.0)] {
        let (small, large) = (config.rotate_step, config.rotate_step_large);
        registry.register(&format!("shift+ctrl+{key}"), move |canvas, _| {
            rotate(canvas, sign * small)
        })?;
        registry.register(&format!("alt+ctrl+shift+{key}"), move |canvas, _| {
            rotate(canvas, sign * large)
        })?;
    }
    Ok(())
}

fn delete_selection(canvas: &mut Canvas, _: &KeyEvent) {
    let active = canvas.active_objects().to_vec();
    for id in active {
        if let Err(err) = canvas.remove(id) {
            log::warn!("delete {id}: {err}");
        }
    }
    canvas.discard_active_objects();
}

/// Group a multi-selection, or ungroup a single selected group.
fn toggle_group(canvas: &mut Canvas, _: &KeyEvent) {
    let active = canvas.active_objects().to_vec();
    let result = match active.as_slice() {
        [] => return,
        [single] => {
            let is_group = canvas
                .object(*single)
                .is_some_and(|obj| obj.kind == ObjectKind::Group);
            if !is_group {
                return;
            }
            canvas.ungroup(*single).map(|_| ())
        }
        many => canvas.group(many).map(|_| ()),
    };
    if let Err(err) = result {
        log::warn!("ctrl+g: {err}");
    }
}

fn select_all(canvas: &mut Canvas, _: &KeyEvent) {
    let all: Vec<ObjectId> = canvas
        .objects()
        .into_iter()
        .filter(|id| {
            canvas
                .object(*id)
                .is_some_and(|obj| obj.selectable && !obj.exclude_from_export)
        })
        .collect();
    if let Err(err) = canvas.set_active_objects(all) {
        log::warn!("select all: {err}");
    }
}

fn nudge(canvas: &mut Canvas, dx: f64, dy: f64) {
    for id in canvas.active_objects().to_vec() {
        let moved = canvas.update_object(id, |obj| {
            obj.left += dx;
            obj.top += dy;
        });
        if let Err(err) = moved {
            log::warn!("move {id}: {err}");
        }
    }
}

/// Rotate every selected object around its center.
fn rotate(canvas: &mut Canvas, degrees: f64) {
    for id in canvas.active_objects().to_vec() {
        let rotated = canvas.update_object(id, |obj| {
            let center = obj.center_point();
            obj.angle = (obj.angle + degrees).rem_euclid(360.0);
            obj.set_center_point(center);
        });
        if let Err(err) = rotated {
            log::warn!("rotate {id}: {err}");
        }
    }
}

fn reorder(canvas: &mut Canvas, op: fn(&mut Canvas, ObjectId) -> FxResult<bool>) {
    for id in canvas.active_objects().to_vec() {
        if let Err(err) = op(canvas, id) {
            log::warn!("reorder {id}: {err}");
        }
    }
}
