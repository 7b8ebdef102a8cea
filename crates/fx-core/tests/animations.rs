//! Integration tests: declarative animation runs driven by `Canvas::tick`.

mod common;

use common::{assert_close, canvas, canvas_with, modified_log};
use fx_core::{
    AnimationDescriptor, AnimationStrategy, CanvasObject, CanvasOptions, FxError, ObjectEvent,
    Property, Registry, RunPhase,
};
use pretty_assertions::assert_eq;

fn slide(to: f64) -> AnimationDescriptor {
    AnimationDescriptor::tween([(Property::Left, to)]).with_duration(100.0)
}

// ─── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn untriggered_animation_starts_on_add() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).with_duration(1000.0)))
        .unwrap();
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Scheduled));

    canvas.tick(0.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Running));
    assert_close(canvas.object(id).unwrap().left, 0.0);

    canvas.tick(500.0);
    assert_close(canvas.object(id).unwrap().left, 50.0);
    assert!(canvas.take_redraw_request());

    canvas.tick(1000.0);
    assert_close(canvas.object(id).unwrap().left, 100.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Completed));
}

#[test]
fn delay_holds_the_first_leg() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).with_delay(200.0)))
        .unwrap();
    canvas.tick(100.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Scheduled));
    assert_eq!(canvas.object(id).unwrap().left, 0.0);

    canvas.tick(200.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Running));
    canvas.tick(250.0);
    assert_close(canvas.object(id).unwrap().left, 50.0);
}

#[test]
fn easing_shapes_the_tween() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).with_easing("easeInQuad")))
        .unwrap();
    canvas.tick(0.0);
    canvas.tick(50.0);
    assert_close(canvas.object(id).unwrap().left, 25.0);
}

#[test]
fn times_three_runs_exactly_three_legs() {
    let mut canvas = canvas();
    let id = canvas
        .add(
            CanvasObject::rect(10.0, 10.0)
                .with_animation(slide(100.0).starting_at([(Property::Left, 0.0)]).repeat(3)),
        )
        .unwrap();
    canvas.tick(0.0);
    for (now, legs) in [(100.0, 1), (200.0, 2)] {
        canvas.tick(now);
        assert_eq!(canvas.run_iteration(id, 0), Some(legs));
        // Looping without reverse restarts from `from`.
        assert_close(canvas.object(id).unwrap().left, 0.0);
    }
    canvas.tick(300.0);
    assert_eq!(canvas.run_iteration(id, 0), Some(3));
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Completed));
    assert_close(canvas.object(id).unwrap().left, 100.0);

    canvas.tick(1000.0);
    assert_eq!(canvas.run_iteration(id, 0), Some(3));
}

#[test]
fn reverse_ping_pongs_and_ends_on_from() {
    let mut canvas = canvas();
    let id = canvas
        .add(
            CanvasObject::rect(10.0, 10.0).with_animation(
                slide(100.0)
                    .starting_at([(Property::Left, 0.0)])
                    .repeat(4)
                    .reversing(),
            ),
        )
        .unwrap();
    canvas.tick(0.0);
    canvas.tick(100.0);
    assert_close(canvas.object(id).unwrap().left, 100.0);
    canvas.tick(150.0);
    assert_close(canvas.object(id).unwrap().left, 50.0);
    canvas.tick(200.0);
    assert_close(canvas.object(id).unwrap().left, 0.0);
    canvas.tick(300.0);
    assert_close(canvas.object(id).unwrap().left, 100.0);
    canvas.tick(400.0);
    assert_close(canvas.object(id).unwrap().left, 0.0);
    assert_eq!(canvas.run_iteration(id, 0), Some(4));
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Completed));
}

#[test]
fn times_zero_loops_forever() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).repeat(0)))
        .unwrap();
    canvas.tick(0.0);
    for leg in 1..=20 {
        canvas.tick(leg as f64 * 100.0);
    }
    assert_eq!(canvas.run_iteration(id, 0), Some(20));
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Running));
}

// ─── Triggers ───────────────────────────────────────────────────────────

#[test]
fn triggered_animation_waits_and_restarts() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).on_trigger("mousedown")))
        .unwrap();
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Armed));
    assert_eq!(canvas.object(id).unwrap().listener_count("mousedown"), 1);

    canvas.tick(0.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Armed));

    canvas.fire_object_event(id, ObjectEvent::new("mousedown")).unwrap();
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Scheduled));
    canvas.tick(0.0);
    canvas.tick(100.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Completed));

    // Fires again from wherever the object now is.
    canvas.fire_object_event(id, ObjectEvent::new("mousedown")).unwrap();
    assert_eq!(canvas.run_iteration(id, 0), Some(0));
    canvas.tick(100.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Running));
}

#[test]
fn from_is_snapshotted_when_the_timer_fires() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).with_delay(100.0)))
        .unwrap();
    canvas.object_mut(id).unwrap().left = 50.0;

    canvas.tick(100.0);
    canvas.tick(150.0);
    assert_close(canvas.object(id).unwrap().left, 75.0);

    // Removing the descriptor restores the snapshot.
    canvas.remove_animation(id, 0).unwrap();
    assert_close(canvas.object(id).unwrap().left, 50.0);
}

// ─── Abort & teardown ───────────────────────────────────────────────────

#[test]
fn selection_aborts_running_tweens_in_place() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0)))
        .unwrap();
    canvas.tick(0.0);
    canvas.tick(50.0);
    canvas.set_selection_in_progress(true);
    canvas.tick(60.0);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Aborted));
    assert_close(canvas.object(id).unwrap().left, 50.0);

    canvas.set_selection_in_progress(false);
    canvas.tick(200.0);
    assert_close(canvas.object(id).unwrap().left, 50.0);
}

#[test]
fn removal_cancels_the_pending_timer() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).with_delay(1000.0)))
        .unwrap();
    assert_eq!(canvas.pending_timers(), 1);
    canvas.remove_animation(id, 0).unwrap();
    assert_eq!(canvas.pending_timers(), 0);

    canvas.tick(5000.0);
    assert_eq!(canvas.object(id).unwrap().left, 0.0);
}

#[test]
fn removing_the_object_tears_down_its_runs() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0).with_delay(10.0)))
        .unwrap();
    let obj = canvas.remove(id).unwrap();
    assert_eq!(canvas.pending_timers(), 0);
    assert_eq!(obj.animations().len(), 1);
    assert_eq!(obj.animations().bound_count(), 0);
}

// ─── Binding rules ──────────────────────────────────────────────────────

#[test]
fn each_bound_insert_and_remove_fires_modified_once() {
    let mut canvas = canvas();
    let id = canvas.add(CanvasObject::rect(10.0, 10.0)).unwrap();
    let log = modified_log(&mut canvas);

    canvas.push_animation(id, slide(1.0).on_trigger("mouseup")).unwrap();
    canvas.push_animation(id, slide(2.0).on_trigger("mouseup")).unwrap();
    assert_eq!(log.borrow().len(), 2);

    canvas.truncate_animations(id, 0).unwrap();
    assert_eq!(log.borrow().len(), 4);
    assert_eq!(canvas.object(id).unwrap().listener_count("mouseup"), 0);
}

#[test]
fn suppressed_insert_stays_unbound() {
    let mut canvas = canvas();
    let id = canvas.add(CanvasObject::rect(10.0, 10.0)).unwrap();
    let log = modified_log(&mut canvas);

    canvas.set_selection_in_progress(true);
    canvas.push_animation(id, slide(100.0)).unwrap();
    assert_eq!(canvas.run_phase(id, 0), None);
    assert_eq!(canvas.pending_timers(), 0);

    canvas.set_selection_in_progress(false);
    canvas.tick(1000.0);
    assert_eq!(canvas.run_phase(id, 0), None);
    assert_eq!(canvas.object(id).unwrap().left, 0.0);

    canvas.remove_animation(id, 0).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn invalid_descriptor_is_rejected_without_side_effects() {
    let mut canvas = canvas();
    let id = canvas.add(CanvasObject::rect(10.0, 10.0)).unwrap();
    let log = modified_log(&mut canvas);

    let err = canvas
        .push_animation(id, slide(100.0).with_duration(-5.0))
        .unwrap_err();
    assert!(matches!(err, FxError::InvalidAnimationDescriptor(_)));
    let err = canvas
        .push_animation(id, slide(100.0).with_easing("wobble"))
        .unwrap_err();
    assert!(matches!(err, FxError::InvalidAnimationDescriptor(_)));

    assert!(canvas.object(id).unwrap().animations().is_empty());
    assert_eq!(canvas.pending_timers(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn named_factory_resolves_the_descriptor() {
    let mut registry = Registry::new();
    registry.register_animation("nudge", |obj, descriptor| {
        let dx = descriptor
            .data
            .as_ref()
            .and_then(|d| d["dx"].as_f64())
            .unwrap_or(0.0);
        AnimationDescriptor::tween([(Property::Left, obj.left + dx)]).with_duration(100.0)
    });
    let mut canvas = canvas_with(registry, CanvasOptions::default());
    let named = AnimationDescriptor::named("nudge").with_data(serde_json::json!({ "dx": 30 }));
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).at(10.0, 0.0).with_animation(named.clone()))
        .unwrap();
    canvas.tick(0.0);
    canvas.tick(100.0);
    assert_close(canvas.object(id).unwrap().left, 40.0);

    // The stored descriptor is the one that was inserted, not the resolved one.
    assert_eq!(canvas.object(id).unwrap().animations().get(0), Some(&named));
}

#[test]
fn unregistered_name_uses_the_descriptor_as_is() {
    let mut canvas = canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(AnimationDescriptor {
            name: Some("missing".into()),
            ..slide(20.0)
        }))
        .unwrap();
    canvas.tick(0.0);
    canvas.tick(100.0);
    assert_close(canvas.object(id).unwrap().left, 20.0);
}

// ─── Shadow clone strategy ──────────────────────────────────────────────

#[test]
fn shadow_clone_animates_a_copy() {
    let options = CanvasOptions {
        strategy: AnimationStrategy::ShadowClone,
        ..Default::default()
    };
    let mut canvas = canvas_with(Registry::new(), options);
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0)))
        .unwrap();
    canvas.tick(0.0);
    let shadow = canvas.run_shadow(id, 0).unwrap();
    assert_eq!(canvas.objects(), vec![id, shadow]);
    assert!(!canvas.object(id).unwrap().visible);

    canvas.tick(50.0);
    assert_close(canvas.object(shadow).unwrap().left, 50.0);
    assert_eq!(canvas.object(id).unwrap().left, 0.0);
    assert_eq!(canvas.to_json()["objects"].as_array().unwrap().len(), 1);

    canvas.tick(100.0);
    assert!(!canvas.contains(shadow));
    assert!(canvas.object(id).unwrap().visible);
    assert_eq!(canvas.object(id).unwrap().left, 0.0);
}

#[test]
fn shadow_clone_abort_swaps_back() {
    let options = CanvasOptions {
        strategy: AnimationStrategy::ShadowClone,
        ..Default::default()
    };
    let mut canvas = canvas_with(Registry::new(), options);
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0)))
        .unwrap();
    canvas.tick(0.0);
    let shadow = canvas.run_shadow(id, 0).unwrap();
    canvas.set_selection_in_progress(true);
    canvas.tick(10.0);
    assert!(!canvas.contains(shadow));
    assert!(canvas.object(id).unwrap().visible);
    assert_eq!(canvas.run_phase(id, 0), Some(RunPhase::Aborted));
}

fn shadow_canvas() -> fx_core::Canvas {
    let options = CanvasOptions {
        strategy: AnimationStrategy::ShadowClone,
        ..Default::default()
    };
    canvas_with(Registry::new(), options)
}

#[test]
fn dispose_with_the_owner_above_its_shadow() {
    let mut canvas = shadow_canvas();
    let id = canvas
        .add(CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0)))
        .unwrap();
    canvas.tick(0.0);
    let shadow = canvas.run_shadow(id, 0).unwrap();
    canvas.bring_to_front(id).unwrap();
    assert_eq!(canvas.objects(), vec![shadow, id]);

    canvas.dispose();
    assert_eq!(canvas.objects(), vec![id]);
    assert!(canvas.object(id).unwrap().visible);
    assert_eq!(canvas.pending_timers(), 0);
}

#[test]
fn removing_a_group_with_a_shadowed_child() {
    let mut canvas = shadow_canvas();
    let group = canvas.add(CanvasObject::group()).unwrap();
    let id = canvas
        .add_to(group, CanvasObject::rect(10.0, 10.0).with_animation(slide(100.0)))
        .unwrap();
    canvas.tick(0.0);
    let shadow = canvas.run_shadow(id, 0).unwrap();
    canvas.bring_to_front(id).unwrap();
    assert_eq!(canvas.children_of(group), vec![shadow, id]);

    let removed = canvas.remove(group).unwrap();
    assert_eq!(removed.kind, fx_core::ObjectKind::Group);
    assert!(canvas.objects().is_empty());
    assert!(!canvas.contains(id));
    assert!(!canvas.contains(shadow));
}
