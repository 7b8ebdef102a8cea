//! Edit mode for polylines and images.
//!
//! A double click on a polyline or an image toggles edit mode; deselecting
//! it leaves edit mode. Polyline points can be dragged while editing. An
//! image in edit mode shows its whole source as a translucent backdrop and
//! is cropped by dragging its handles, or by dragging the image itself.
//!
//! Cropping works on `left`/`top` as the visible top-left corner and
//! ignores rotation.

use crate::canvas::{Canvas, ENTER_EDITING, EXIT_EDITING, OBJECT_MODIFIED};
use crate::error::{FxError, FxResult};
use crate::geometry::{Origin, translate_to_origin};
use crate::id::ObjectId;
use crate::listeners::ObjectEvent;
use crate::object::{CanvasObject, ObjectKind, bounds_of};
use kurbo::Point;

const BACKDROP_OPACITY: f64 = 0.5;

/// Crop handle on a side or corner of an image in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl CropHandle {
    pub const ALL: [CropHandle; 8] = [
        CropHandle::TopLeft,
        CropHandle::Top,
        CropHandle::TopRight,
        CropHandle::Right,
        CropHandle::BottomRight,
        CropHandle::Bottom,
        CropHandle::BottomLeft,
        CropHandle::Left,
    ];

    fn is_top(self) -> bool {
        matches!(self, CropHandle::TopLeft | CropHandle::Top | CropHandle::TopRight)
    }

    fn is_bottom(self) -> bool {
        matches!(self, CropHandle::BottomLeft | CropHandle::Bottom | CropHandle::BottomRight)
    }

    fn is_left(self) -> bool {
        matches!(self, CropHandle::TopLeft | CropHandle::Left | CropHandle::BottomLeft)
    }

    fn is_right(self) -> bool {
        matches!(self, CropHandle::TopRight | CropHandle::Right | CropHandle::BottomRight)
    }

    /// -1, 0 or 1 per axis, relative to the box center.
    fn unit(self) -> (f64, f64) {
        let x = if self.is_left() {
            -1.0
        } else if self.is_right() {
            1.0
        } else {
            0.0
        };
        let y = if self.is_top() {
            -1.0
        } else if self.is_bottom() {
            1.0
        } else {
            0.0
        };
        (x, y)
    }
}

/// Crop state of an image: `(crop_x, crop_y)`.
fn crop_of(obj: &CanvasObject) -> Option<(f64, f64)> {
    match obj.kind {
        ObjectKind::Image { crop_x, crop_y, .. } => Some((crop_x, crop_y)),
        _ => None,
    }
}

impl Canvas {
    fn editable(&self, id: ObjectId) -> FxResult<bool> {
        let obj = self.object(id).ok_or(FxError::ObjectNotFound(id))?;
        match obj.kind {
            ObjectKind::Polyline { .. } | ObjectKind::Image { .. } if obj.selectable => {
                Ok(obj.editing)
            }
            _ => Err(FxError::Unsupported(id, "edit mode")),
        }
    }

    /// Enter edit mode. Returns false if already editing.
    pub fn enter_editing(&mut self, id: ObjectId) -> FxResult<bool> {
        if self.editable(id)? {
            return Ok(false);
        }
        self.spawn_crop_backdrop(id)?;
        self.set_editing(id, true, ENTER_EDITING);
        Ok(true)
    }

    /// Leave edit mode. Returns false if not editing.
    pub fn exit_editing(&mut self, id: ObjectId) -> FxResult<bool> {
        if !self.editable(id)? {
            return Ok(false);
        }
        let backdrop = self.object_mut(id).and_then(|obj| obj.crop_backdrop.take());
        if let Some(backdrop) = backdrop
            && self.contains(backdrop)
        {
            self.remove(backdrop)?;
        }
        self.set_editing(id, false, EXIT_EDITING);
        Ok(true)
    }

    /// Flip edit mode. Returns the new state.
    pub fn toggle_editing(&mut self, id: ObjectId) -> FxResult<bool> {
        if self.editable(id)? {
            self.exit_editing(id)?;
            Ok(false)
        } else {
            self.enter_editing(id)?;
            Ok(true)
        }
    }

    fn set_editing(&mut self, id: ObjectId, editing: bool, notification: &str) {
        if let Some(obj) = self.object_mut(id) {
            obj.editing = editing;
        }
        log::debug!("{id}: {notification}");
        self.emit_object(id, ObjectEvent::new(notification));
        self.fire(notification, Some(id));
        self.request_redraw();
        self.flush();
    }

    /// Put an uncropped, translucent, unexported copy of an image right
    /// below it. Does nothing for other kinds.
    fn spawn_crop_backdrop(&mut self, id: ObjectId) -> FxResult<()> {
        let obj = self.object(id).ok_or(FxError::ObjectNotFound(id))?;
        let ObjectKind::Image {
            src,
            crop_x,
            crop_y,
            source_width,
            source_height,
        } = &obj.kind
        else {
            return Ok(());
        };
        let mut backdrop = CanvasObject::image(src.clone(), *source_width, *source_height)
            .at(obj.left - crop_x * obj.scale_x, obj.top - crop_y * obj.scale_y)
            .with_origin(obj.origin)
            .with_angle(obj.angle);
        backdrop.scale_x = obj.scale_x;
        backdrop.scale_y = obj.scale_y;
        backdrop.opacity = BACKDROP_OPACITY;
        backdrop.selectable = false;
        backdrop.exclude_from_export = true;

        let idx = self.scene.index_of(id).ok_or(FxError::ObjectNotFound(id))?;
        let parent = self
            .scene
            .parent(idx)
            .ok_or(FxError::Unsupported(id, "edit mode"))?;
        let pos = self.scene.z_index(idx).unwrap_or(0);
        let backdrop = self.insert_node(parent, pos, backdrop)?;
        if let Some(obj) = self.object_mut(id) {
            obj.crop_backdrop = Some(backdrop);
        }
        Ok(())
    }

    /// Drag crop handle `handle` of an image in edit mode to `point`. The
    /// crop window is clamped to the source image.
    pub fn set_crop(&mut self, id: ObjectId, handle: CropHandle, point: Point) -> FxResult<()> {
        self.crop_to(id, handle, point, true)
    }

    /// Re-crop an image in edit mode after it was moved: the visible window
    /// follows the image over its source, which stays in place.
    pub fn drag_crop(&mut self, id: ObjectId) -> FxResult<()> {
        let position = self.object(id).ok_or(FxError::ObjectNotFound(id))?.position();
        self.crop_to(id, CropHandle::TopLeft, position, false)
    }

    /// Where `handle` of an image is drawn, in parent coordinates.
    pub fn crop_handle_position(&self, id: ObjectId, handle: CropHandle) -> FxResult<Point> {
        let obj = self.object(id).ok_or(FxError::ObjectNotFound(id))?;
        let (ux, uy) = handle.unit();
        Ok(obj.center_transform() * Point::new(obj.width / 2.0 * ux, obj.height / 2.0 * uy))
    }

    /// With `resize` the opposite edge stays put and the window grows or
    /// shrinks; without it the window keeps its size and only slides.
    fn crop_to(
        &mut self,
        id: ObjectId,
        handle: CropHandle,
        point: Point,
        resize: bool,
    ) -> FxResult<()> {
        if !self.editable(id)? {
            return Err(FxError::Unsupported(id, "cropping outside edit mode"));
        }
        let backdrop = self
            .object(id)
            .and_then(|obj| obj.crop_backdrop)
            .ok_or(FxError::Unsupported(id, "cropping"))?;
        let source = self.object(backdrop).ok_or(FxError::ObjectNotFound(backdrop))?;
        let (src_left, src_top) = (source.left, source.top);
        let (src_width, src_height) = (source.width, source.height);
        let (src_scale_x, src_scale_y) = (source.scale_x, source.scale_y);

        let obj = self.object_mut(id).ok_or(FxError::ObjectNotFound(id))?;
        let (mut crop_x, mut crop_y) = crop_of(obj).ok_or(FxError::Unsupported(id, "cropping"))?;
        let dims = obj.transformed_dims();

        if handle.is_top() {
            let max_top = src_top + src_height * src_scale_y - if resize { 0.0 } else { dims.y };
            obj.top = point.y.min(max_top).min(obj.top + dims.y).max(src_top);
            let next =
                ((point.y.max(src_top).min(obj.top) - src_top) / src_scale_y).min(src_height);
            if resize {
                obj.height = (obj.height + crop_y - next).min(src_height).max(0.0);
            }
            crop_y = next;
        } else if handle.is_bottom() && resize {
            obj.height = ((point.y - src_top) / src_scale_y - crop_y)
                .min(src_height - crop_y)
                .max(0.0);
        }

        if handle.is_left() {
            let max_left = src_left + src_width * src_scale_x - if resize { 0.0 } else { dims.x };
            obj.left = point.x.min(max_left).min(obj.left + dims.x).max(src_left);
            let next =
                ((point.x.max(src_left).min(obj.left) - src_left) / src_scale_x).min(src_width);
            if resize {
                obj.width = (obj.width + crop_x - next).min(src_width).max(0.0);
            }
            crop_x = next;
        } else if handle.is_right() && resize {
            obj.width = ((point.x - src_left) / src_scale_x - crop_x)
                .min(src_width - crop_x)
                .max(0.0);
        }

        if let ObjectKind::Image {
            crop_x: x, crop_y: y, ..
        } = &mut obj.kind
        {
            *x = crop_x;
            *y = crop_y;
        }
        log::trace!("{id}: crop {crop_x},{crop_y}");

        self.fire(OBJECT_MODIFIED, Some(id));
        self.request_redraw();
        self.flush();
        Ok(())
    }

    /// Move point `index` of a polyline in edit mode to `point` (parent
    /// coordinates). The object's box is refitted around its points without
    /// moving the other points.
    pub fn move_point(&mut self, id: ObjectId, index: usize, point: Point) -> FxResult<()> {
        if !self.editable(id)? {
            return Err(FxError::Unsupported(id, "moving points outside edit mode"));
        }
        let obj = self.object_mut(id).ok_or(FxError::ObjectNotFound(id))?;
        let transform = obj.box_transform();
        let ObjectKind::Polyline { points } = &mut obj.kind else {
            return Err(FxError::Unsupported(id, "point editing"));
        };
        let len = points.len();
        let slot = points
            .get_mut(index)
            .ok_or(FxError::IndexOutOfBounds { index, len })?;
        *slot = transform.inverse() * point;

        let bounds = bounds_of(points);
        let shift = bounds.origin().to_vec2();
        for p in points.iter_mut() {
            *p -= shift;
        }
        let corner = transform * bounds.origin();
        obj.width = bounds.width();
        obj.height = bounds.height();
        let position = translate_to_origin(
            corner,
            Origin::TOP_LEFT,
            obj.origin,
            obj.transformed_dims(),
            obj.angle,
        );
        obj.set_position(position);

        self.fire(OBJECT_MODIFIED, Some(id));
        self.request_redraw();
        self.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasOptions;
    use crate::registry::Registry;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Canvas, ObjectId) {
        let mut canvas = Canvas::new(Rc::new(Registry::new()), CanvasOptions::default());
        let line = CanvasObject::polyline([
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 0.0),
        ]);
        let id = canvas.add(line).unwrap();
        (canvas, id)
    }

    /// A 200x100 image at (50, 50), already in edit mode.
    fn editing_image() -> (Canvas, ObjectId) {
        let mut canvas = Canvas::new(Rc::new(Registry::new()), CanvasOptions::default());
        let id = canvas
            .add(CanvasObject::image("photo.png", 200.0, 100.0).at(50.0, 50.0))
            .unwrap();
        canvas.enter_editing(id).unwrap();
        (canvas, id)
    }

    fn crop(canvas: &Canvas, id: ObjectId) -> (f64, f64, f64, f64, f64, f64) {
        let obj = canvas.object(id).unwrap();
        let (x, y) = crop_of(obj).unwrap();
        (obj.left, obj.top, obj.width, obj.height, x, y)
    }

    #[test]
    fn double_click_toggles_and_deselect_exits() {
        let (mut canvas, id) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in [ENTER_EDITING, EXIT_EDITING] {
            let log = Rc::clone(&log);
            canvas.on(name, move |_, event| log.borrow_mut().push(event.name.clone()));
        }

        canvas.fire_object_event(id, ObjectEvent::new("mousedblclick")).unwrap();
        assert!(canvas.object(id).unwrap().is_editing());

        canvas.set_active_objects(vec![id]).unwrap();
        canvas.set_active_objects(vec![]).unwrap();
        assert!(!canvas.object(id).unwrap().is_editing());
        assert_eq!(*log.borrow(), vec![ENTER_EDITING, EXIT_EDITING]);
    }

    #[test]
    fn move_point_refits_the_box() {
        let (mut canvas, id) = setup();
        assert!(matches!(
            canvas.move_point(id, 0, Point::new(0.0, 0.0)),
            Err(FxError::Unsupported(..))
        ));
        canvas.enter_editing(id).unwrap();
        canvas.move_point(id, 1, Point::new(10.0, -10.0)).unwrap();

        let obj = canvas.object(id).unwrap();
        assert_eq!((obj.left, obj.top, obj.width, obj.height), (0.0, -10.0, 20.0, 10.0));
        assert_eq!(
            obj.absolute_points(),
            vec![Point::new(0.0, 0.0), Point::new(10.0, -10.0), Point::new(20.0, 0.0)]
        );
    }

    #[test]
    fn only_polylines_and_images_edit() {
        let mut canvas = Canvas::new(Rc::new(Registry::new()), CanvasOptions::default());
        let rect = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
        assert!(canvas.enter_editing(rect).is_err());

        let mut locked = CanvasObject::image("a.png", 10.0, 10.0);
        locked.selectable = false;
        let locked = canvas.add(locked).unwrap();
        assert!(matches!(canvas.enter_editing(locked), Err(FxError::Unsupported(..))));
    }

    #[test]
    fn image_edit_mode_shows_the_whole_source_below() {
        let mut canvas = Canvas::new(Rc::new(Registry::new()), CanvasOptions::default());
        let mut image = CanvasObject::image("photo.png", 200.0, 100.0)
            .at(80.0, 60.0)
            .with_size(120.0, 40.0);
        image.kind = ObjectKind::Image {
            src: "photo.png".into(),
            crop_x: 30.0,
            crop_y: 10.0,
            source_width: 200.0,
            source_height: 100.0,
        };
        let id = canvas.add(image).unwrap();

        canvas.fire_object_event(id, ObjectEvent::new("mousedblclick")).unwrap();
        assert!(canvas.object(id).unwrap().is_editing());
        let objects = canvas.objects();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1], id);

        let backdrop = canvas.object(objects[0]).unwrap();
        assert_eq!(
            (backdrop.left, backdrop.top, backdrop.width, backdrop.height),
            (50.0, 50.0, 200.0, 100.0)
        );
        assert_eq!(crop_of(backdrop), Some((0.0, 0.0)));
        assert_eq!(backdrop.opacity, BACKDROP_OPACITY);
        assert!(!backdrop.selectable);
        assert_eq!(canvas.to_json()["objects"].as_array().unwrap().len(), 1);

        canvas.fire_object_event(id, ObjectEvent::new("mousedblclick")).unwrap();
        assert!(!canvas.object(id).unwrap().is_editing());
        assert_eq!(canvas.objects(), vec![id]);
    }

    #[test]
    fn side_handles_resize_the_window() {
        let (mut canvas, id) = editing_image();
        canvas.set_crop(id, CropHandle::Left, Point::new(80.0, 60.0)).unwrap();
        assert_eq!(crop(&canvas, id), (80.0, 50.0, 170.0, 100.0, 30.0, 0.0));

        canvas.set_crop(id, CropHandle::Right, Point::new(150.0, 0.0)).unwrap();
        assert_eq!(crop(&canvas, id), (80.0, 50.0, 70.0, 100.0, 30.0, 0.0));

        canvas.set_crop(id, CropHandle::Bottom, Point::new(0.0, 120.0)).unwrap();
        assert_eq!(crop(&canvas, id), (80.0, 50.0, 70.0, 70.0, 30.0, 0.0));
    }

    #[test]
    fn handles_are_clamped_to_the_source() {
        let (mut canvas, id) = editing_image();
        canvas.set_crop(id, CropHandle::TopLeft, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(crop(&canvas, id), (50.0, 50.0, 200.0, 100.0, 0.0, 0.0));

        canvas.set_crop(id, CropHandle::BottomRight, Point::new(900.0, 900.0)).unwrap();
        assert_eq!(crop(&canvas, id), (50.0, 50.0, 200.0, 100.0, 0.0, 0.0));
    }

    #[test]
    fn moving_an_image_in_edit_mode_recrops_it() {
        let (mut canvas, id) = editing_image();
        canvas.set_crop(id, CropHandle::TopLeft, Point::new(100.0, 75.0)).unwrap();
        assert_eq!(crop(&canvas, id), (100.0, 75.0, 150.0, 75.0, 50.0, 25.0));

        canvas
            .update_object(id, |obj| {
                obj.left = 60.0;
                obj.top = 40.0;
            })
            .unwrap();
        canvas.fire_object_event(id, ObjectEvent::new("moving")).unwrap();
        assert_eq!(crop(&canvas, id), (60.0, 50.0, 150.0, 75.0, 10.0, 0.0));

        canvas.update_object(id, |obj| obj.left = 500.0).unwrap();
        canvas.drag_crop(id).unwrap();
        assert_eq!(crop(&canvas, id), (100.0, 50.0, 150.0, 75.0, 50.0, 0.0));
    }

    #[test]
    fn cropping_requires_edit_mode() {
        let (mut canvas, id) = editing_image();
        canvas.exit_editing(id).unwrap();
        assert!(matches!(
            canvas.set_crop(id, CropHandle::Top, Point::new(0.0, 60.0)),
            Err(FxError::Unsupported(..))
        ));
    }

    #[test]
    fn removing_an_editing_image_drops_its_backdrop() {
        let (mut canvas, id) = editing_image();
        assert_eq!(canvas.objects().len(), 2);
        canvas.remove(id).unwrap();
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn handle_positions_follow_the_box() {
        let (canvas, id) = editing_image();
        let corners: Vec<Point> = [CropHandle::TopLeft, CropHandle::Right, CropHandle::Bottom]
            .into_iter()
            .map(|h| canvas.crop_handle_position(id, h).unwrap())
            .collect();
        assert_eq!(
            corners,
            vec![Point::new(50.0, 50.0), Point::new(250.0, 100.0), Point::new(150.0, 150.0)]
        );
    }
}
