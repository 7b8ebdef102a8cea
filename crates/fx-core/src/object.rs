//! Canvas objects: geometry, kind, and the two observed descriptor lists.

use crate::animation::{AnimationBinding, AnimationDescriptor};
use crate::error::{FxError, FxResult};
use crate::events::{EventBinding, EventDescriptor};
use crate::geometry::{Origin, rotated_bounds, translate_to_origin};
use crate::id::ObjectId;
use crate::listeners::Listeners;
use crate::observed::ObservedList;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// What an object draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Rect,
    Ellipse,
    /// A wrapping text box.
    #[serde(alias = "textbox")]
    Text { text: String },
    /// Image loading is the host's concern. `width`×`height` is a window
    /// into the `source_width`×`source_height` image, offset by the crop.
    Image {
        src: String,
        #[serde(rename = "cropX", default)]
        crop_x: f64,
        #[serde(rename = "cropY", default)]
        crop_y: f64,
        #[serde(rename = "sourceWidth", default)]
        source_width: f64,
        #[serde(rename = "sourceHeight", default)]
        source_height: f64,
    },
    /// Points are local to the object's unscaled box (top-left at 0,0).
    Polyline { points: Vec<Point> },
    /// Children live in the scene graph, positioned relative to the group center.
    Group,
    /// The scene root. Never exported.
    #[serde(skip)]
    Root,
}

impl ObjectKind {
    /// Prefix used for generated ids.
    pub fn prefix(&self) -> &'static str {
        match self {
            ObjectKind::Rect => "rect",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Text { .. } => "text",
            ObjectKind::Image { .. } => "image",
            ObjectKind::Polyline { .. } => "polyline",
            ObjectKind::Group => "group",
            ObjectKind::Root => "root",
        }
    }
}

/// Origin and angle saved before an animation retranslated the object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OriginSnapshot {
    pub origin: Origin,
    pub angle: f64,
}

/// A single object on (or destined for) a canvas.
///
/// `left`/`top` locate the `origin` anchor. Standalone objects keep their
/// descriptor lists as plain data; adding the object to a canvas binds
/// them.
#[derive(Debug)]
pub struct CanvasObject {
    pub id: ObjectId,
    pub kind: ObjectKind,

    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise.
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub stroke_width: f64,
    pub opacity: f64,
    pub origin: Origin,

    pub fill: Option<String>,
    pub visible: bool,
    pub selectable: bool,
    /// Cursor shown on hover; set while custom events are bound.
    pub hover_cursor: Option<String>,
    /// Skipped by canvas export (shadow clones).
    pub exclude_from_export: bool,

    pub(crate) animations: ObservedList<AnimationDescriptor, AnimationBinding>,
    pub(crate) events: ObservedList<EventDescriptor, EventBinding>,
    pub(crate) listeners: Listeners,
    pub(crate) bound_events: usize,
    pub(crate) before_animation: Option<OriginSnapshot>,
    pub(crate) editing: bool,
    /// Full-size translucent copy shown while an image is cropped.
    pub(crate) crop_backdrop: Option<ObjectId>,
}

impl CanvasObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::with_prefix(kind.prefix()),
            kind,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            stroke_width: 1.0,
            opacity: 1.0,
            origin: Origin::TOP_LEFT,
            fill: None,
            visible: true,
            selectable: true,
            hover_cursor: None,
            exclude_from_export: false,
            animations: ObservedList::new(),
            events: ObservedList::new(),
            listeners: Listeners::default(),
            bound_events: 0,
            before_animation: None,
            editing: false,
            crop_backdrop: None,
        }
    }

    pub fn rect(width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Rect).with_size(width, height)
    }

    pub fn ellipse(width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Ellipse).with_size(width, height)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ObjectKind::Text { text: text.into() })
    }

    /// An uncropped image showing the whole source.
    pub fn image(src: impl Into<String>, source_width: f64, source_height: f64) -> Self {
        Self::new(ObjectKind::Image {
            src: src.into(),
            crop_x: 0.0,
            crop_y: 0.0,
            source_width,
            source_height,
        })
        .with_size(source_width, source_height)
    }

    /// A polyline through absolute canvas points. The object's box is the
    /// points' bounding box.
    pub fn polyline(points: impl IntoIterator<Item = Point>) -> Self {
        let points: Vec<Point> = points.into_iter().collect();
        let bounds = bounds_of(&points);
        let local = points
            .iter()
            .map(|p| *p - bounds.origin().to_vec2())
            .collect();
        Self::new(ObjectKind::Polyline { points: local })
            .at(bounds.x0, bounds.y0)
            .with_size(bounds.width(), bounds.height())
    }

    /// An empty group. Children are added through the canvas.
    pub fn group() -> Self {
        Self::new(ObjectKind::Group)
    }

    pub(crate) fn root() -> Self {
        let mut root = Self::new(ObjectKind::Root);
        root.id = ObjectId::intern("root");
        root.selectable = false;
        root
    }

    // ── Builders ──

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = ObjectId::intern(id);
        self
    }

    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_animation(mut self, descriptor: AnimationDescriptor) -> Self {
        if let Err(descriptor) = self.animations.push_detached(descriptor) {
            log::warn!("{}: dropped animation {:?} on attached object", self.id, descriptor.name);
        }
        self
    }

    pub fn with_event(mut self, descriptor: EventDescriptor) -> Self {
        if let Err(descriptor) = self.events.push_detached(descriptor) {
            log::warn!("{}: dropped event {:?} on attached object", self.id, descriptor.name);
        }
        self
    }

    // ── Descriptor lists ──

    pub fn animations(&self) -> &ObservedList<AnimationDescriptor, AnimationBinding> {
        &self.animations
    }

    pub fn events(&self) -> &ObservedList<EventDescriptor, EventBinding> {
        &self.events
    }

    /// Append an animation to a standalone object. Objects on a canvas are
    /// mutated through [`Canvas::push_animation`](crate::Canvas::push_animation).
    pub fn push_animation(&mut self, descriptor: AnimationDescriptor) -> FxResult<usize> {
        self.animations
            .push_detached(descriptor)
            .map_err(|_| FxError::ObjectAttached(self.id))
    }

    /// Append an event to a standalone object.
    pub fn push_event(&mut self, descriptor: EventDescriptor) -> FxResult<usize> {
        self.events
            .push_detached(descriptor)
            .map_err(|_| FxError::ObjectAttached(self.id))
    }

    pub fn is_attached(&self) -> bool {
        self.animations.is_attached()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Number of subscribers on an object channel.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.listeners.count(channel)
    }

    // ── Geometry ──

    /// Scaled width and height.
    pub fn transformed_dims(&self) -> Vec2 {
        Vec2::new(self.width * self.scale_x, self.height * self.scale_y)
    }

    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Move the anchor to `position`.
    pub fn set_position(&mut self, position: Point) {
        self.left = position.x;
        self.top = position.y;
    }

    /// Position of the point the `origin` anchor would sit on.
    pub fn point_at_origin(&self, origin: Origin) -> Point {
        translate_to_origin(
            self.position(),
            self.origin,
            origin,
            self.transformed_dims(),
            self.angle,
        )
    }

    pub fn center_point(&self) -> Point {
        self.point_at_origin(Origin::CENTER)
    }

    /// Place the object so its center sits at `center`.
    pub fn set_center_point(&mut self, center: Point) {
        let position = translate_to_origin(
            center,
            Origin::CENTER,
            self.origin,
            self.transformed_dims(),
            self.angle,
        );
        self.set_position(position);
    }

    /// Change the anchor without moving the object visually.
    pub fn set_origin_keep_position(&mut self, origin: Origin) {
        let position = self.point_at_origin(origin);
        self.origin = origin;
        self.set_position(position);
    }

    /// Axis-aligned bounds in the parent's coordinate space.
    pub fn bounding_rect(&self) -> Rect {
        rotated_bounds(self.center_point(), self.transformed_dims(), self.angle)
    }

    /// Maps the unscaled local box (top-left at 0,0) into parent space.
    pub fn box_transform(&self) -> Affine {
        let corner = self.point_at_origin(Origin::TOP_LEFT);
        Affine::translate(corner.to_vec2())
            * Affine::rotate(self.angle.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Maps center-relative coordinates (how group children are stored)
    /// into parent space.
    pub fn center_transform(&self) -> Affine {
        Affine::translate(self.center_point().to_vec2())
            * Affine::rotate(self.angle.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Polyline points in parent space. Empty for other kinds.
    pub fn absolute_points(&self) -> Vec<Point> {
        match &self.kind {
            ObjectKind::Polyline { points } => {
                let transform = self.box_transform();
                points.iter().map(|p| transform * *p).collect()
            }
            _ => Vec::new(),
        }
    }

    /// A visual copy for animation purposes: same geometry and kind,
    /// fresh id, no descriptors, never exported or selectable.
    pub(crate) fn shadow_copy(&self) -> Self {
        let mut copy = Self::new(self.kind.clone());
        copy.id = ObjectId::with_prefix("shadow");
        copy.left = self.left;
        copy.top = self.top;
        copy.width = self.width;
        copy.height = self.height;
        copy.angle = self.angle;
        copy.scale_x = self.scale_x;
        copy.scale_y = self.scale_y;
        copy.stroke_width = self.stroke_width;
        copy.opacity = self.opacity;
        copy.origin = self.origin;
        copy.fill = self.fill.clone();
        copy.selectable = false;
        copy.exclude_from_export = true;
        copy
    }
}

/// Bounding box of a point list; zero-sized at the origin when empty.
pub(crate) fn bounds_of(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points[1..]
        .iter()
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
}
