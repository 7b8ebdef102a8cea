//! Export and import of objects as JSON.
//!
//! Export reports an animated object as it was before any animation
//! retranslated its origin, so a saved scene reloads in the same place.

use crate::animation::AnimationDescriptor;
use crate::canvas::Canvas;
use crate::error::{FxError, FxResult};
use crate::events::EventDescriptor;
use crate::geometry::{Origin, OriginX, OriginY, translate_to_origin};
use crate::id::ObjectId;
use crate::object::{CanvasObject, ObjectKind};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

/// Serialized form of an object, including its descriptor lists and,
/// for groups, its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSnapshot {
    #[serde(flatten)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default = "one")]
    pub stroke_width: f64,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default)]
    pub origin_x: OriginX,
    #[serde(default)]
    pub origin_y: OriginY,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "yes")]
    pub selectable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<AnimationDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventDescriptor>,
    /// Group children, back to front.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectSnapshot>,
}

impl ObjectSnapshot {
    /// A bare snapshot of `kind` with default geometry.
    pub fn of(kind: ObjectKind) -> Self {
        Self {
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
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
            fill: None,
            visible: true,
            selectable: true,
            animations: Vec::new(),
            events: Vec::new(),
            objects: Vec::new(),
        }
    }
}

impl CanvasObject {
    /// Snapshot without children, with any animation retranslation undone.
    pub fn to_snapshot(&self) -> ObjectSnapshot {
        let (origin, angle, position) = match self.before_animation {
            Some(saved) => (
                saved.origin,
                saved.angle,
                translate_to_origin(
                    self.position(),
                    self.origin,
                    saved.origin,
                    self.transformed_dims(),
                    saved.angle,
                ),
            ),
            None => (self.origin, self.angle, self.position()),
        };
        ObjectSnapshot {
            kind: self.kind.clone(),
            left: position.x,
            top: position.y,
            width: self.width,
            height: self.height,
            angle,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            stroke_width: self.stroke_width,
            opacity: self.opacity,
            origin_x: origin.x,
            origin_y: origin.y,
            fill: self.fill.clone(),
            visible: self.visible,
            selectable: self.selectable,
            animations: self.animations.as_slice().to_vec(),
            events: self.events.as_slice().to_vec(),
            objects: Vec::new(),
        }
    }

    /// A standalone object from a snapshot (children are not included).
    /// The object gets a fresh id.
    pub fn from_snapshot(snapshot: &ObjectSnapshot) -> Self {
        let mut obj = CanvasObject::new(snapshot.kind.clone())
            .at(snapshot.left, snapshot.top)
            .with_size(snapshot.width, snapshot.height)
            .with_angle(snapshot.angle)
            .with_origin(Origin::new(snapshot.origin_x, snapshot.origin_y));
        obj.scale_x = snapshot.scale_x;
        obj.scale_y = snapshot.scale_y;
        obj.stroke_width = snapshot.stroke_width;
        obj.opacity = snapshot.opacity;
        obj.fill = snapshot.fill.clone();
        obj.visible = snapshot.visible;
        obj.selectable = snapshot.selectable;
        for descriptor in &snapshot.animations {
            obj = obj.with_animation(descriptor.clone());
        }
        for descriptor in &snapshot.events {
            obj = obj.with_event(descriptor.clone());
        }
        obj
    }
}

impl Canvas {
    /// Snapshot of `id` including its children.
    pub fn object_snapshot(&self, id: ObjectId) -> FxResult<ObjectSnapshot> {
        let idx = self.scene.index_of(id).ok_or(FxError::ObjectNotFound(id))?;
        Ok(self.snapshot_node(idx))
    }

    fn snapshot_node(&self, idx: NodeIndex) -> ObjectSnapshot {
        let mut snapshot = self.scene.graph[idx].to_snapshot();
        snapshot.objects = self
            .scene
            .children(idx)
            .into_iter()
            .filter(|c| !self.scene.graph[*c].exclude_from_export)
            .map(|c| self.snapshot_node(c))
            .collect();
        snapshot
    }

    /// `{ "objects": [...] }` for every exported top-level object, back to front.
    pub fn to_json(&self) -> Value {
        let objects: Vec<ObjectSnapshot> = self
            .scene
            .children(self.scene.root)
            .into_iter()
            .filter(|c| !self.scene.graph[*c].exclude_from_export)
            .map(|c| self.snapshot_node(c))
            .collect();
        json!({ "objects": objects })
    }

    /// Add a snapshot (and its children) on top of the canvas.
    pub fn add_snapshot(&mut self, snapshot: &ObjectSnapshot) -> FxResult<ObjectId> {
        let root = self.scene.root;
        self.add_snapshot_under(root, snapshot)
    }

    fn add_snapshot_under(&mut self, parent: NodeIndex, snapshot: &ObjectSnapshot) -> FxResult<ObjectId> {
        let id = self.insert_node(parent, usize::MAX, CanvasObject::from_snapshot(snapshot))?;
        if !snapshot.objects.is_empty() {
            let idx = self.container(id)?;
            for child in &snapshot.objects {
                if let Err(err) = self.add_snapshot_under(idx, child) {
                    self.remove(id)?;
                    return Err(err);
                }
            }
        }
        Ok(id)
    }

    /// Add every object of a `{ "objects": [...] }` document.
    pub fn load_json(&mut self, document: &Value) -> FxResult<Vec<ObjectId>> {
        let objects = document.get("objects").cloned().unwrap_or(Value::Array(Vec::new()));
        let snapshots: Vec<ObjectSnapshot> = serde_json::from_value(objects)?;
        snapshots.iter().map(|s| self.add_snapshot(s)).collect()
    }
}
