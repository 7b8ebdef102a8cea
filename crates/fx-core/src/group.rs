//! Grouping and ungrouping.
//!
//! Group children are stored relative to the group's center, in the
//! group's unrotated, unscaled frame.

use crate::canvas::{Canvas, OBJECT_MODIFIED};
use crate::error::{FxError, FxResult};
use crate::geometry::Origin;
use crate::id::ObjectId;
use crate::object::{CanvasObject, ObjectKind};
use kurbo::{Affine, Point, Rect};

impl Canvas {
    /// Maps `id`'s own coordinates (its `left`/`top`) to canvas coordinates:
    /// the composed center transforms of every enclosing group.
    pub fn parent_transform(&self, id: ObjectId) -> Affine {
        let mut transform = Affine::IDENTITY;
        let mut current = self.parent_of(id);
        while let Some(group) = current {
            if let Some(obj) = self.object(group) {
                transform = obj.center_transform() * transform;
            }
            current = self.parent_of(group);
        }
        transform
    }

    /// Wrap sibling objects in a new group placed at their common bounds.
    /// The group takes the z-slot of the front-most member and becomes the
    /// active selection.
    pub fn group(&mut self, ids: &[ObjectId]) -> FxResult<ObjectId> {
        let Some(first) = ids.first() else {
            return Err(FxError::EmptyGroup);
        };
        let first_idx = self.scene.index_of(*first).ok_or(FxError::ObjectNotFound(*first))?;
        let parent = self
            .scene
            .parent(first_idx)
            .ok_or(FxError::Unsupported(*first, "grouping"))?;

        let mut members = Vec::with_capacity(ids.len());
        for id in ids {
            let idx = self.scene.index_of(*id).ok_or(FxError::ObjectNotFound(*id))?;
            if self.scene.parent(idx) != Some(parent) {
                return Err(FxError::Unsupported(*id, "grouping objects with different parents"));
            }
            let z = self.scene.z_index(idx).unwrap_or(0);
            members.push((z, *id));
        }
        members.sort_by_key(|(z, _)| *z);
        members.dedup();

        let bounds = members
            .iter()
            .filter_map(|(_, id)| self.object(*id).map(CanvasObject::bounding_rect))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        let slot = members.last().map_or(0, |(z, _)| z + 1);

        let group = CanvasObject::group()
            .at(bounds.x0, bounds.y0)
            .with_size(bounds.width(), bounds.height())
            .with_origin(Origin::TOP_LEFT);
        let center = group.center_point();
        let group_id = self.insert_node(parent, slot, group)?;
        let group_idx = self.container(group_id)?;

        for (pos, (_, id)) in members.iter().enumerate() {
            if let Some(obj) = self.scene.get_mut(*id) {
                let relative = obj.center_point() - center.to_vec2();
                obj.set_center_point(relative);
            }
            if let Some(idx) = self.scene.index_of(*id) {
                self.scene.reparent(idx, group_idx, pos);
            }
        }

        log::debug!("{group_id}: grouped {} object(s)", members.len());
        self.fire(OBJECT_MODIFIED, Some(group_id));
        self.set_active_objects(vec![group_id])?;
        Ok(group_id)
    }

    /// Dissolve a group, restoring its children to the group's parent in
    /// absolute coordinates. The children become the active selection.
    pub fn ungroup(&mut self, id: ObjectId) -> FxResult<Vec<ObjectId>> {
        let group = self.object(id).ok_or(FxError::ObjectNotFound(id))?;
        if group.kind != ObjectKind::Group {
            return Err(FxError::Unsupported(id, "ungrouping"));
        }
        let transform = group.center_transform();
        let (angle, scale_x, scale_y) = (group.angle, group.scale_x, group.scale_y);

        let idx = self.scene.index_of(id).ok_or(FxError::ObjectNotFound(id))?;
        let parent = self
            .scene
            .parent(idx)
            .ok_or(FxError::Unsupported(id, "ungrouping"))?;
        let slot = self.scene.z_index(idx).unwrap_or(0);
        let children = self.scene.children(idx);
        let mut ids = Vec::with_capacity(children.len());

        for (offset, child) in children.into_iter().enumerate() {
            let obj = &mut self.scene.graph[child];
            let center: Point = transform * obj.center_point();
            obj.angle += angle;
            obj.scale_x *= scale_x;
            obj.scale_y *= scale_y;
            obj.set_center_point(center);
            ids.push(obj.id);
            self.scene.reparent(child, parent, slot + offset);
            self.fire(OBJECT_MODIFIED, Some(ids[offset]));
        }

        self.remove(id)?;
        log::debug!("{id}: ungrouped {} object(s)", ids.len());
        self.set_active_objects(ids.clone())?;
        Ok(ids)
    }
}
