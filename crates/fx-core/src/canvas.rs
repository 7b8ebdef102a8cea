//! The canvas: scene, selection, notifications, and the frame clock.
//!
//! Every public mutation runs to completion before any notification is
//! delivered: `object:*` notifications (and object channel events raised by
//! the canvas itself) are queued and flushed once the mutation returns.

use crate::animation::{AnimationBinder, AnimationBinding, AnimationDescriptor, AnimationRun, RunId};
use crate::config::CanvasOptions;
use crate::error::{FxError, FxResult};
use crate::events::{EventBinder, EventBinding, EventDescriptor};
use crate::id::ObjectId;
use crate::listeners::{ListenerId, ObjectEvent};
use crate::object::{CanvasObject, ObjectKind};
use crate::observed::ObservedList;
use crate::registry::Registry;
use crate::scene::SceneGraph;
use crate::timer::{TimerAction, TimerQueue};
use petgraph::graph::NodeIndex;
use slotmap::SlotMap;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

pub const OBJECT_ADDED: &str = "object:added";
pub const OBJECT_REMOVED: &str = "object:removed";
pub const OBJECT_MODIFIED: &str = "object:modified";
pub const ENTER_EDITING: &str = "enter:editing";
pub const EXIT_EDITING: &str = "exit:editing";

/// A canvas-level notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasEvent {
    pub name: String,
    pub target: Option<ObjectId>,
}

/// Callback for canvas notifications.
pub type CanvasHandler = Rc<dyn Fn(&mut Canvas, &CanvasEvent)>;

#[derive(Debug, Clone)]
enum Pending {
    Canvas(CanvasEvent),
    Object(ObjectId, ObjectEvent),
}

pub struct Canvas {
    pub(crate) scene: SceneGraph,
    registry: Rc<Registry>,
    pub(crate) options: CanvasOptions,
    pub(crate) selection_in_progress: bool,
    focused: bool,
    active: Vec<ObjectId>,
    pub(crate) runs: SlotMap<RunId, AnimationRun>,
    pub(crate) timers: TimerQueue,
    listeners: Vec<(ListenerId, String, CanvasHandler)>,
    next_listener: u64,
    outbox: VecDeque<Pending>,
    flushing: bool,
    redraw_requested: bool,
    pub(crate) now_ms: f64,
}

impl Canvas {
    pub fn new(registry: Rc<Registry>, options: CanvasOptions) -> Self {
        Self {
            scene: SceneGraph::new(),
            registry,
            selection_in_progress: options.selection_in_progress,
            options,
            focused: false,
            active: Vec::new(),
            runs: SlotMap::with_key(),
            timers: TimerQueue::default(),
            listeners: Vec::new(),
            next_listener: 0,
            outbox: VecDeque::new(),
            flushing: false,
            redraw_requested: false,
            now_ms: 0.0,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    // ── Objects ──

    /// Add `obj` on top of the canvas, binding its descriptor lists.
    pub fn add(&mut self, obj: CanvasObject) -> FxResult<ObjectId> {
        let root = self.scene.root;
        self.insert_node(root, usize::MAX, obj)
    }

    /// Add `obj` as the front-most child of the group `parent`.
    pub fn add_to(&mut self, parent: ObjectId, obj: CanvasObject) -> FxResult<ObjectId> {
        let parent_idx = self.container(parent)?;
        self.insert_node(parent_idx, usize::MAX, obj)
    }

    pub(crate) fn insert_node(
        &mut self,
        parent: NodeIndex,
        pos: usize,
        obj: CanvasObject,
    ) -> FxResult<ObjectId> {
        let id = obj.id;
        if self.scene.contains(id) {
            return Err(FxError::DuplicateId(id));
        }
        let queued = self.outbox.len();
        let idx = self.scene.insert_at(parent, pos, obj);

        if let Err(err) = self.attach_lists(id) {
            self.scene.remove_node(idx);
            self.outbox.truncate(queued);
            return Err(err);
        }

        log::debug!("{id}: added");
        self.emit_object(id, ObjectEvent::new("added"));
        self.fire(OBJECT_ADDED, Some(id));
        self.request_redraw();
        self.flush();
        Ok(id)
    }

    /// Remove an object (and its children) from the canvas. Descriptor
    /// lists are released first, deepest objects first.
    pub fn remove(&mut self, id: ObjectId) -> FxResult<CanvasObject> {
        let idx = self.scene.index_of(id).ok_or(FxError::ObjectNotFound(id))?;
        if idx == self.scene.root {
            return Err(FxError::Unsupported(id, "removal of the scene root"));
        }

        let mut subtree = vec![idx];
        subtree.extend(self.scene.descendants(idx));
        for node in subtree.into_iter().rev() {
            // Tearing down a shadow-clone run deletes the clone node.
            let Some(node_id) = self.scene.id_at(node) else {
                continue;
            };
            if self.scene.get(node_id).is_some_and(|o| o.editing) {
                self.exit_editing(node_id)?;
            }
            self.detach_lists(node_id);
        }

        let removed = self
            .scene
            .remove_node(idx)
            .ok_or(FxError::ObjectNotFound(id))?;
        self.active.retain(|a| self.scene.contains(*a));

        log::debug!("{id}: removed");
        self.fire(OBJECT_REMOVED, Some(id));
        self.request_redraw();
        self.flush();
        Ok(removed)
    }

    pub fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.scene.get(id)
    }

    /// Direct access to an object's plain fields. Its descriptor lists stay
    /// read-only here; use the canvas list methods to change them.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.scene.get_mut(id)
    }

    /// Change an object's fields, then fire `object:modified` and request a redraw.
    /// A changed angle also becomes the angle restored on export.
    pub fn update_object<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut CanvasObject) -> R,
    ) -> FxResult<R> {
        let obj = self.scene.get_mut(id).ok_or(FxError::ObjectNotFound(id))?;
        let angle = obj.angle;
        let out = f(obj);
        // A user rotation replaces the angle export would restore.
        if obj.angle != angle
            && let Some(saved) = &mut obj.before_animation
        {
            saved.angle = obj.angle;
        }
        self.fire(OBJECT_MODIFIED, Some(id));
        self.request_redraw();
        self.flush();
        Ok(out)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.scene.contains(id) && self.scene.index_of(id) != Some(self.scene.root)
    }

    /// Top-level objects, back to front.
    pub fn objects(&self) -> Vec<ObjectId> {
        self.scene.child_ids(self.scene.root)
    }

    /// Children of a group, back to front.
    pub fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.scene
            .index_of(id)
            .map(|idx| self.scene.child_ids(idx))
            .unwrap_or_default()
    }

    /// The group holding `id`, or `None` for top-level objects.
    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        let parent = self.scene.parent(self.scene.index_of(id)?)?;
        if parent == self.scene.root {
            return None;
        }
        self.scene.id_at(parent)
    }

    /// Node index of a group (or the root) that can hold children.
    pub(crate) fn container(&self, id: ObjectId) -> FxResult<NodeIndex> {
        let idx = self.scene.index_of(id).ok_or(FxError::ObjectNotFound(id))?;
        match self.scene.graph[idx].kind {
            ObjectKind::Group | ObjectKind::Root => Ok(idx),
            _ => Err(FxError::Unsupported(id, "children")),
        }
    }

    // ── Descriptor lists ──

    fn attach_lists(&mut self, id: ObjectId) -> FxResult<()> {
        self.with_animations(id, |list, binder| list.attach(binder))??;
        let events = self.with_events(id, |list, binder| list.attach(binder));
        if !matches!(events, Ok(Ok(()))) {
            self.with_animations(id, |list, binder| list.detach(binder))?;
        }
        events?
    }

    fn detach_lists(&mut self, id: ObjectId) {
        let _ = self.with_events(id, |list, binder| list.detach(binder));
        let _ = self.with_animations(id, |list, binder| list.detach(binder));
    }

    /// Run `f` on the animation list of `id` with a binder for this canvas.
    fn with_animations<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(
            &mut ObservedList<AnimationDescriptor, AnimationBinding>,
            &mut AnimationBinder<'_>,
        ) -> R,
    ) -> FxResult<R> {
        let obj = self.scene.get_mut(id).ok_or(FxError::ObjectNotFound(id))?;
        let mut list = std::mem::take(&mut obj.animations);
        let out = f(&mut list, &mut AnimationBinder { canvas: self, target: id });
        if let Some(obj) = self.scene.get_mut(id) {
            obj.animations = list;
        }
        Ok(out)
    }

    /// Run `f` on the event list of `id` with a binder for this canvas.
    fn with_events<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut ObservedList<EventDescriptor, EventBinding>, &mut EventBinder<'_>) -> R,
    ) -> FxResult<R> {
        let obj = self.scene.get_mut(id).ok_or(FxError::ObjectNotFound(id))?;
        let mut list = std::mem::take(&mut obj.events);
        let out = f(&mut list, &mut EventBinder { canvas: self, target: id });
        if let Some(obj) = self.scene.get_mut(id) {
            obj.events = list;
        }
        Ok(out)
    }

    pub fn push_animation(&mut self, id: ObjectId, descriptor: AnimationDescriptor) -> FxResult<usize> {
        let out = self.with_animations(id, |list, binder| list.push(descriptor, binder))?;
        self.flush();
        out
    }

    pub fn insert_animation(
        &mut self,
        id: ObjectId,
        index: usize,
        descriptor: AnimationDescriptor,
    ) -> FxResult<()> {
        let out = self.with_animations(id, |list, binder| list.insert(index, descriptor, binder))?;
        self.flush();
        out
    }

    pub fn remove_animation(&mut self, id: ObjectId, index: usize) -> FxResult<AnimationDescriptor> {
        let out = self.with_animations(id, |list, binder| {
            let len = list.len();
            list.remove(index, binder)
                .ok_or(FxError::IndexOutOfBounds { index, len })
        })?;
        self.flush();
        out
    }

    pub fn replace_animation(
        &mut self,
        id: ObjectId,
        index: usize,
        descriptor: AnimationDescriptor,
    ) -> FxResult<AnimationDescriptor> {
        let out = self.with_animations(id, |list, binder| list.replace(index, descriptor, binder))?;
        self.flush();
        out
    }

    pub fn truncate_animations(&mut self, id: ObjectId, len: usize) -> FxResult<Vec<AnimationDescriptor>> {
        let out = self.with_animations(id, |list, binder| list.truncate(len, binder))?;
        self.flush();
        Ok(out)
    }

    pub fn push_event(&mut self, id: ObjectId, descriptor: EventDescriptor) -> FxResult<usize> {
        let out = self.with_events(id, |list, binder| list.push(descriptor, binder))?;
        self.flush();
        out
    }

    pub fn insert_event(&mut self, id: ObjectId, index: usize, descriptor: EventDescriptor) -> FxResult<()> {
        let out = self.with_events(id, |list, binder| list.insert(index, descriptor, binder))?;
        self.flush();
        out
    }

    pub fn remove_event(&mut self, id: ObjectId, index: usize) -> FxResult<EventDescriptor> {
        let out = self.with_events(id, |list, binder| {
            let len = list.len();
            list.remove(index, binder)
                .ok_or(FxError::IndexOutOfBounds { index, len })
        })?;
        self.flush();
        out
    }

    pub fn replace_event(
        &mut self,
        id: ObjectId,
        index: usize,
        descriptor: EventDescriptor,
    ) -> FxResult<EventDescriptor> {
        let out = self.with_events(id, |list, binder| list.replace(index, descriptor, binder))?;
        self.flush();
        out
    }

    pub fn truncate_events(&mut self, id: ObjectId, len: usize) -> FxResult<Vec<EventDescriptor>> {
        let out = self.with_events(id, |list, binder| list.truncate(len, binder))?;
        self.flush();
        Ok(out)
    }

    // ── Events ──

    /// Subscribe to a canvas notification (`object:modified`, ...).
    pub fn on<F>(&mut self, name: &str, handler: F) -> ListenerId
    where
        F: Fn(&mut Canvas, &CanvasEvent) + 'static,
    {
        self.next_listener += 1;
        let id = ListenerId::new(self.next_listener);
        self.listeners.push((id, name.to_string(), Rc::new(handler)));
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _, _)| *l != id);
        self.listeners.len() != before
    }

    /// Queue a canvas notification. Delivered by the next flush.
    pub fn fire(&mut self, name: &str, target: Option<ObjectId>) {
        self.outbox.push_back(Pending::Canvas(CanvasEvent {
            name: name.to_string(),
            target,
        }));
    }

    /// Queue an event on an object channel.
    pub(crate) fn emit_object(&mut self, id: ObjectId, event: ObjectEvent) {
        self.outbox.push_back(Pending::Object(id, event));
    }

    /// Deliver a live event (pointer, selection, custom) on an object channel.
    pub fn fire_object_event(&mut self, id: ObjectId, event: ObjectEvent) -> FxResult<()> {
        if !self.scene.contains(id) {
            return Err(FxError::ObjectNotFound(id));
        }
        self.emit_object(id, event);
        self.flush();
        Ok(())
    }

    /// Deliver queued notifications in order. Re-entrant calls return
    /// immediately; the outer flush picks up anything queued meanwhile.
    pub fn flush(&mut self) {
        if self.flushing {
            return;
        }
        self.flushing = true;
        while let Some(pending) = self.outbox.pop_front() {
            match pending {
                Pending::Canvas(event) => {
                    let handlers: Vec<CanvasHandler> = self
                        .listeners
                        .iter()
                        .filter(|(_, name, _)| *name == event.name)
                        .map(|(_, _, h)| Rc::clone(h))
                        .collect();
                    for handler in handlers {
                        handler(self, &event);
                    }
                }
                Pending::Object(id, event) => self.dispatch_object_event(id, &event),
            }
        }
        self.flushing = false;
    }

    fn dispatch_object_event(&mut self, id: ObjectId, event: &ObjectEvent) {
        let Some(obj) = self.scene.get(id) else {
            return;
        };
        let has_edit_mode = matches!(
            obj.kind,
            ObjectKind::Polyline { .. } | ObjectKind::Image { .. }
        );
        let cropping = obj.editing && matches!(obj.kind, ObjectKind::Image { .. });
        let handlers = obj.listeners.handlers(&event.channel);

        let reaction = match event.channel.as_str() {
            "mousedblclick" if has_edit_mode => self.toggle_editing(id).map(|_| ()),
            "deselected" if has_edit_mode => self.exit_editing(id).map(|_| ()),
            "moving" if cropping => self.drag_crop(id),
            _ => Ok(()),
        };
        if let Err(err) = reaction {
            log::debug!("{id}: {} ignored: {err}", event.channel);
        }

        for handler in handlers {
            handler(self, id, event);
        }
    }

    // ── Selection & focus ──

    pub fn active_objects(&self) -> &[ObjectId] {
        &self.active
    }

    /// Replace the active selection. Objects leaving it get `deselected`,
    /// objects joining it get `selected`.
    pub fn set_active_objects(&mut self, ids: Vec<ObjectId>) -> FxResult<()> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(FxError::ObjectNotFound(*missing));
        }
        let previous = std::mem::replace(&mut self.active, ids);
        for id in previous.iter().filter(|id| !self.active.contains(id)) {
            self.outbox.push_back(Pending::Object(*id, ObjectEvent::new("deselected")));
        }
        let joined: Vec<ObjectId> = self
            .active
            .iter()
            .filter(|id| !previous.contains(id))
            .copied()
            .collect();
        for id in joined {
            self.emit_object(id, ObjectEvent::new("selected"));
        }
        self.request_redraw();
        self.flush();
        Ok(())
    }

    pub fn discard_active_objects(&mut self) {
        let _ = self.set_active_objects(Vec::new());
    }

    pub fn selection_in_progress(&self) -> bool {
        self.selection_in_progress
    }

    /// Set while the user drags a selection rectangle. Suppresses new
    /// descriptor bindings and aborts running animations at their next step.
    pub fn set_selection_in_progress(&mut self, value: bool) {
        self.selection_in_progress = value;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    // ── Z-order ──

    fn reorder(&mut self, id: ObjectId, op: fn(&mut SceneGraph, NodeIndex) -> bool) -> FxResult<bool> {
        let idx = self.scene.index_of(id).ok_or(FxError::ObjectNotFound(id))?;
        let moved = op(&mut self.scene, idx);
        if moved {
            self.request_redraw();
        }
        Ok(moved)
    }

    pub fn send_backwards(&mut self, id: ObjectId) -> FxResult<bool> {
        self.reorder(id, SceneGraph::send_backward)
    }

    pub fn bring_forward(&mut self, id: ObjectId) -> FxResult<bool> {
        self.reorder(id, SceneGraph::bring_forward)
    }

    pub fn send_to_back(&mut self, id: ObjectId) -> FxResult<bool> {
        self.reorder(id, SceneGraph::send_to_back)
    }

    pub fn bring_to_front(&mut self, id: ObjectId) -> FxResult<bool> {
        self.reorder(id, SceneGraph::bring_to_front)
    }

    // ── Rendering & time ──

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Advance the clock: fire due timers, then step every running tween.
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
        for (_, action) in self.timers.take_due(self.now_ms) {
            match action {
                TimerAction::FireRun(run) => self.fire_run(run),
            }
        }
        self.step_runs();
        self.flush();
    }

    /// Number of timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Release every object's bindings and drop all listeners. Safe to call
    /// more than once.
    pub fn dispose(&mut self) {
        let root = self.scene.root;
        for node in self.scene.descendants(root).into_iter().rev() {
            if let Some(id) = self.scene.id_at(node) {
                self.detach_lists(id);
            }
        }
        self.timers.clear();
        self.runs.clear();
        self.outbox.clear();
        self.listeners.clear();
        self.active.clear();
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("objects", &self.objects())
            .field("active", &self.active)
            .field("runs", &self.runs.len())
            .field("timers", &self.timers.len())
            .field("now_ms", &self.now_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn canvas() -> Canvas {
        Canvas::new(Rc::new(Registry::new()), CanvasOptions::default())
    }

    fn record(canvas: &mut Canvas, names: &[&str]) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in names {
            let log = Rc::clone(&log);
            canvas.on(name, move |_, event| {
                let target = event.target.map(|t| t.as_str().to_string()).unwrap_or_default();
                log.borrow_mut().push(format!("{} {target}", event.name));
            });
        }
        log
    }

    #[test]
    fn add_and_remove_notify() {
        let mut canvas = canvas();
        let log = record(&mut canvas, &[OBJECT_ADDED, OBJECT_REMOVED]);
        let id = canvas.add(CanvasObject::rect(10.0, 10.0).with_id("c_rect")).unwrap();
        assert!(canvas.object(id).unwrap().is_attached());
        let removed = canvas.remove(id).unwrap();
        assert!(!removed.is_attached());
        assert_eq!(*log.borrow(), vec!["object:added c_rect", "object:removed c_rect"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut canvas = canvas();
        canvas.add(CanvasObject::rect(1.0, 1.0).with_id("c_dup")).unwrap();
        let err = canvas.add(CanvasObject::rect(1.0, 1.0).with_id("c_dup")).unwrap_err();
        assert!(matches!(err, FxError::DuplicateId(_)));
        assert_eq!(canvas.objects().len(), 1);
    }

    #[test]
    fn notifications_are_delivered_after_the_mutation() {
        let mut canvas = canvas();
        let id = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let seen_in = Rc::clone(&seen);
        canvas.on(OBJECT_MODIFIED, move |canvas, event| {
            let target = event.target.and_then(|t| canvas.object(t)).map(|o| o.left);
            *seen_in.borrow_mut() = target;
        });
        canvas
            .update_object(id, |obj| {
                obj.left = 42.0;
            })
            .unwrap();
        assert_eq!(*seen.borrow(), Some(42.0));
    }

    #[test]
    fn selection_events_reach_object_channels() {
        let mut canvas = canvas();
        let a = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
        let b = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for id in [a, b] {
            for channel in ["selected", "deselected"] {
                let log = Rc::clone(&log);
                canvas.object_mut(id).unwrap().listeners.on(
                    channel,
                    Rc::new(move |_, target, event| {
                        log.borrow_mut().push((target, event.channel.clone()));
                    }),
                );
            }
        }
        canvas.set_active_objects(vec![a]).unwrap();
        canvas.set_active_objects(vec![b]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                (a, "selected".to_string()),
                (a, "deselected".to_string()),
                (b, "selected".to_string()),
            ]
        );
    }

    #[test]
    fn redraw_request_is_taken_once() {
        let mut canvas = canvas();
        canvas.request_redraw();
        assert!(canvas.take_redraw_request());
        assert!(!canvas.take_redraw_request());
    }

    #[test]
    fn z_order_through_canvas() {
        let mut canvas = canvas();
        let a = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
        let b = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
        assert!(canvas.bring_to_front(a).unwrap());
        assert_eq!(canvas.objects(), vec![b, a]);
        assert!(!canvas.bring_forward(a).unwrap());
        assert!(canvas.send_backwards(a).unwrap());
        assert_eq!(canvas.objects(), vec![a, b]);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut canvas = canvas();
        canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
        canvas.dispose();
        canvas.dispose();
        assert_eq!(canvas.pending_timers(), 0);
    }
}
