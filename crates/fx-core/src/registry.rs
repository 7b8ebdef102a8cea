//! Named animation factories and event handlers.
//!
//! A [`Registry`] is built once at startup and handed to
//! [`Canvas::new`](crate::Canvas::new) behind an `Rc`; it is read-only
//! afterward. Tests build a fresh one each.

use crate::animation::AnimationDescriptor;
use crate::canvas::Canvas;
use crate::events::EventDescriptor;
use crate::id::ObjectId;
use crate::listeners::ObjectEvent;
use crate::object::CanvasObject;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Produces the effective descriptor for a named animation.
pub type AnimationFactory = Rc<dyn Fn(&CanvasObject, &AnimationDescriptor) -> AnimationDescriptor>;

/// Runs when a custom event's trigger fires: `(canvas, target, descriptor, event)`.
pub type EventHandler = Rc<dyn Fn(&mut Canvas, ObjectId, &EventDescriptor, &ObjectEvent)>;

#[derive(Clone, Default)]
pub struct Registry {
    animations: HashMap<String, AnimationFactory>,
    events: HashMap<String, EventHandler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named animation. Re-registering a name replaces it.
    pub fn register_animation<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&CanvasObject, &AnimationDescriptor) -> AnimationDescriptor + 'static,
    {
        self.animations.insert(name.into(), Rc::new(factory));
        self
    }

    /// Register a named event handler. Re-registering a name replaces it.
    pub fn register_event<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut Canvas, ObjectId, &EventDescriptor, &ObjectEvent) + 'static,
    {
        self.events.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn animation(&self, name: &str) -> Option<AnimationFactory> {
        self.animations.get(name).cloned()
    }

    pub fn event(&self, name: &str) -> Option<EventHandler> {
        self.events.get(name).cloned()
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut animations: Vec<_> = self.animations.keys().collect();
        let mut events: Vec<_> = self.events.keys().collect();
        animations.sort();
        events.sort();
        f.debug_struct("Registry")
            .field("animations", &animations)
            .field("events", &events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_registration_wins() {
        let mut registry = Registry::new();
        registry.register_event("open", |_, _, _, _| {});
        registry.register_event("open", |canvas, _, _, _| canvas.request_redraw());
        assert_eq!(registry.event_count(), 1);

        registry.register_animation("pulse", |_, d| d.clone());
        registry.register_animation("pulse", |_, _| AnimationDescriptor::default());
        assert_eq!(registry.animation_count(), 1);
        assert!(registry.animation("pulse").is_some());
        assert!(registry.event("close").is_none());
    }
}
