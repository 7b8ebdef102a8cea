//! Custom per-object events.
//!
//! An [`EventDescriptor`] binds a named handler from the
//! [`Registry`](crate::Registry) to one of the object's channels. Binding is
//! resolved eagerly: naming a handler nobody registered fails the insertion.

use crate::canvas::{Canvas, OBJECT_MODIFIED};
use crate::error::FxError;
use crate::id::ObjectId;
use crate::listeners::{ListenerId, ObjectHandler};
use crate::observed::Observer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// `{ name, trigger, data }`, exported verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl EventDescriptor {
    pub fn new(trigger: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            trigger: trigger.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Registration kept for a bound event descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBinding {
    pub listener: ListenerId,
}

/// Binds event descriptors of `target` while it lives on `canvas`.
pub(crate) struct EventBinder<'a> {
    pub canvas: &'a mut Canvas,
    pub target: ObjectId,
}

impl Observer<EventDescriptor> for EventBinder<'_> {
    type Handle = EventBinding;
    type Error = FxError;

    fn on_insert(
        &mut self,
        index: usize,
        descriptor: &EventDescriptor,
    ) -> Result<Option<EventBinding>, FxError> {
        if self.canvas.selection_in_progress() {
            log::debug!("{}: event #{index} left unbound during selection", self.target);
            return Ok(None);
        }

        let name = descriptor.name.clone().unwrap_or_default();
        let Some(handler) = self.canvas.registry().event(&name) else {
            log::warn!("{}: rejected event #{index}, no handler named {name:?}", self.target);
            return Err(FxError::UnknownEventName(name));
        };
        let hover_cursor = self.canvas.options().hover_cursor.clone();
        let obj = self
            .canvas
            .object_mut(self.target)
            .ok_or(FxError::ObjectNotFound(self.target))?;

        let bound = descriptor.clone();
        let callback: ObjectHandler =
            Rc::new(move |canvas, target, event| handler(canvas, target, &bound, event));
        let listener = obj.listeners.on(&descriptor.trigger, callback);
        obj.bound_events += 1;
        obj.hover_cursor = Some(hover_cursor);

        log::debug!("{}: bound event {name:?} on {:?}", self.target, descriptor.trigger);
        self.canvas.fire(OBJECT_MODIFIED, Some(self.target));
        Ok(Some(EventBinding { listener }))
    }

    fn on_remove(&mut self, index: usize, descriptor: &EventDescriptor, binding: EventBinding) {
        if let Some(obj) = self.canvas.object_mut(self.target) {
            obj.listeners.off(binding.listener);
            obj.bound_events = obj.bound_events.saturating_sub(1);
            if obj.bound_events == 0 {
                obj.hover_cursor = None;
            }
        }
        log::debug!("{}: unbound event #{index} {:?}", self.target, descriptor.name);
        self.canvas.fire(OBJECT_MODIFIED, Some(self.target));
    }
}
