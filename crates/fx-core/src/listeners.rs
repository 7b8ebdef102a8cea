//! Per-object event channels.
//!
//! Objects expose named channels (`mousedown`, `selected`, any custom
//! string). Triggered animations and custom events subscribe here.

use crate::canvas::Canvas;
use crate::id::ObjectId;
use kurbo::Point;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Listeners::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(n: u64) -> Self {
        Self(n)
    }
}

/// A live event delivered on an object channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectEvent {
    pub channel: String,
    /// Canvas position of the pointer for pointer events.
    pub pointer: Option<Point>,
    pub data: Option<Value>,
}

impl ObjectEvent {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Default::default()
        }
    }

    pub fn with_pointer(mut self, pointer: Point) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Callback for an object channel: `(canvas, target, event)`.
pub type ObjectHandler = Rc<dyn Fn(&mut Canvas, ObjectId, &ObjectEvent)>;

#[derive(Clone, Default)]
pub struct Listeners {
    next: u64,
    entries: SmallVec<[(ListenerId, String, ObjectHandler); 4]>,
}

impl Listeners {
    pub fn on(&mut self, channel: &str, handler: ObjectHandler) -> ListenerId {
        self.next += 1;
        let id = ListenerId::new(self.next);
        self.entries.push((id, channel.to_string(), handler));
        id
    }

    /// Unsubscribe. Returns false if `id` was not subscribed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    /// Handlers for `channel` in subscription order.
    pub fn handlers(&self, channel: &str) -> Vec<ObjectHandler> {
        self.entries
            .iter()
            .filter(|(_, ch, _)| ch == channel)
            .map(|(_, _, h)| Rc::clone(h))
            .collect()
    }

    pub fn count(&self, channel: &str) -> usize {
        self.entries.iter().filter(|(_, ch, _)| ch == channel).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, ch, _)| (id, ch)))
            .finish()
    }
}
