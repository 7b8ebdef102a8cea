//! Cancellable one-shot timers driven by [`Canvas::tick`](crate::Canvas::tick).

use crate::animation::RunId;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle for a scheduled timer.
    pub struct TimerId;
}

/// What happens when a timer comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// A delayed animation run starts its first leg.
    FireRun(RunId),
}

#[derive(Debug, Clone)]
struct Timer {
    due_ms: f64,
    seq: u64,
    action: TimerAction,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: SlotMap<TimerId, Timer>,
    seq: u64,
}

impl TimerQueue {
    pub fn schedule(&mut self, due_ms: f64, action: TimerAction) -> TimerId {
        self.seq += 1;
        self.timers.insert(Timer {
            due_ms,
            seq: self.seq,
            action,
        })
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Remove and return every timer due at `now_ms`, by due time then
    /// scheduling order.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<(TimerId, TimerAction)> {
        let mut due: Vec<(TimerId, f64, u64)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .map(|(id, t)| (id, t.due_ms, t.seq))
            .collect();
        due.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
        due.into_iter()
            .filter_map(|(id, _, _)| self.timers.remove(id).map(|t| (id, t.action)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slotmap::KeyData;

    fn run(n: u64) -> RunId {
        RunId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn due_order_then_insertion_order() {
        let mut queue = TimerQueue::default();
        queue.schedule(20.0, TimerAction::FireRun(run(1)));
        queue.schedule(10.0, TimerAction::FireRun(run(2)));
        queue.schedule(10.0, TimerAction::FireRun(run(3)));
        queue.schedule(50.0, TimerAction::FireRun(run(4)));

        let fired: Vec<TimerAction> = queue.take_due(20.0).into_iter().map(|(_, a)| a).collect();
        assert_eq!(
            fired,
            vec![
                TimerAction::FireRun(run(2)),
                TimerAction::FireRun(run(3)),
                TimerAction::FireRun(run(1)),
            ]
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut queue = TimerQueue::default();
        let id = queue.schedule(0.0, TimerAction::FireRun(run(1)));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.take_due(100.0).is_empty());
    }
}
