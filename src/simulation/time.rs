use std::collections::BTreeMap;

use bevy_ecs::prelude::*;

/// Virtual clock for presentational pacing, in milliseconds since session start.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimClock {
    pub now_ms: u64,
}

impl SimClock {
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
    }

    /// Never moves backwards.
    pub fn advance_to(&mut self, at_ms: u64) {
        self.now_ms = self.now_ms.max(at_ms);
    }
}

/// Deferred engine work. Each one belongs to the playthrough that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingEvent {
    BeginPlaying,
    ResolveChoice { option_index: usize },
    AnnounceMissionComplete,
    Transit,
    AutoAdvance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub due_ms: u64,
    pub playthrough: u64,
    pub event: PendingEvent,
}

/// Events fire in `(due_ms, insertion order)` order.
#[derive(Resource, Debug, Default)]
pub struct PendingEvents {
    queue: BTreeMap<(u64, u64), ScheduledEvent>,
    next_seq: u64,
}

impl PendingEvents {
    pub fn schedule(&mut self, due_ms: u64, playthrough: u64, event: PendingEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert(
            (due_ms, seq),
            ScheduledEvent {
                due_ms,
                playthrough,
                event,
            },
        );
    }

    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledEvent> {
        let key = *self.queue.keys().next()?;
        if key.0 > now_ms {
            return None;
        }
        self.queue.remove(&key)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_due_time_keeps_insertion_order() {
        let mut pending = PendingEvents::default();
        pending.schedule(500, 1, PendingEvent::Transit);
        pending.schedule(100, 1, PendingEvent::ResolveChoice { option_index: 2 });
        pending.schedule(500, 1, PendingEvent::AutoAdvance);

        assert_eq!(pending.next_due(), Some(100));
        assert!(pending.pop_due(99).is_none());
        assert_eq!(
            pending.pop_due(100).map(|e| e.event),
            Some(PendingEvent::ResolveChoice { option_index: 2 })
        );
        assert_eq!(pending.pop_due(1_000).map(|e| e.event), Some(PendingEvent::Transit));
        assert_eq!(pending.pop_due(1_000).map(|e| e.event), Some(PendingEvent::AutoAdvance));
        assert!(pending.is_empty());
    }

    #[test]
    fn clock_does_not_rewind() {
        let mut clock = SimClock::default();
        clock.advance(300);
        clock.advance_to(100);
        assert_eq!(clock.now_ms, 300);
        clock.advance_to(900);
        assert_eq!(clock.now_ms, 900);
    }
}
