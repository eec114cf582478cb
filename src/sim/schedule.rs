//! Delayed one-shot events
//!
//! Events are kept sorted by fire time (ties by insertion order) and drained
//! at most once per step.

use serde::{Deserialize, Serialize};

/// Deferred state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEvent {
    /// End the jump and put the player back on the ground
    ResetPlayerHeight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending {
    seq: u64,
    fire_at_micros: u64,
    event: ScheduledEvent,
}

/// Sorted list of pending events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl Scheduler {
    /// Queue `event` to fire once the clock reaches `now + delay`
    pub fn schedule(&mut self, now_micros: u64, delay_micros: u64, event: ScheduledEvent) {
        let fire_at_micros = now_micros.saturating_add(delay_micros);
        let seq = self.next_seq;
        self.next_seq += 1;
        let idx = self
            .pending
            .partition_point(|p| p.fire_at_micros <= fire_at_micros);
        self.pending.insert(
            idx,
            Pending {
                seq,
                fire_at_micros,
                event,
            },
        );
    }

    /// Remove and return every event due at `now`, in firing order
    pub fn drain_due(&mut self, now_micros: u64) -> Vec<ScheduledEvent> {
        let due = self
            .pending
            .partition_point(|p| p.fire_at_micros <= now_micros);
        self.pending.drain(..due).map(|p| p.event).collect()
    }

    /// Drop everything still pending; returns how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fire time of the earliest pending event
    pub fn next_fire_at(&self) -> Option<u64> {
        self.pending.first().map(|p| p.fire_at_micros)
    }

    /// Insertion sequence numbers in firing order (for ordering checks)
    #[cfg(test)]
    fn order(&self) -> Vec<u64> {
        self.pending.iter().map(|p| p.seq).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(100, 600_000, ScheduledEvent::ResetPlayerHeight);
        assert!(scheduler.drain_due(500_000).is_empty());
        assert_eq!(scheduler.len(), 1);
        assert_eq!(
            scheduler.drain_due(600_100),
            vec![ScheduledEvent::ResetPlayerHeight]
        );
        assert!(scheduler.is_empty());
        // Drained events never fire twice
        assert!(scheduler.drain_due(10_000_000).is_empty());
    }

    #[test]
    fn test_sorted_by_fire_time_then_insertion() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(0, 300, ScheduledEvent::ResetPlayerHeight); // seq 0
        scheduler.schedule(0, 100, ScheduledEvent::ResetPlayerHeight); // seq 1
        scheduler.schedule(0, 300, ScheduledEvent::ResetPlayerHeight); // seq 2
        assert_eq!(scheduler.order(), vec![1, 0, 2]);
        assert_eq!(scheduler.next_fire_at(), Some(100));
        assert_eq!(scheduler.drain_due(100).len(), 1);
        assert_eq!(scheduler.drain_due(300).len(), 2);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(0, 10, ScheduledEvent::ResetPlayerHeight);
        scheduler.schedule(0, 20, ScheduledEvent::ResetPlayerHeight);
        assert_eq!(scheduler.cancel_all(), 2);
        assert!(scheduler.drain_due(u64::MAX).is_empty());
    }
}
