//! A timer table evaluated against a single clock.
//!
//! Each entry is a `(due, event)` pair. The table never reads a clock
//! itself: the owner asks for whatever is due at the time it was handed,
//! so tests can jump to any instant without waiting.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle returned by [`TimerQueue::schedule_at`], used to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Pending one-shot timers ordered by due time, then by scheduling order.
#[derive(Debug)]
pub struct TimerQueue<E> {
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), E>,
    due_by_id: HashMap<TimerId, Duration>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
            due_by_id: HashMap::new(),
        }
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `due`.
    pub fn schedule_at(&mut self, due: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((due, id), event);
        self.due_by_id.insert(id, due);
        id
    }

    /// Schedule `event` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, event: E) -> TimerId {
        self.schedule_at(now.saturating_add(delay), event)
    }

    /// Cancel a pending timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_by_id.remove(&id) {
            Some(due) => self.pending.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, Duration, E)> {
        let (&(due, id), _) = self.pending.iter().next()?;
        if due > now {
            return None;
        }
        self.due_by_id.remove(&id);
        let event = self.pending.remove(&(due, id))?;
        Some((id, due, event))
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.due_by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Cancel everything. Returns how many timers were pending.
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        self.due_by_id.clear();
        n
    }
}
