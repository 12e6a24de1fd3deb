//! Logical Timeline
//!
//! An ordered queue of continuations keyed by logical time. The timeline is
//! the only clock the core knows about: time moves when the owner calls
//! [`Timeline::advance_to`] or pops a due continuation, never on its own.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// Generation counter that invalidates continuations scheduled before a
/// cancellation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The next generation
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "epoch#{}", self.0)
    }
}

/// A scheduled step, tagged with the epoch it belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Continuation<T> {
    /// Logical time at which the step is due
    pub due: Duration,
    /// Generation the step was scheduled under
    pub epoch: Epoch,
    /// The step itself
    pub step: T,
    /// Insertion order, used to keep equal due times FIFO
    seq: u64,
}

impl<T: Eq> Ord for Continuation<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

impl<T: Eq> PartialOrd for Continuation<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-ordered queue of continuations over a logical clock
#[derive(Debug)]
pub struct Timeline<T: Eq> {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Continuation<T>>>,
}

impl<T: Eq> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Clone> Timeline<T> {
    /// Schedule `step` to run `delay` after the current time
    pub fn schedule(&mut self, delay: Duration, epoch: Epoch, step: T) -> Continuation<T> {
        let continuation = Continuation {
            due: self.now + delay,
            epoch,
            step,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(continuation.clone()));
        continuation
    }
}

impl<T: Eq> Timeline<T> {
    /// Create a timeline at time zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current logical time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Due time of the earliest pending continuation
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(c)| c.due)
    }

    /// Pop the earliest continuation due at or before `until`
    ///
    /// The clock moves forward to the popped continuation's due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Continuation<T>> {
        if self.next_due()? > until {
            return None;
        }
        let Reverse(continuation) = self.queue.pop()?;
        self.now = self.now.max(continuation.due);
        Some(continuation)
    }

    /// Move the clock forward without running anything
    ///
    /// The clock never moves backwards.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Drop every pending continuation
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Number of pending continuations
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pops_in_due_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(300), Epoch(0), "late");
        timeline.schedule(ms(100), Epoch(0), "early");

        assert_eq!(timeline.pop_due(ms(1000)).map(|c| c.step), Some("early"));
        assert_eq!(timeline.now(), ms(100));
        assert_eq!(timeline.pop_due(ms(1000)).map(|c| c.step), Some("late"));
        assert_eq!(timeline.now(), ms(300));
        assert!(timeline.pop_due(ms(1000)).is_none());
    }

    #[test]
    fn test_equal_due_times_are_fifo() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(50), Epoch(0), 1);
        timeline.schedule(ms(50), Epoch(0), 2);
        timeline.schedule(ms(50), Epoch(0), 3);

        let order: Vec<i32> = std::iter::from_fn(|| timeline.pop_due(ms(50)))
            .map(|c| c.step)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_not_due_yet() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(300), Epoch(0), ());
        assert!(timeline.pop_due(ms(299)).is_none());
        assert_eq!(timeline.len(), 1);
        assert!(timeline.pop_due(ms(300)).is_some());
    }

    #[test]
    fn test_schedule_is_relative_to_now() {
        let mut timeline = Timeline::new();
        timeline.advance_to(ms(1000));
        let continuation = timeline.schedule(ms(400), Epoch(3), ());
        assert_eq!(continuation.due, ms(1400));
        assert_eq!(continuation.epoch, Epoch(3));
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut timeline: Timeline<()> = Timeline::new();
        timeline.advance_to(ms(500));
        timeline.advance_to(ms(100));
        assert_eq!(timeline.now(), ms(500));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(1), Epoch(0), ());
        timeline.schedule(ms(2), Epoch(0), ());
        assert_eq!(timeline.clear(), 2);
        assert!(timeline.is_empty());
        assert_eq!(timeline.next_due(), None);
    }
}
