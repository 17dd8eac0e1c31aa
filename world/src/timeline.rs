//! Cooperative scheduler of delayed world actions.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeMap, BinaryHeap},
    time::Duration,
};

use squad_defence_core::WaveNumber;

/// Cancellable handle to an armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TimerHandle(u64);

/// Deferred action executed when a timer fires.
///
/// Actions carry the session epoch and wave they were armed for so the world
/// can discard anything that outlived its session or wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TimerAction {
    /// Fixed-duration end of a wave.
    EndWave { session: u32, wave: WaveNumber },
    /// Next step of a wave's spawn stream.
    SpawnNext { session: u32, wave: WaveNumber },
}

#[derive(Debug)]
struct Scheduled {
    fire_at: Duration,
    handle: TimerHandle,
    action: TimerAction,
}

impl Scheduled {
    fn key(&self) -> (Duration, TimerHandle) {
        (self.fire_at, self.handle)
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Time-ordered queue of armed timers.
///
/// Entries fire in `(fire_at, arming order)` order. Cancelled entries stay in
/// the heap and are skipped lazily once they reach the front.
#[derive(Debug, Default)]
pub(crate) struct Timeline {
    queue: BinaryHeap<Reverse<Scheduled>>,
    armed: BTreeMap<TimerHandle, Duration>,
    next_handle: u64,
}

impl Timeline {
    /// Creates an empty timeline.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arms a timer that fires once the clock reaches `fire_at`.
    pub(crate) fn schedule(&mut self, fire_at: Duration, action: TimerAction) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let _ = self.armed.insert(handle, fire_at);
        self.queue.push(Reverse(Scheduled {
            fire_at,
            handle,
            action,
        }));
        handle
    }

    /// Disarms the timer. Returns `false` when it already fired or was cancelled.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.armed.remove(&handle).is_some()
    }

    /// Disarms every timer at once.
    pub(crate) fn cancel_all(&mut self) {
        self.armed.clear();
        self.queue.clear();
    }

    /// Time at which an armed timer fires.
    pub(crate) fn fire_time(&self, handle: TimerHandle) -> Option<Duration> {
        self.armed.get(&handle).copied()
    }

    /// Removes and returns the earliest armed timer due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerAction)> {
        while let Some(Reverse(front)) = self.queue.peek() {
            if front.fire_at > now {
                return None;
            }

            let Reverse(entry) = self.queue.pop()?;
            if self.armed.remove(&entry.handle).is_some() {
                return Some((entry.fire_at, entry.action));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(wave: u32) -> TimerAction {
        TimerAction::SpawnNext {
            session: 0,
            wave: WaveNumber::new(wave),
        }
    }

    #[test]
    fn fires_in_time_then_arming_order() {
        let mut timeline = Timeline::new();
        let _ = timeline.schedule(Duration::from_secs(2), spawn(1));
        let _ = timeline.schedule(Duration::from_secs(1), spawn(2));
        let _ = timeline.schedule(Duration::from_secs(2), spawn(3));

        let fired: Vec<_> =
            std::iter::from_fn(|| timeline.pop_due(Duration::from_secs(5))).collect();

        assert_eq!(
            fired,
            vec![
                (Duration::from_secs(1), spawn(2)),
                (Duration::from_secs(2), spawn(1)),
                (Duration::from_secs(2), spawn(3)),
            ]
        );
    }

    #[test]
    fn timers_in_the_future_stay_armed() {
        let mut timeline = Timeline::new();
        let handle = timeline.schedule(Duration::from_secs(3), spawn(1));

        assert_eq!(timeline.pop_due(Duration::from_secs(2)), None);
        assert_eq!(timeline.fire_time(handle), Some(Duration::from_secs(3)));
        assert_eq!(
            timeline.pop_due(Duration::from_secs(3)),
            Some((Duration::from_secs(3), spawn(1)))
        );
        assert_eq!(timeline.fire_time(handle), None);
    }

    #[test]
    fn cancellation_is_idempotent_and_skips_the_entry() {
        let mut timeline = Timeline::new();
        let cancelled = timeline.schedule(Duration::from_secs(1), spawn(1));
        let _ = timeline.schedule(Duration::from_secs(2), spawn(2));

        assert!(timeline.cancel(cancelled));
        assert!(!timeline.cancel(cancelled));
        assert_eq!(
            timeline.pop_due(Duration::from_secs(10)),
            Some((Duration::from_secs(2), spawn(2)))
        );
        assert_eq!(timeline.pop_due(Duration::from_secs(10)), None);
    }

    #[test]
    fn cancel_all_disarms_everything() {
        let mut timeline = Timeline::new();
        let first = timeline.schedule(Duration::from_secs(1), spawn(1));
        let _ = timeline.schedule(Duration::from_secs(2), spawn(2));

        timeline.cancel_all();

        assert_eq!(timeline.fire_time(first), None);
        assert!(!timeline.cancel(first));
        assert_eq!(timeline.pop_due(Duration::MAX), None);
    }
}
