//! Timer primitive for the cooperative, single-threaded playback loop.
//!
//! Components never sleep. They arm timeouts and intervals on a
//! [`Scheduler`] and are handed the resulting [`Tick`] when it fires. The
//! only implementation, [`TimerQueue`], runs on a virtual clock: the owner
//! decides how fast time moves (a test jumps, the real-time driver sleeps).

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::playback::PlaybackTick;

/// Intervals shorter than this are clamped so a zero period cannot spin.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Opaque handle to an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Payload delivered when a timer fires; identifies the owning component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    Playback(PlaybackTick),
    Feed,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub tick: Tick,
    /// Virtual time the timer was due at.
    pub at: Duration,
}

/// The scheduling surface handed to components.
pub trait Scheduler {
    /// Current virtual time.
    fn now(&self) -> Duration;

    /// Fire `tick` once after `delay`.
    fn set_timeout(&mut self, delay: Duration, tick: Tick) -> TimerId;

    /// Fire `tick` every `period` until cleared.
    fn set_interval(&mut self, period: Duration, tick: Tick) -> TimerId;

    /// Cancel a timer. Returns `false` if it had already fired or been cleared.
    fn clear(&mut self, id: TimerId) -> bool;

    fn is_pending(&self, id: TimerId) -> bool;
}

#[derive(Debug, Clone)]
struct Entry {
    tick: Tick,
    key: (Duration, u64),
    period: Option<Duration>,
}

/// Deterministic virtual-clock timer queue.
///
/// Timers fire in due-time order; ties are broken by the order in which they
/// were armed. A cleared timer never fires.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    next_order: u64,
    queue: BTreeMap<(Duration, u64), TimerId>,
    entries: HashMap<TimerId, Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Handles of all armed timers, in firing order.
    pub fn pending_ids(&self) -> Vec<TimerId> {
        self.queue.values().copied().collect()
    }

    /// Due time of the earliest armed timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer if it is due at or before `until`.
    ///
    /// The clock moves to the timer's due time. Intervals are re-armed one
    /// period later before the tick is returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let (&key, &id) = self.queue.iter().next()?;
        if key.0 > until {
            return None;
        }
        self.queue.remove(&key);
        self.now = self.now.max(key.0);

        let entry = self.entries.get(&id)?.clone();
        match entry.period {
            Some(period) => {
                let next_key = (key.0 + period, self.bump_order());
                self.queue.insert(next_key, id);
                if let Some(e) = self.entries.get_mut(&id) {
                    e.key = next_key;
                }
            }
            None => {
                self.entries.remove(&id);
            }
        }

        Some(Fired {
            id,
            tick: entry.tick,
            at: key.0,
        })
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }

    fn bump_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    fn arm(&mut self, delay: Duration, tick: Tick, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let key = (self.now + delay, self.bump_order());
        self.queue.insert(key, id);
        self.entries.insert(id, Entry { tick, key, period });
        id
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Duration {
        self.now
    }

    fn set_timeout(&mut self, delay: Duration, tick: Tick) -> TimerId {
        self.arm(delay, tick, None)
    }

    fn set_interval(&mut self, period: Duration, tick: Tick) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.arm(period, tick, Some(period))
    }

    fn clear(&mut self, id: TimerId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                self.queue.remove(&entry.key);
                true
            }
            None => false,
        }
    }

    fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }
}

/// Handles owned by one component, so it can release all of them at once.
#[derive(Debug, Default)]
pub struct TimerSet {
    ids: Vec<TimerId>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, id: TimerId) -> TimerId {
        self.ids.push(id);
        id
    }

    /// Forget a handle that fired as a one-shot.
    pub fn release(&mut self, id: TimerId) {
        self.ids.retain(|t| *t != id);
    }

    /// Clear one tracked timer.
    pub fn cancel(&mut self, id: TimerId, sched: &mut dyn Scheduler) -> bool {
        self.release(id);
        sched.clear(id)
    }

    /// Clear every tracked timer; returns how many were still armed.
    pub fn cancel_all(&mut self, sched: &mut dyn Scheduler) -> usize {
        self.ids.drain(..).filter(|id| sched.clear(*id)).count()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(q: &mut TimerQueue, until: Duration) -> Vec<Fired> {
        let mut out = Vec::new();
        while let Some(f) = q.pop_due(until) {
            out.push(f);
        }
        q.advance_to(until);
        out
    }

    #[test]
    fn test_timeouts_fire_in_due_order() {
        let mut q = TimerQueue::new();
        let late = q.set_timeout(ms(50), Tick::Feed);
        let early = q.set_timeout(ms(10), Tick::Feed);

        let fired = drain(&mut q, ms(100));
        assert_eq!(fired.iter().map(|f| f.id).collect::<Vec<_>>(), vec![early, late]);
        assert_eq!(fired[0].at, ms(10));
        assert_eq!(q.pending(), 0);
        assert_eq!(q.now(), ms(100));
    }

    #[test]
    fn test_ties_fire_in_arming_order() {
        let mut q = TimerQueue::new();
        let a = q.set_timeout(ms(10), Tick::Feed);
        let b = q.set_timeout(ms(10), Tick::Feed);
        let fired = drain(&mut q, ms(10));
        assert_eq!(fired.iter().map(|f| f.id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_interval_rearms_until_cleared() {
        let mut q = TimerQueue::new();
        let id = q.set_interval(ms(10), Tick::Feed);

        assert_eq!(drain(&mut q, ms(35)).len(), 3);
        assert!(q.is_pending(id));
        assert_eq!(q.next_deadline(), Some(ms(40)));

        assert!(q.clear(id));
        assert!(drain(&mut q, ms(100)).is_empty());
        assert!(!q.clear(id));
    }

    #[test]
    fn test_cleared_timeout_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.set_timeout(ms(5), Tick::Feed);
        assert!(q.clear(id));
        assert!(q.pop_due(ms(10)).is_none());
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut q = TimerQueue::new();
        q.set_interval(Duration::ZERO, Tick::Feed);
        assert_eq!(drain(&mut q, ms(3)).len(), 3);
    }

    #[test]
    fn test_delay_is_relative_to_current_time() {
        let mut q = TimerQueue::new();
        q.advance_to(ms(100));
        q.set_timeout(ms(5), Tick::Feed);
        assert_eq!(q.next_deadline(), Some(ms(105)));
    }

    #[test]
    fn test_timer_set_cancel_all() {
        let mut q = TimerQueue::new();
        let mut set = TimerSet::new();
        set.track(q.set_interval(ms(10), Tick::Feed));
        let once = set.track(q.set_timeout(ms(5), Tick::Feed));

        let fired = q.pop_due(ms(5)).expect("timeout due");
        assert_eq!(fired.id, once);
        set.release(once);

        assert_eq!(set.cancel_all(&mut q), 1);
        assert!(set.is_empty());
        assert_eq!(q.pending(), 0);
    }
}
