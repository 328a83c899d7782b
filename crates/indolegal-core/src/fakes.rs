//! Test doubles for the scheduling primitive.
//!
//! [`SpyScheduler`] behaves exactly like [`TimerQueue`] but records every
//! call, so a test can check which handles a component armed and whether it
//! cleared them.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::timer::{Fired, Scheduler, Tick, TimerId, TimerQueue};

/// A recorded call on the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    SetTimeout { id: TimerId, delay: Duration, tick: Tick },
    SetInterval { id: TimerId, period: Duration, tick: Tick },
    Clear { id: TimerId, was_pending: bool },
}

/// Recording wrapper around [`TimerQueue`].
#[derive(Debug, Default)]
pub struct SpyScheduler {
    inner: TimerQueue,
    calls: Vec<SchedulerCall>,
}

impl SpyScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SchedulerCall] {
        &self.calls
    }

    /// Every handle ever armed through this scheduler.
    pub fn armed(&self) -> BTreeSet<TimerId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SchedulerCall::SetTimeout { id, .. } | SchedulerCall::SetInterval { id, .. } => {
                    Some(*id)
                }
                SchedulerCall::Clear { .. } => None,
            })
            .collect()
    }

    /// Handles that were armed and are still pending.
    pub fn outstanding(&self) -> Vec<TimerId> {
        self.inner.pending_ids()
    }

    pub fn clears(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SchedulerCall::Clear { .. }))
            .count()
    }

    pub fn queue(&self) -> &TimerQueue {
        &self.inner
    }

    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        self.inner.pop_due(until)
    }

    pub fn advance_to(&mut self, t: Duration) {
        self.inner.advance_to(t);
    }
}

impl Scheduler for SpyScheduler {
    fn now(&self) -> Duration {
        self.inner.now()
    }

    fn set_timeout(&mut self, delay: Duration, tick: Tick) -> TimerId {
        let id = self.inner.set_timeout(delay, tick);
        self.calls.push(SchedulerCall::SetTimeout { id, delay, tick });
        id
    }

    fn set_interval(&mut self, period: Duration, tick: Tick) -> TimerId {
        let id = self.inner.set_interval(period, tick);
        self.calls.push(SchedulerCall::SetInterval { id, period, tick });
        id
    }

    fn clear(&mut self, id: TimerId) -> bool {
        let was_pending = self.inner.clear(id);
        self.calls.push(SchedulerCall::Clear { id, was_pending });
        was_pending
    }

    fn is_pending(&self, id: TimerId) -> bool {
        self.inner.is_pending(id)
    }
}
