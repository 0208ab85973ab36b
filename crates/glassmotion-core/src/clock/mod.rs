//! Scheduling primitives.
//!
//! Controls never hold callbacks. They hand the scheduler a typed cue and
//! get a [`TaskToken`] back; when the deadline passes the driver pops a
//! [`Due`] and routes the cue to whichever control owns the token.
//!
//! Time is a [`Duration`] offset from the clock's origin, so the same
//! controls run unchanged on virtual time (tests, `simulate`) and on the
//! wall clock (see [`crate::runtime`]).

mod heap;
mod task_set;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use heap::TimerHeap;
pub use task_set::TaskSet;

/// Handle to a scheduled task. Only the scheduler can mint one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskToken(u64);

impl TaskToken {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// A task whose deadline has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Due<C> {
    pub token: TaskToken,
    /// Deadline the task was scheduled for.
    pub at: Duration,
    pub cue: C,
}

/// Timer service the controls schedule against.
///
/// Implementations must never deliver a cue for a cancelled token, and must
/// deliver due tasks in deadline order with ties broken by scheduling order.
pub trait Scheduler {
    type Cue;

    /// Current time relative to the clock's origin.
    fn now(&self) -> Duration;

    /// Deliver `cue` once, `delay` from now.
    fn schedule_once(&mut self, delay: Duration, cue: Self::Cue) -> TaskToken;

    /// Deliver `cue` every `interval` until cancelled.
    fn schedule_repeating(&mut self, interval: Duration, cue: Self::Cue) -> TaskToken;

    /// Cancel a pending task. Returns `false` if it already fired (one-shot)
    /// or was never known.
    fn cancel(&mut self, token: TaskToken) -> bool;
}

/// Milliseconds as a `u64`, saturating.
pub fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
