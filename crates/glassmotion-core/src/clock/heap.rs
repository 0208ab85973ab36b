//! Timer heap.
//!
//! Keeps pending tasks in a min-heap keyed by `(deadline, sequence)`.
//! Cancellation removes the task record; the heap entry is dropped lazily
//! when it reaches the top. Tokens are never reused, so a stale heap entry
//! can never resurrect a cancelled task.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use tracing::trace;

use super::{as_millis, Due, Scheduler, TaskToken};

/// Repeating tasks never fire more often than this.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct Task<C> {
    cue: C,
    interval: Option<Duration>,
}

/// Deterministic scheduler driven by the caller.
///
/// Time only moves when [`pop_due`](Self::pop_due) or
/// [`advance_to`](Self::advance_to) is called, which makes it usable both
/// as a virtual clock in tests and as the queue behind the realtime runner.
#[derive(Debug)]
pub struct TimerHeap<C> {
    now: Duration,
    next_token: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<(Duration, u64, TaskToken)>>,
    tasks: HashMap<TaskToken, Task<C>>,
}

impl<C> Default for TimerHeap<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimerHeap<C> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_token: 1,
            next_seq: 0,
            queue: BinaryHeap::new(),
            tasks: HashMap::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Number of live (scheduled, not cancelled, not yet fired) tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.tasks.contains_key(&token)
    }

    /// Deadline of the earliest live task.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.discard_stale();
        self.queue.peek().map(|Reverse((at, _, _))| *at)
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Move the clock forward. Never moves it backwards.
    ///
    /// Callers should drain [`pop_due`](Self::pop_due) up to `to` first,
    /// otherwise tasks due in between fire late.
    pub fn advance_to(&mut self, to: Duration) {
        if to > self.now {
            self.now = to;
        }
    }

    fn push(&mut self, at: Duration, token: TaskToken) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((at, seq, token)));
    }

    fn mint(&mut self) -> TaskToken {
        let token = TaskToken::new(self.next_token);
        self.next_token += 1;
        token
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse((_, _, token))) = self.queue.peek() {
            if self.tasks.contains_key(token) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<C: Clone> TimerHeap<C> {
    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its deadline. Repeating tasks are re-armed one interval after the
    /// deadline they just hit, so the cadence does not drift.
    pub fn pop_due(&mut self, until: Duration) -> Option<Due<C>> {
        self.discard_stale();
        let Reverse((at, _, token)) = *self.queue.peek()?;
        if at > until {
            return None;
        }
        self.queue.pop();
        self.advance_to(at);

        let interval = self.tasks.get(&token)?.interval;
        let cue = match interval {
            Some(every) => {
                self.push(at + every, token);
                self.tasks.get(&token)?.cue.clone()
            }
            None => self.tasks.remove(&token)?.cue,
        };
        trace!(%token, at_ms = as_millis(at), "task due");
        Some(Due { token, at, cue })
    }
}

impl<C: Clone> Scheduler for TimerHeap<C> {
    type Cue = C;

    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration, cue: C) -> TaskToken {
        let token = self.mint();
        let at = self.now + delay;
        self.tasks.insert(token, Task { cue, interval: None });
        self.push(at, token);
        trace!(%token, delay_ms = as_millis(delay), "scheduled once");
        token
    }

    fn schedule_repeating(&mut self, interval: Duration, cue: C) -> TaskToken {
        let interval = interval.max(MIN_INTERVAL);
        let token = self.mint();
        let at = self.now + interval;
        self.tasks.insert(
            token,
            Task {
                cue,
                interval: Some(interval),
            },
        );
        self.push(at, token);
        trace!(%token, interval_ms = as_millis(interval), "scheduled repeating");
        token
    }

    fn cancel(&mut self, token: TaskToken) -> bool {
        let removed = self.tasks.remove(&token).is_some();
        if removed {
            trace!(%token, "cancelled");
        }
        removed
    }
}
