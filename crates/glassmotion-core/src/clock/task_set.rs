use std::collections::BTreeSet;

use super::{Scheduler, TaskToken};

/// Tokens a single control currently has outstanding.
///
/// A control records every token it schedules here, forgets it when the
/// task fires, and cancels whatever is left as a unit on teardown.
#[derive(Debug, Default)]
pub struct TaskSet {
    tokens: BTreeSet<TaskToken>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, token: TaskToken) -> TaskToken {
        self.tokens.insert(token);
        token
    }

    /// Forget a token whose task fired. Returns `false` for tokens this set
    /// does not own.
    pub fn settle(&mut self, token: TaskToken) -> bool {
        self.tokens.remove(&token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Cancel every outstanding task. Returns how many were still pending.
    pub fn cancel_all<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) -> usize {
        std::mem::take(&mut self.tokens)
            .into_iter()
            .filter(|token| scheduler.cancel(*token))
            .count()
    }
}
