//! Progress button sequencer.
//!
//! Counts a label up on a fixed cadence, then plays two delayed follow-up
//! labels before settling on a re-invite prompt.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Counting -> Celebrating -> Prompt
//!   ^                                  |
//!   +-------- activate() (Prompt) -----+
//! ```
//!
//! Each phase carries the token of the one task it is waiting on, so a run
//! can never have two ticks, or a tick and a delay, outstanding at once.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Scheduler, TaskToken};
use crate::events::{Event, ProgressTransition};
use crate::storage::ProgressConfig;

/// Externally visible phase of the progress button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Counting,
    Celebrating,
    Prompt,
}

/// Cues the sequencer schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressCue {
    Tick,
    Celebrate,
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Idle,
    Counting { tick: TaskToken },
    /// Counting finished; waiting to show the celebratory label.
    Finished { pending: TaskToken },
    /// Celebratory label shown; waiting to show the prompt.
    Cheering { pending: TaskToken },
    Prompt,
}

impl Run {
    fn phase(self) -> Phase {
        match self {
            Run::Idle => Phase::Idle,
            Run::Counting { .. } => Phase::Counting,
            Run::Finished { .. } | Run::Cheering { .. } => Phase::Celebrating,
            Run::Prompt => Phase::Prompt,
        }
    }

    fn pending(self) -> Option<TaskToken> {
        match self {
            Run::Counting { tick } => Some(tick),
            Run::Finished { pending } | Run::Cheering { pending } => Some(pending),
            Run::Idle | Run::Prompt => None,
        }
    }
}

/// Drives one progress button.
#[derive(Debug)]
pub struct ProgressSequencer {
    config: ProgressConfig,
    run: Run,
    counter: u32,
    label: String,
}

impl ProgressSequencer {
    pub fn new(config: ProgressConfig) -> Self {
        let label = config.idle_label.clone();
        Self {
            config,
            run: Run::Idle,
            counter: 0,
            label,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.run.phase()
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// True while a run is in progress and activation is refused.
    pub fn is_active(&self) -> bool {
        self.run.pending().is_some()
    }

    pub fn snapshot(&self, transition: ProgressTransition) -> Event {
        Event::Progress {
            transition,
            phase: self.phase(),
            counter: self.counter,
            label: self.label.clone(),
            active: self.is_active(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a run. Returns `None` while a run is already active.
    pub fn activate<S>(&mut self, clock: &mut S) -> Option<Event>
    where
        S: Scheduler + ?Sized,
        S::Cue: From<ProgressCue>,
    {
        match self.run {
            Run::Idle | Run::Prompt => {
                self.counter = 0;
                let tick = clock.schedule_repeating(self.config.tick_interval(), ProgressCue::Tick.into());
                self.run = Run::Counting { tick };
                debug!(%tick, "progress run started");
                Some(self.snapshot(ProgressTransition::Started))
            }
            Run::Counting { .. } | Run::Finished { .. } | Run::Cheering { .. } => {
                debug!(phase = ?self.phase(), counter = self.counter, "activation ignored, run in progress");
                None
            }
        }
    }

    /// Handle a cue this sequencer scheduled.
    ///
    /// Cues whose token does not match the task the current phase waits on
    /// are dropped.
    pub fn handle<S>(&mut self, token: TaskToken, cue: ProgressCue, clock: &mut S) -> Option<Event>
    where
        S: Scheduler + ?Sized,
        S::Cue: From<ProgressCue>,
    {
        if self.run.pending() != Some(token) {
            warn!(%token, ?cue, phase = ?self.phase(), "stray progress cue");
            return None;
        }

        match (self.run, cue) {
            (Run::Counting { tick }, ProgressCue::Tick) => {
                self.counter = (self.counter + 1).min(self.config.target);
                self.label = format!("{:02}", self.counter);
                if self.counter < self.config.target {
                    return Some(self.snapshot(ProgressTransition::Ticked));
                }

                clock.cancel(tick);
                let pending =
                    clock.schedule_once(self.config.celebrate_delay(), ProgressCue::Celebrate.into());
                self.run = Run::Finished { pending };
                debug!(counter = self.counter, "counting finished");
                Some(self.snapshot(ProgressTransition::Finished))
            }
            (Run::Finished { .. }, ProgressCue::Celebrate) => {
                self.label = self.config.celebrate_label.clone();
                let pending = clock.schedule_once(self.config.prompt_delay(), ProgressCue::Prompt.into());
                self.run = Run::Cheering { pending };
                Some(self.snapshot(ProgressTransition::Celebrated))
            }
            (Run::Cheering { .. }, ProgressCue::Prompt) => {
                self.label = self.config.prompt_label.clone();
                self.counter = 0;
                self.run = Run::Prompt;
                debug!("progress run ended");
                Some(self.snapshot(ProgressTransition::Prompted))
            }
            (run, cue) => {
                warn!(?run, ?cue, "progress cue does not fit phase");
                None
            }
        }
    }

    /// Tear the control down, cancelling whatever it was waiting on.
    pub fn dispose<S: Scheduler + ?Sized>(self, clock: &mut S) -> bool {
        self.run.pending().is_some_and(|token| clock.cancel(token))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::TimerHeap;

    fn run_until(
        seq: &mut ProgressSequencer,
        clock: &mut TimerHeap<ProgressCue>,
        until_ms: u64,
    ) -> Vec<(u64, Event)> {
        let until = Duration::from_millis(until_ms);
        let mut out = Vec::new();
        while let Some(due) = clock.pop_due(until) {
            if let Some(event) = seq.handle(due.token, due.cue, clock) {
                out.push((due.at.as_millis() as u64, event));
            }
        }
        clock.advance_to(until);
        out
    }

    fn labels(events: &[(u64, Event)]) -> Vec<String> {
        events
            .iter()
            .filter_map(|(_, e)| match e {
                Event::Progress { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_idle_with_idle_label() {
        let seq = ProgressSequencer::new(ProgressConfig::default());
        assert_eq!(seq.phase(), Phase::Idle);
        assert_eq!(seq.label(), "1");
        assert!(!seq.is_active());
    }

    #[test]
    fn first_ticks_are_zero_padded() {
        let mut clock = TimerHeap::new();
        let mut seq = ProgressSequencer::new(ProgressConfig::default());
        assert!(seq.activate(&mut clock).is_some());

        let events = run_until(&mut seq, &mut clock, 300);
        assert_eq!(labels(&events), vec!["01", "02", "03"]);
        assert_eq!(seq.phase(), Phase::Counting);
        assert_eq!(seq.counter(), 3);
    }

    #[test]
    fn activation_during_run_is_ignored() {
        let mut clock = TimerHeap::new();
        let mut seq = ProgressSequencer::new(ProgressConfig::default());
        seq.activate(&mut clock);
        run_until(&mut seq, &mut clock, 500);

        let pending_before = clock.pending();
        assert!(seq.activate(&mut clock).is_none());
        assert_eq!(seq.counter(), 5);
        assert_eq!(clock.pending(), pending_before);
    }

    #[test]
    fn full_run_ends_on_prompt() {
        let mut clock = TimerHeap::new();
        let mut seq = ProgressSequencer::new(ProgressConfig::default());
        seq.activate(&mut clock);

        let events = run_until(&mut seq, &mut clock, 20_000);
        let tail: Vec<_> = events.iter().rev().take(3).rev().cloned().collect();
        assert_eq!(tail[0].0, 10_000);
        assert_eq!(tail[1].0, 11_000);
        assert_eq!(tail[2].0, 12_000);
        assert_eq!(labels(&tail), vec!["100", "Yayyyyyy!!!", "Once Again?"]);

        assert_eq!(seq.phase(), Phase::Prompt);
        assert!(!seq.is_active());
        assert_eq!(seq.counter(), 0);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn prompt_can_be_reactivated() {
        let config = ProgressConfig {
            target: 3,
            ..ProgressConfig::default()
        };
        let mut clock = TimerHeap::new();
        let mut seq = ProgressSequencer::new(config);
        seq.activate(&mut clock);
        run_until(&mut seq, &mut clock, 5_000);
        assert_eq!(seq.phase(), Phase::Prompt);

        assert!(seq.activate(&mut clock).is_some());
        let events = run_until(&mut seq, &mut clock, 5_100);
        assert_eq!(labels(&events), vec!["01"]);
    }

    #[test]
    fn stray_token_is_dropped() {
        let mut clock = TimerHeap::new();
        let mut seq = ProgressSequencer::new(ProgressConfig::default());
        let other = clock.schedule_once(Duration::from_millis(1), ProgressCue::Tick);
        seq.activate(&mut clock);

        assert!(seq.handle(other, ProgressCue::Tick, &mut clock).is_none());
        assert_eq!(seq.counter(), 0);
    }

    #[test]
    fn dispose_cancels_pending_task() {
        let mut clock = TimerHeap::new();
        let mut seq = ProgressSequencer::new(ProgressConfig::default());
        seq.activate(&mut clock);
        run_until(&mut seq, &mut clock, 250);

        assert!(seq.dispose(&mut clock));
        assert_eq!(clock.pending(), 0);
    }
}
