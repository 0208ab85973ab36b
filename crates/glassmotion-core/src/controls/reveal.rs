//! Reveal screen sequencer.
//!
//! Orchestrates three panels on the demo screen:
//!
//! ```text
//! mount ──2.0s──> AutoDismiss ──0.28s──> AutoReveal
//!   card on        card off               sticky on
//!
//! ChevronTap ──0.12s──> OpenDetail        DetailClosed (no delay)
//!   sticky off           detail on          detail off, sticky on
//! ```
//!
//! A mounted sequencer owns every task it schedules. [`RevealSequencer::unmount`]
//! consumes it after cancelling them, so nothing can touch the state once
//! the screen is gone.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Scheduler, TaskSet, TaskToken};
use crate::events::{Event, RevealTransition};
use crate::storage::RevealConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealCue {
    AutoDismiss,
    AutoReveal,
    OpenDetail,
}

/// Visibility of the three panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    pub card_visible: bool,
    pub sticky_visible: bool,
    pub detail_open: bool,
}

impl RevealState {
    /// The card and banner never share the screen, and the detail view
    /// replaces the banner.
    pub fn is_consistent(&self) -> bool {
        !(self.card_visible && self.sticky_visible) && !(self.detail_open && self.sticky_visible)
    }
}

#[derive(Debug)]
pub struct RevealSequencer {
    config: RevealConfig,
    state: RevealState,
    tasks: TaskSet,
}

impl RevealSequencer {
    /// Show the card and arm the auto-dismiss timer.
    pub fn mount<S>(config: RevealConfig, clock: &mut S) -> (Self, Event)
    where
        S: Scheduler + ?Sized,
        S::Cue: From<RevealCue>,
    {
        let mut tasks = TaskSet::new();
        tasks.track(clock.schedule_once(config.auto_dismiss(), RevealCue::AutoDismiss.into()));
        let seq = Self {
            config,
            state: RevealState {
                card_visible: true,
                ..RevealState::default()
            },
            tasks,
        };
        debug!("reveal screen mounted");
        let event = seq.snapshot(RevealTransition::Mounted);
        (seq, event)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Number of transitions still waiting to fire.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn snapshot(&self, transition: RevealTransition) -> Event {
        Event::Reveal {
            transition,
            state: self.state,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply a scheduled transition. Tokens this screen does not own are
    /// dropped.
    pub fn handle<S>(&mut self, token: TaskToken, cue: RevealCue, clock: &mut S) -> Option<Event>
    where
        S: Scheduler + ?Sized,
        S::Cue: From<RevealCue>,
    {
        if !self.tasks.settle(token) {
            warn!(%token, ?cue, "stray reveal cue");
            return None;
        }

        let transition = match cue {
            RevealCue::AutoDismiss => {
                self.state.card_visible = false;
                self.tasks
                    .track(clock.schedule_once(self.config.reveal_delay(), RevealCue::AutoReveal.into()));
                RevealTransition::AutoDismiss
            }
            RevealCue::AutoReveal => {
                self.state.sticky_visible = true;
                RevealTransition::AutoReveal
            }
            RevealCue::OpenDetail => {
                self.state.detail_open = true;
                RevealTransition::OpenDetail
            }
        };
        debug_assert!(self.state.is_consistent(), "{:?}", self.state);
        debug!(?transition, "reveal transition");
        Some(self.snapshot(transition))
    }

    /// Hide the sticky banner and open the detail view shortly after.
    /// Ignored unless the banner is showing.
    pub fn chevron_tap<S>(&mut self, clock: &mut S) -> Option<Event>
    where
        S: Scheduler + ?Sized,
        S::Cue: From<RevealCue>,
    {
        if !self.state.sticky_visible {
            debug!(state = ?self.state, "chevron tap ignored");
            return None;
        }
        self.state.sticky_visible = false;
        self.tasks
            .track(clock.schedule_once(self.config.open_detail_delay(), RevealCue::OpenDetail.into()));
        Some(self.snapshot(RevealTransition::ChevronTap))
    }

    /// The detail view went away: bring the banner straight back.
    /// Ignored unless the detail view is open.
    pub fn detail_closed(&mut self) -> Option<Event> {
        if !self.state.detail_open {
            debug!(state = ?self.state, "detail close ignored");
            return None;
        }
        self.state.detail_open = false;
        self.state.sticky_visible = true;
        Some(self.snapshot(RevealTransition::DetailClosed))
    }

    /// Cancel every pending transition and drop the screen. Returns how many
    /// transitions were still pending.
    pub fn unmount<S: Scheduler + ?Sized>(mut self, clock: &mut S) -> usize {
        let cancelled = self.tasks.cancel_all(clock);
        debug!(cancelled, "reveal screen unmounted");
        cancelled
    }
}
