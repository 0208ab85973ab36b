use serde::{Deserialize, Serialize};

use crate::controls::{Phase, PressTarget, RevealState};

/// Which progress transition produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTransition {
    /// Initial render, no transition.
    Initial,
    Started,
    Ticked,
    /// Counter reached its target.
    Finished,
    Celebrated,
    Prompted,
}

/// Which reveal transition produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealTransition {
    Mounted,
    AutoDismiss,
    AutoReveal,
    ChevronTap,
    OpenDetail,
    DetailClosed,
}

/// Every state change in the system produces an Event carrying the full
/// state of the control that changed. Render surfaces only read these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Progress {
        transition: ProgressTransition,
        phase: Phase,
        counter: u32,
        label: String,
        active: bool,
    },
    Press {
        pressed: bool,
        target: PressTarget,
    },
    Reveal {
        transition: RevealTransition,
        state: RevealState,
    },
    Stepper {
        count: i64,
        delta: i64,
    },
    /// Background colour phase in radians.
    Background {
        phase: f64,
        wrapped: bool,
    },
}

/// An event with the clock time it happened at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: Event,
}

impl Stamped {
    pub fn new(at_ms: u64, event: Event) -> Self {
        Self { at_ms, event }
    }
}
