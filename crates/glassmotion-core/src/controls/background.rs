//! Background colour-phase clock.
//!
//! A single repeating task advances a phase angle for the animated
//! backdrop. The colour mapping belongs to the render surface; this only
//! owns the number and its cadence.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Scheduler, TaskToken};
use crate::events::Event;
use crate::storage::BackgroundConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundCue {
    Advance,
}

#[derive(Debug)]
pub struct BackgroundPhase {
    config: BackgroundConfig,
    phase: f64,
    tick: TaskToken,
}

impl BackgroundPhase {
    /// Start the phase clock at zero.
    pub fn mount<S>(config: BackgroundConfig, clock: &mut S) -> (Self, Event)
    where
        S: Scheduler + ?Sized,
        S::Cue: From<BackgroundCue>,
    {
        let tick = clock.schedule_repeating(config.interval(), BackgroundCue::Advance.into());
        let background = Self {
            config,
            phase: 0.0,
            tick,
        };
        debug!(%tick, "background clock started");
        let event = background.snapshot(false);
        (background, event)
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn snapshot(&self, wrapped: bool) -> Event {
        Event::Background {
            phase: self.phase,
            wrapped,
        }
    }

    /// Advance the phase by one step, wrapping to zero past the limit.
    pub fn handle(&mut self, token: TaskToken, cue: BackgroundCue) -> Option<Event> {
        if token != self.tick {
            warn!(%token, ?cue, "stray background cue");
            return None;
        }
        self.phase += self.config.step;
        let wrapped = self.phase > self.config.wrap;
        if wrapped {
            self.phase = 0.0;
        }
        Some(self.snapshot(wrapped))
    }

    /// Stop the clock. Returns `false` if the tick was already gone.
    pub fn dispose<S: Scheduler + ?Sized>(self, clock: &mut S) -> bool {
        clock.cancel(self.tick)
    }
}
