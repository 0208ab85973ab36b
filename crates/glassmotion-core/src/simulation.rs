//! Deterministic simulation harness for the stage.
//!
//! Runs a [`Script`] of timed inputs against a [`Stage`] on virtual time.
//! The same script always yields the same stamped event log, which makes
//! it the basis for regression tests and the CLI's `simulate` command.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::TimerHeap;
use crate::error::Result;
use crate::events::Stamped;
use crate::render::{Recorder, RenderSurface};
use crate::stage::{Cue, Input, Stage};
use crate::storage::Config;

/// How long to keep running after the last scripted step when the script
/// does not say.
const DEFAULT_TAIL_MS: u64 = 15_000;

/// Longest stretch of virtual time a simulation will cover.
pub const MAX_SPAN_MS: u64 = 3_600_000;

/// One timed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    pub input: Input,
}

/// Timed inputs plus optional teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Unmount the stage at this time. Steps at or after it are not applied.
    #[serde(default)]
    pub unmount_at_ms: Option<u64>,
    /// Stop the clock here. Defaults to a tail after the last step.
    #[serde(default)]
    pub until_ms: Option<u64>,
}

impl Script {
    /// Tap the progress button, then open and close the detail view once
    /// the sticky banner is up.
    pub fn demo() -> Self {
        Self {
            steps: vec![
                Step {
                    at_ms: 0,
                    input: Input::PointerDown,
                },
                Step {
                    at_ms: 120,
                    input: Input::PointerUp,
                },
                Step {
                    at_ms: 500,
                    input: Input::Increment,
                },
                Step {
                    at_ms: 3_000,
                    input: Input::ChevronTap,
                },
                Step {
                    at_ms: 4_500,
                    input: Input::DetailClosed,
                },
            ],
            unmount_at_ms: None,
            until_ms: Some(14_000),
        }
    }

    pub fn step(mut self, at_ms: u64, input: Input) -> Self {
        self.steps.push(Step { at_ms, input });
        self
    }

    pub fn unmount_at(mut self, at_ms: u64) -> Self {
        self.unmount_at_ms = Some(at_ms);
        self
    }

    pub fn until(mut self, at_ms: u64) -> Self {
        self.until_ms = Some(at_ms);
        self
    }

    /// Load a script from a `.json` or `.toml` file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let script = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };
        Ok(script)
    }

    /// When the run stops: `until_ms`, pushed out to the unmount if that is
    /// later, and never past [`MAX_SPAN_MS`].
    fn end_ms(&self) -> u64 {
        let mut end = self.until_ms.unwrap_or_else(|| {
            let last = self.steps.iter().map(|s| s.at_ms).max().unwrap_or(0);
            last.max(self.unmount_at_ms.unwrap_or(0))
                .saturating_add(DEFAULT_TAIL_MS)
        });
        if let Some(at) = self.unmount_at_ms.filter(|at| *at > end) {
            warn!(unmount_at_ms = at, until_ms = end, "unmount is after the end of the run, extending it");
            end = at;
        }
        if end > MAX_SPAN_MS {
            warn!(end_ms = end, max_ms = MAX_SPAN_MS, "run too long, clamping");
            end = MAX_SPAN_MS;
        }
        end
    }
}

/// What happened during a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub frames: Vec<Stamped>,
    /// Time the stage was unmounted, if it was.
    pub unmounted_at_ms: Option<u64>,
    /// Tasks cancelled by the unmount.
    pub cancelled: usize,
    /// Tasks still pending on the clock when the run stopped.
    pub pending_at_end: usize,
    pub ended_at_ms: u64,
}

impl SimulationReport {
    /// Frames stamped strictly after the unmount.
    pub fn frames_after_unmount(&self) -> impl Iterator<Item = &Stamped> {
        let cutoff = self.unmounted_at_ms;
        self.frames
            .iter()
            .filter(move |f| cutoff.is_some_and(|at| f.at_ms > at))
    }
}

/// Run `script` against a fresh stage, forwarding every frame to `surface`.
pub fn simulate_into<R>(script: &Script, config: &Config, surface: &mut R) -> SimulationReport
where
    R: RenderSurface + ?Sized,
{
    let mut steps = script.steps.clone();
    steps.sort_by_key(|s| s.at_ms);
    let end = script.end_ms();

    let unmount_at = script.unmount_at_ms.filter(|at| *at <= end);
    if unmount_at.is_none() {
        if let Some(at) = script.unmount_at_ms {
            warn!(unmount_at_ms = at, end_ms = end, "unmount is past the longest run, skipped");
        }
    }
    let late = steps.iter().filter(|s| s.at_ms > end).count();
    if late > 0 {
        warn!(steps = late, end_ms = end, "steps after the end of the run are skipped");
    }

    let mut clock: TimerHeap<Cue> = TimerHeap::new();
    let mut recorder = Recorder::new();
    let mut report = SimulationReport::default();
    let mut tee = |frame: &Stamped| {
        recorder.render(frame);
        surface.render(frame);
    };

    let (mut stage, initial) = Stage::mount(config, &mut clock);
    for event in initial {
        tee(&Stamped::new(0, event));
    }

    let applicable = steps
        .iter()
        .filter(|s| s.at_ms <= end && unmount_at.map_or(true, |at| s.at_ms < at));
    for step in applicable {
        stage.pump(&mut clock, Duration::from_millis(step.at_ms), &mut tee);
        stage.feed(step.input, &mut clock, &mut tee);
    }

    match unmount_at {
        Some(at) => {
            stage.pump(&mut clock, Duration::from_millis(at), &mut tee);
            report.cancelled = stage.unmount(&mut clock);
            report.unmounted_at_ms = Some(at);
            debug!(at_ms = at, cancelled = report.cancelled, "simulated unmount");
            clock.advance_to(Duration::from_millis(end));
        }
        None => {
            stage.pump(&mut clock, Duration::from_millis(end), &mut tee);
        }
    }

    report.pending_at_end = clock.pending();
    report.ended_at_ms = end;
    report.frames = recorder.into_frames();
    report
}

/// Run `script` and collect the report.
pub fn simulate(script: &Script, config: &Config) -> SimulationReport {
    simulate_into(script, config, &mut |_: &Stamped| {})
}
