//! Realtime driver.
//!
//! Runs a [`Stage`] against the wall clock on a single task: sleep until
//! the next deadline or the next input, whichever comes first, then
//! deliver everything that is due. All mutation happens on this one task.
//! Closing the input channel unmounts the stage.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::clock::{as_millis, TimerHeap};
use crate::events::Stamped;
use crate::render::RenderSurface;
use crate::stage::{Cue, Input, Stage};
use crate::storage::Config;

/// How long to wait for input when nothing is scheduled.
const IDLE_WAIT: Duration = Duration::from_secs(3_600);

/// Summary of a realtime session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub inputs: usize,
    pub frames: usize,
    /// Pending tasks cancelled when the stage unmounted.
    pub cancelled: usize,
    pub elapsed_ms: u64,
}

/// Mount a stage and drive it until `inputs` closes.
pub async fn run_realtime<R>(
    config: &Config,
    mut inputs: mpsc::Receiver<Input>,
    surface: &mut R,
) -> RunSummary
where
    R: RenderSurface + ?Sized,
{
    let origin = Instant::now();
    let mut clock: TimerHeap<Cue> = TimerHeap::new();
    let mut frames = 0;
    let mut input_count = 0;

    let (mut stage, initial) = Stage::mount(config, &mut clock);
    for event in initial {
        surface.render(&Stamped::new(0, event));
        frames += 1;
    }
    info!("stage running");

    loop {
        let wake = clock
            .next_deadline()
            .map(|deadline| origin + deadline)
            .unwrap_or_else(|| Instant::now() + IDLE_WAIT);

        let received = tokio::select! {
            _ = tokio::time::sleep_until(wake) => None,
            input = inputs.recv() => match input {
                Some(input) => Some(input),
                None => break,
            },
        };

        frames += stage.pump(&mut clock, origin.elapsed(), surface);
        if let Some(input) = received {
            input_count += 1;
            frames += stage.feed(input, &mut clock, surface);
        }
    }

    frames += stage.pump(&mut clock, origin.elapsed(), surface);
    let cancelled = stage.unmount(&mut clock);
    let elapsed_ms = as_millis(origin.elapsed());
    debug!(cancelled, elapsed_ms, "input closed, stage unmounted");

    RunSummary {
        inputs: input_count,
        frames,
        cancelled,
        elapsed_ms,
    }
}
