//! The demo screen.
//!
//! A [`Stage`] owns one of each control: the glass progress button (press
//! feedback plus counting run), the plus/minus stepper, the reveal panels
//! and the animated background. It routes user [`Input`] and due [`Cue`]s to the control that
//! owns them and stamps the resulting events for a [`RenderSurface`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{as_millis, Due, Scheduler, TimerHeap};
use crate::controls::{
    BackgroundCue, BackgroundPhase, PressState, ProgressCue, ProgressSequencer, RevealCue,
    RevealSequencer, RevealState, Stepper,
};
use crate::error::ValidationError;
use crate::events::{Event, ProgressTransition, Stamped};
use crate::render::RenderSurface;
use crate::storage::Config;

/// Every cue the stage's controls schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Progress(ProgressCue),
    Reveal(RevealCue),
    Background(BackgroundCue),
}

impl From<ProgressCue> for Cue {
    fn from(cue: ProgressCue) -> Self {
        Cue::Progress(cue)
    }
}

impl From<RevealCue> for Cue {
    fn from(cue: RevealCue) -> Self {
        Cue::Reveal(cue)
    }
}

impl From<BackgroundCue> for Cue {
    fn from(cue: BackgroundCue) -> Self {
        Cue::Background(cue)
    }
}

/// The only ways the outside world can change the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    /// Activate the progress button directly, without press feedback.
    Activate,
    PointerDown,
    /// Releases the progress button; completes a press and activates it.
    PointerUp,
    ChevronTap,
    DetailClosed,
    Increment,
    Decrement,
}

impl Input {
    pub const ALL: [Input; 7] = [
        Input::Activate,
        Input::PointerDown,
        Input::PointerUp,
        Input::ChevronTap,
        Input::DetailClosed,
        Input::Increment,
        Input::Decrement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Input::Activate => "activate",
            Input::PointerDown => "pointer_down",
            Input::PointerUp => "pointer_up",
            Input::ChevronTap => "chevron_tap",
            Input::DetailClosed => "detail_closed",
            Input::Increment => "increment",
            Input::Decrement => "decrement",
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Input {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let input = match s.as_str() {
            "activate" | "tap" => Input::Activate,
            "pointer_down" | "down" => Input::PointerDown,
            "pointer_up" | "up" => Input::PointerUp,
            "chevron_tap" | "chevron" => Input::ChevronTap,
            "detail_closed" | "back" => Input::DetailClosed,
            "increment" | "+" => Input::Increment,
            "decrement" | "-" => Input::Decrement,
            _ => {
                return Err(ValidationError::InvalidValue {
                    field: "input".into(),
                    message: format!("unknown input '{s}'"),
                })
            }
        };
        Ok(input)
    }
}

#[derive(Debug)]
pub struct Stage {
    press: PressState,
    progress: ProgressSequencer,
    stepper: Stepper,
    reveal: RevealSequencer,
    background: BackgroundPhase,
}

impl Stage {
    /// Build the screen and start its forward reveal timeline. The returned
    /// events are the initial render of every control.
    pub fn mount<S>(config: &Config, clock: &mut S) -> (Self, Vec<Event>)
    where
        S: Scheduler<Cue = Cue> + ?Sized,
    {
        let (reveal, mounted) = RevealSequencer::mount(config.reveal.clone(), clock);
        let (background, backdrop) = BackgroundPhase::mount(config.background.clone(), clock);
        let stage = Self {
            press: PressState::new(config.press.clone()),
            progress: ProgressSequencer::new(config.progress.clone()),
            stepper: Stepper::new(&config.stepper),
            reveal,
            background,
        };
        let initial = vec![
            stage.progress.snapshot(ProgressTransition::Initial),
            stage.press.snapshot(),
            stage.stepper.snapshot(0),
            mounted,
            backdrop,
        ];
        debug!("stage mounted");
        (stage, initial)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn progress(&self) -> &ProgressSequencer {
        &self.progress
    }

    pub fn press(&self) -> &PressState {
        &self.press
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal.state()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply<S>(&mut self, input: Input, clock: &mut S) -> Vec<Event>
    where
        S: Scheduler<Cue = Cue> + ?Sized,
    {
        debug!(%input, "input");
        match input {
            Input::Activate => self.progress.activate(clock).into_iter().collect(),
            Input::PointerDown => vec![self.press.on_pointer_down()],
            Input::PointerUp => {
                let progress = &mut self.progress;
                let (released, activated) = self.press.on_pointer_up(|| progress.activate(clock));
                std::iter::once(released)
                    .chain(activated.flatten())
                    .collect()
            }
            Input::ChevronTap => self.reveal.chevron_tap(clock).into_iter().collect(),
            Input::DetailClosed => self.reveal.detail_closed().into_iter().collect(),
            Input::Increment => vec![self.stepper.increment()],
            Input::Decrement => vec![self.stepper.decrement()],
        }
    }

    /// Route a due task to the control that scheduled it.
    pub fn dispatch<S>(&mut self, due: Due<Cue>, clock: &mut S) -> Option<Event>
    where
        S: Scheduler<Cue = Cue> + ?Sized,
    {
        match due.cue {
            Cue::Progress(cue) => self.progress.handle(due.token, cue, clock),
            Cue::Reveal(cue) => self.reveal.handle(due.token, cue, clock),
            Cue::Background(cue) => self.background.handle(due.token, cue),
        }
    }

    /// Deliver every task due up to `until`, rendering each resulting event
    /// at its deadline, then move the clock to `until`.
    pub fn pump<R>(&mut self, clock: &mut TimerHeap<Cue>, until: Duration, surface: &mut R) -> usize
    where
        R: RenderSurface + ?Sized,
    {
        let mut rendered = 0;
        while let Some(due) = clock.pop_due(until) {
            let at = as_millis(due.at);
            if let Some(event) = self.dispatch(due, clock) {
                surface.render(&Stamped::new(at, event));
                rendered += 1;
            }
        }
        clock.advance_to(until);
        rendered
    }

    /// Apply an input at the clock's current time and render the result.
    pub fn feed<R>(&mut self, input: Input, clock: &mut TimerHeap<Cue>, surface: &mut R) -> usize
    where
        R: RenderSurface + ?Sized,
    {
        let at = as_millis(clock.now());
        let events = self.apply(input, clock);
        for event in &events {
            surface.render(&Stamped::new(at, event.clone()));
        }
        events.len()
    }

    /// Tear the screen down. Returns how many pending tasks were cancelled.
    pub fn unmount<S>(self, clock: &mut S) -> usize
    where
        S: Scheduler<Cue = Cue> + ?Sized,
    {
        let progress = usize::from(self.progress.dispose(clock));
        let reveal = self.reveal.unmount(clock);
        let phase = self.background.phase();
        let background = usize::from(self.background.dispose(clock));
        let cancelled = progress + reveal + background;
        debug!(cancelled, phase, "stage unmounted");
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Phase;
    use crate::render::Recorder;

    #[test]
    fn input_parses_names_and_aliases() {
        for input in Input::ALL {
            assert_eq!(input.as_str().parse::<Input>().unwrap(), input);
        }
        assert_eq!("back".parse::<Input>().unwrap(), Input::DetailClosed);
        assert_eq!(" + ".parse::<Input>().unwrap(), Input::Increment);
        assert!("jump".parse::<Input>().is_err());
    }

    #[test]
    fn mount_renders_every_control() {
        let mut clock = TimerHeap::new();
        let (_, initial) = Stage::mount(&Config::default(), &mut clock);
        assert_eq!(initial.len(), 5);
        assert!(matches!(initial[4], Event::Background { phase, .. } if phase == 0.0));
        assert!(matches!(
            initial[0],
            Event::Progress {
                transition: ProgressTransition::Initial,
                ..
            }
        ));
    }

    #[test]
    fn pointer_up_activates_progress_once() {
        let mut clock = TimerHeap::new();
        let (mut stage, _) = Stage::mount(&Config::default(), &mut clock);

        assert_eq!(stage.apply(Input::PointerDown, &mut clock).len(), 1);
        assert!(stage.press().is_pressed());
        let events = stage.apply(Input::PointerUp, &mut clock);
        assert_eq!(events.len(), 2);
        assert_eq!(stage.progress().phase(), Phase::Counting);

        // A stray release does not start anything.
        assert_eq!(stage.apply(Input::PointerUp, &mut clock).len(), 1);
    }

    #[test]
    fn press_during_run_does_not_restart() {
        let mut clock = TimerHeap::new();
        let mut recorder = Recorder::new();
        let (mut stage, _) = Stage::mount(&Config::default(), &mut clock);

        stage.feed(Input::Activate, &mut clock, &mut recorder);
        stage.pump(&mut clock, Duration::from_millis(1_000), &mut recorder);
        stage.feed(Input::PointerDown, &mut clock, &mut recorder);
        let rendered = stage.feed(Input::PointerUp, &mut clock, &mut recorder);

        assert_eq!(rendered, 1, "only the release renders");
        assert_eq!(stage.progress().counter(), 10);
    }

    #[test]
    fn press_and_progress_are_independent() {
        let mut clock = TimerHeap::new();
        let mut recorder = Recorder::new();
        let (mut stage, _) = Stage::mount(&Config::default(), &mut clock);

        stage.feed(Input::Activate, &mut clock, &mut recorder);
        stage.feed(Input::PointerDown, &mut clock, &mut recorder);
        stage.pump(&mut clock, Duration::from_millis(500), &mut recorder);

        assert!(stage.press().is_pressed());
        assert_eq!(stage.progress().counter(), 5);
    }

    #[test]
    fn unmount_cancels_everything() {
        let mut clock = TimerHeap::new();
        let (mut stage, _) = Stage::mount(&Config::default(), &mut clock);
        stage.apply(Input::Activate, &mut clock);
        assert_eq!(clock.pending(), 3);

        assert_eq!(stage.unmount(&mut clock), 3);
        assert_eq!(clock.pending(), 0);
        assert!(clock.pop_due(Duration::from_secs(60)).is_none());
    }

    #[test]
    fn background_advances_alongside_other_controls() {
        let mut clock = TimerHeap::new();
        let mut recorder = Recorder::new();
        let (mut stage, _) = Stage::mount(&Config::default(), &mut clock);

        stage.feed(Input::Activate, &mut clock, &mut recorder);
        stage.pump(&mut clock, Duration::from_millis(1_000), &mut recorder);

        let phases: Vec<f64> = recorder
            .frames()
            .iter()
            .filter_map(|f| match f.event {
                Event::Background { phase, .. } => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases.len(), 20);
        assert!((phases[19] - 1.0).abs() < 1e-9);
        assert_eq!(stage.progress().counter(), 10);
    }
}
