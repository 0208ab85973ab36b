//! # Glassmotion Core Library
//!
//! This library provides the timed state choreography behind a set of
//! animated glass controls and a multi-panel demo screen. It produces
//! discrete state values and timestamps; all easing and drawing belongs to
//! whatever render surface consumes the events.
//!
//! ## Architecture
//!
//! - **Clock**: A caller-driven timer heap with cancellable one-shot and
//!   repeating tasks. Controls schedule typed cues, never callbacks.
//! - **Controls**: The progress button sequencer, press feedback, the
//!   plus/minus stepper, the reveal panel sequencer and the background
//!   colour-phase clock.
//! - **Stage**: The demo screen that owns one of each control and routes
//!   inputs and due cues to them.
//! - **Drivers**: A deterministic virtual-time simulation and a tokio-based
//!   realtime runner.
//! - **Storage**: TOML-based configuration of timings and labels.
//!
//! ## Key Components
//!
//! - [`ProgressSequencer`]: Counting run with re-entrancy guard
//! - [`RevealSequencer`]: Card / sticky banner / detail choreography
//! - [`TimerHeap`]: Scheduler implementation
//! - [`Stage`]: Demo screen
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod controls;
pub mod error;
pub mod events;
pub mod render;
pub mod runtime;
pub mod simulation;
pub mod stage;
pub mod storage;

pub use clock::{Due, Scheduler, TaskSet, TaskToken, TimerHeap};
pub use controls::{
    BackgroundCue, BackgroundPhase, Phase, PressState, PressTarget, ProgressCue,
    ProgressSequencer, RevealCue, RevealSequencer, RevealState, Stepper,
};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{Event, ProgressTransition, RevealTransition, Stamped};
pub use render::{Recorder, RenderSurface};
pub use runtime::{run_realtime, RunSummary};
pub use simulation::{simulate, simulate_into, Script, SimulationReport, Step};
pub use stage::{Cue, Input, Stage};
pub use storage::Config;
