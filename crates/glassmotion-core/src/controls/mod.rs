mod background;
mod press;
mod progress;
mod reveal;
mod stepper;

pub use background::{BackgroundCue, BackgroundPhase};
pub use press::{PressState, PressTarget};
pub use progress::{Phase, ProgressCue, ProgressSequencer};
pub use reveal::{RevealCue, RevealSequencer, RevealState};
pub use stepper::Stepper;
