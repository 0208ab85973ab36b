//! Render surface seam.
//!
//! The presentation layer implements [`RenderSurface`] and receives every
//! stamped event. Easing, blur and colour are its business; it never writes
//! control state back except through [`crate::stage::Input`].

use crate::events::Stamped;

pub trait RenderSurface {
    fn render(&mut self, frame: &Stamped);
}

impl<F: FnMut(&Stamped)> RenderSurface for F {
    fn render(&mut self, frame: &Stamped) {
        self(frame)
    }
}

/// Surface that keeps every frame, for tests and offline runs.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    frames: Vec<Stamped>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Stamped] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Stamped> {
        self.frames
    }
}

impl RenderSurface for Recorder {
    fn render(&mut self, frame: &Stamped) {
        self.frames.push(frame.clone());
    }
}
