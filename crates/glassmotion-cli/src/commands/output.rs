use std::io::Write;

use chrono::{DateTime, Utc};
use glassmotion_core::{RenderSurface, Stamped};
use serde::Serialize;

/// Render surface that prints one JSON object per frame.
pub struct JsonLines<W: Write> {
    out: W,
    wall_clock: bool,
    written: usize,
}

#[derive(Serialize)]
struct WallFrame<'a> {
    wall: DateTime<Utc>,
    #[serde(flatten)]
    frame: &'a Stamped,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            wall_clock: false,
            written: 0,
        }
    }

    /// Add the wall-clock time each frame was rendered at.
    pub fn with_wall_clock(mut self) -> Self {
        self.wall_clock = true;
        self
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl<W: Write> RenderSurface for JsonLines<W> {
    fn render(&mut self, frame: &Stamped) {
        let line = if self.wall_clock {
            serde_json::to_string(&WallFrame {
                wall: Utc::now(),
                frame,
            })
        } else {
            serde_json::to_string(frame)
        };
        match line {
            Ok(line) => {
                if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
                    tracing::warn!(error = %e, "failed to write frame");
                    return;
                }
                self.written += 1;
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode frame"),
        }
    }
}
