use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::storage::PressConfig;

/// Values the render surface should animate a pressable control towards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressTarget {
    pub scale: f32,
    pub shadow_radius: f32,
    pub shadow_offset: f32,
}

/// Pressed/released tracking for a single-pointer control.
#[derive(Debug, Clone)]
pub struct PressState {
    config: PressConfig,
    pressed: bool,
}

impl PressState {
    pub fn new(config: PressConfig) -> Self {
        Self {
            config,
            pressed: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn target(&self) -> PressTarget {
        let c = &self.config;
        if self.pressed {
            PressTarget {
                scale: c.pressed_scale,
                shadow_radius: c.pressed_shadow_radius,
                shadow_offset: c.pressed_shadow_offset,
            }
        } else {
            PressTarget {
                scale: 1.0,
                shadow_radius: c.shadow_radius,
                shadow_offset: c.shadow_offset,
            }
        }
    }

    pub fn snapshot(&self) -> Event {
        Event::Press {
            pressed: self.pressed,
            target: self.target(),
        }
    }

    pub fn on_pointer_down(&mut self) -> Event {
        self.pressed = true;
        self.snapshot()
    }

    /// Release the control. `action` runs only if this up ends a down,
    /// so it fires exactly once per down/up pair.
    pub fn on_pointer_up<R>(&mut self, action: impl FnOnce() -> R) -> (Event, Option<R>) {
        let was_pressed = std::mem::replace(&mut self.pressed, false);
        let result = was_pressed.then(action);
        (self.snapshot(), result)
    }
}
