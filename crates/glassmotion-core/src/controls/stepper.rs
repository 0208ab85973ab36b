use crate::events::Event;
use crate::storage::StepperConfig;

/// Plus/minus counter.
#[derive(Debug, Clone)]
pub struct Stepper {
    count: i64,
}

impl Stepper {
    pub fn new(config: &StepperConfig) -> Self {
        Self {
            count: config.initial,
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn snapshot(&self, delta: i64) -> Event {
        Event::Stepper {
            count: self.count,
            delta,
        }
    }

    pub fn increment(&mut self) -> Event {
        self.step(1)
    }

    pub fn decrement(&mut self) -> Event {
        self.step(-1)
    }

    fn step(&mut self, delta: i64) -> Event {
        self.count = self.count.saturating_add(delta);
        self.snapshot(delta)
    }
}
