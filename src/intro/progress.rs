// intro/progress.rs

use rand::Rng;

use crate::config::progress::MAX_PROGRESS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Completed,
}

/// Fake loading bar: advances by a small random step every tick until 100.
pub struct ProgressDriver {
    progress: u32,
    tick: f64,
    min_step: u32,
    max_step: u32,
    accumulator: f64,
    active: bool,
    completed: bool,
}

impl ProgressDriver {
    pub fn new(tick_ms: u64, min_step: u32, max_step: u32) -> Self {
        ProgressDriver {
            progress: 0,
            tick: tick_ms as f64 / 1000.0,
            min_step: min_step.max(1),
            max_step: max_step.max(min_step.max(1)),
            accumulator: 0.0,
            active: false,
            completed: false,
        }
    }

    pub fn start(&mut self) {
        if !self.completed {
            self.active = true;
        }
    }

    /// Advances by `dt` seconds of wall-clock time. Returns `Completed` on the
    /// single update where progress saturates.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> Option<ProgressEvent> {
        if !self.active {
            return None;
        }

        self.accumulator += dt.max(0.0);
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            self.progress += rng.random_range(self.min_step..=self.max_step);

            if self.progress >= MAX_PROGRESS {
                self.progress = MAX_PROGRESS;
                self.active = false;
                self.completed = true;
                self.accumulator = 0.0;
                return Some(ProgressEvent::Completed);
            }
        }
        None
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Progress as 0.0..=1.0 for the bar width
    pub fn fraction(&self) -> f64 {
        self.progress as f64 / MAX_PROGRESS as f64
    }
}
