use std::time::{Duration, Instant};

/// Sleeps the host loop down to a target framerate
pub struct Framepacer {
    frame_start: Instant,
    budget: Option<Duration>,
}

impl Framepacer {
    /// A `target_fps` of zero disables pacing
    pub fn new(target_fps: u32) -> Self {
        Self {
            frame_start: Instant::now(),
            budget: frame_budget(target_fps),
        }
    }

    pub fn frametime(&self) -> Duration {
        self.frame_start.elapsed()
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    pub fn end_frame(&mut self) {
        let Some(budget) = self.budget else {
            return;
        };

        const ACCURACY: Duration = Duration::from_micros(100);
        if let Some(sleep_time) = budget.checked_sub(self.frametime() + ACCURACY) {
            std::thread::sleep(sleep_time);

            while self.frametime() < budget {
                std::thread::yield_now();
            }
        }
    }
}

fn frame_budget(target_fps: u32) -> Option<Duration> {
    (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64))
}
