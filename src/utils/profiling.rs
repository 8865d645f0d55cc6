use std::time::{Duration, Instant};

/// Timing and counts gathered over one integration step.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfile {
    pub load_time: Duration,
    pub integration_time: Duration,

    pub body_count: usize,
    pub clump_count: usize,
    pub member_count: usize,
}

impl StepProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.integration_time
    }

    pub fn report(&self) {
        let total_us = self.total_time().as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        log::info!(
            "bodies: {}, clumps: {}, members: {}, step {:.3} ms",
            self.body_count,
            self.clump_count,
            self.member_count,
            self.total_time().as_secs_f32() * 1000.0
        );
        log::info!(
            "  loads {:.1}% | integrate {:.1}%",
            (self.load_time.as_micros() as f32 / total_us) * 100.0,
            (self.integration_time.as_micros() as f32 / total_us) * 100.0
        );
    }
}

/// Adds the elapsed time to `output` when dropped.
pub struct PhaseTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for PhaseTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
