//! Configuration constants and the serializable integrator configuration.

use serde::{Deserialize, Serialize};

use crate::dynamics::integrator::StepContext;
use crate::error::{IntegratorError, Result};

/// Default gravity vector (Z-up world, gravity pointing down).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, 0.0, -9.81];

/// Default integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0e-4;

/// Default Cundall damping coefficient.
pub const DEFAULT_DAMPING: f32 = 0.2;

/// Angular speeds below this magnitude produce no orientation change.
pub const ROTATION_EPSILON: f32 = 1e-9;

/// Settings consumed by [`crate::world::DemWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    pub time_step: f32,
    pub damping: f32,
    pub gravity: [f32; 3],
    pub parallel: bool,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            damping: DEFAULT_DAMPING,
            gravity: DEFAULT_GRAVITY,
            parallel: false,
        }
    }
}

impl IntegratorConfig {
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_gravity(mut self, gravity: [f32; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks the timestep and damping ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(IntegratorError::InvalidTimeStep(self.time_step));
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(IntegratorError::InvalidDamping(self.damping));
        }
        Ok(())
    }

    /// Builds the per-step context handed to the integrator.
    pub fn context(&self) -> Result<StepContext> {
        self.validate()?;
        StepContext::new(self.time_step, self.damping)
    }
}
