//! Cundall non-viscous damping.
//!
//! Each axis of an acceleration candidate is scaled by
//! `1 - damping * sign(load * (v + dt/2 * a))`: accelerations that keep
//! pushing a body along the load are reduced, accelerations of a body moving
//! against its load are amplified.

use glam::Vec3;

use crate::error::{IntegratorError, Result};
use crate::utils::math::sign;

/// Direction-sensitive damper applied independently per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CundallDamper {
    damping: f32,
}

impl CundallDamper {
    /// `damping` must lie in `[0, 1)`.
    pub fn new(damping: f32) -> Result<Self> {
        if !(0.0..1.0).contains(&damping) {
            return Err(IntegratorError::InvalidDamping(damping));
        }
        Ok(Self { damping })
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Damps one axis given its load, velocity, and acceleration candidate.
    #[inline]
    pub fn damp_axis(&self, dt: f32, load: f32, velocity: f32, acceleration: f32) -> f32 {
        let predicted = velocity + 0.5 * dt * acceleration;
        acceleration * (1.0 - self.damping * sign(load * predicted))
    }

    /// Damps all three axes of one vector channel.
    pub fn damp_vector(&self, dt: f32, load: Vec3, velocity: Vec3, acceleration: Vec3) -> Vec3 {
        Vec3::new(
            self.damp_axis(dt, load.x, velocity.x, acceleration.x),
            self.damp_axis(dt, load.y, velocity.y, acceleration.y),
            self.damp_axis(dt, load.z, velocity.z, acceleration.z),
        )
    }

    /// Damps the linear channel against `force` and the angular channel
    /// against `torque`, returning `(acceleration, angular_acceleration)`.
    #[allow(clippy::too_many_arguments)]
    pub fn damp(
        &self,
        dt: f32,
        force: Vec3,
        velocity: Vec3,
        acceleration: Vec3,
        torque: Vec3,
        angular_velocity: Vec3,
        angular_acceleration: Vec3,
    ) -> (Vec3, Vec3) {
        (
            self.damp_vector(dt, force, velocity, acceleration),
            self.damp_vector(dt, torque, angular_velocity, angular_acceleration),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 0.01;

    #[test]
    fn zero_damping_is_identity() {
        let damper = CundallDamper::new(0.0).unwrap();
        let a = Vec3::new(1.5, -2.0, 0.3);
        let out = damper.damp_vector(DT, Vec3::new(1.0, -4.0, 0.0), Vec3::new(-3.0, 2.0, 1.0), a);
        assert_eq!(out, a);
    }

    #[test]
    fn load_along_motion_reduces_acceleration() {
        let damper = CundallDamper::new(0.3).unwrap();
        let out = damper.damp_axis(DT, 1.0, 1.0, 1.0);
        assert_relative_eq!(out, 0.7, epsilon = 1e-6);
    }

    #[test]
    fn load_against_motion_amplifies_acceleration() {
        let damper = CundallDamper::new(0.3).unwrap();
        let out = damper.damp_axis(DT, 1.0, -1.0, 1.0);
        assert_relative_eq!(out, 1.3, epsilon = 1e-6);
    }

    #[test]
    fn uses_half_step_predicted_velocity() {
        let damper = CundallDamper::new(0.5).unwrap();
        // v = -0.1 but v + dt/2 * a = -0.1 + 0.5 * 1.0 * 1.0 > 0.
        let out = damper.damp_axis(1.0, 1.0, -0.1, 1.0);
        assert_relative_eq!(out, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn zero_product_leaves_acceleration_untouched() {
        let damper = CundallDamper::new(0.9).unwrap();
        assert_eq!(damper.damp_axis(DT, 0.0, 5.0, 2.0), 2.0);
        assert_eq!(damper.damp_axis(DT, 3.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn damping_range_is_validated() {
        assert!(CundallDamper::new(-0.1).is_err());
        assert!(CundallDamper::new(1.0).is_err());
        assert!(CundallDamper::new(f32::NAN).is_err());
        assert_eq!(CundallDamper::new(0.99).unwrap().damping(), 0.99);
    }

    #[test]
    fn axes_are_independent() {
        let damper = CundallDamper::new(0.2).unwrap();
        let (linear, angular) = damper.damp(
            DT,
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::ONE,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );
        assert!(linear.abs_diff_eq(Vec3::new(0.8, 1.2, 1.0), 1e-6));
        assert!(angular.abs_diff_eq(Vec3::new(1.0, 1.0, 0.8), 1e-6));
    }
}
