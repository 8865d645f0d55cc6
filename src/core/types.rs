use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{IntegratorError, Result};

/// Rigid pose: position and orientation of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Applies `local` on top of this pose, returning the world-space pose.
    pub fn combine(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Expresses the world-space pose `world` relative to this one.
    pub fn relative(&self, world: &Transform) -> Transform {
        let inverse = self.rotation.inverse();
        Transform {
            position: inverse * (world.position - self.position),
            rotation: (inverse * world.rotation).normalize(),
        }
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }
}

/// Mass and diagonal (principal) inertia.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub mass: f32,
    pub inertia: Vec3,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: Vec3::ONE,
        }
    }
}

impl MassProperties {
    pub fn new(mass: f32, inertia: Vec3) -> Self {
        Self { mass, inertia }
    }

    pub fn solid_sphere(radius: f32, density: f32) -> Self {
        let mass = density * 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3);
        Self {
            mass,
            inertia: Vec3::splat(0.4 * mass * radius * radius),
        }
    }

    pub fn solid_box(half_extents: Vec3, density: f32) -> Self {
        let lx = half_extents.x * 2.0;
        let ly = half_extents.y * 2.0;
        let lz = half_extents.z * 2.0;
        let mass = density * lx * ly * lz;
        let factor = mass / 12.0;
        Self {
            mass,
            inertia: Vec3::new(
                factor * (ly * ly + lz * lz),
                factor * (lx * lx + lz * lz),
                factor * (lx * lx + ly * ly),
            ),
        }
    }

    /// Inertia as a diagonal tensor.
    pub fn inertia_tensor(&self) -> Mat3 {
        Mat3::from_diagonal(self.inertia)
    }

    /// Mass and every inertia component must be finite and positive.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if positive(self.mass) && self.inertia.to_array().into_iter().all(positive) {
            Ok(())
        } else {
            Err(IntegratorError::DegenerateMass {
                body: None,
                mass: self.mass,
                inertia: self.inertia.to_array(),
            })
        }
    }
}
