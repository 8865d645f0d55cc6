//! Clump aggregates: member bookkeeping, the per-step acceleration
//! accumulator, and mass-property aggregation over members.

use glam::{Mat3, Quat, Vec3};

use super::body::{BodyId, BodyState};
use super::types::{MassProperties, Transform, Velocity};
use crate::utils::math::symmetric_eigen;

/// A member and its fixed pose in the clump's principal frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClumpMember {
    pub id: BodyId,
    pub local: Transform,
}

/// Transient linear/angular acceleration gathered for a clump during one step.
///
/// Lifecycle per step: reset (by the previous propagation) → any number of
/// `accumulate` calls → one consumption by the propagator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClumpAccumulator {
    linear: Vec3,
    angular: Vec3,
}

impl ClumpAccumulator {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn accumulate(&mut self, linear: Vec3, angular: Vec3) {
        self.linear += linear;
        self.angular += angular;
    }

    /// Current `(linear, angular)` totals without consuming them.
    pub fn totals(&self) -> (Vec3, Vec3) {
        (self.linear, self.angular)
    }

    /// Returns the totals and leaves the accumulator zeroed.
    pub fn consume_and_reset(&mut self) -> (Vec3, Vec3) {
        let totals = self.totals();
        self.reset();
        totals
    }

    pub fn is_zero(&self) -> bool {
        self.linear == Vec3::ZERO && self.angular == Vec3::ZERO
    }
}

/// Data carried by a [`super::body::BodyKind::Clump`] body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClumpData {
    pub members: Vec<ClumpMember>,
    pub accumulator: ClumpAccumulator,
}

impl ClumpData {
    pub fn member_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.members.iter().map(|member| member.id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.members.iter().any(|member| member.id == id)
    }
}

/// Rigid properties of a clump derived from its members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClumpProperties {
    pub mass_properties: MassProperties,
    pub transform: Transform,
    pub velocity: Velocity,
}

impl ClumpProperties {
    /// Aggregates mass, centroid, principal inertia, and momentum-weighted velocity.
    ///
    /// Callers guarantee `members` is non-empty with positive masses.
    pub fn from_members(members: &[&BodyState]) -> Self {
        let mass: f32 = members.iter().map(|m| m.mass_properties.mass).sum();
        let centroid = members
            .iter()
            .map(|m| m.transform.position * m.mass_properties.mass)
            .sum::<Vec3>()
            / mass;
        let linear = members
            .iter()
            .map(|m| m.velocity.linear * m.mass_properties.mass)
            .sum::<Vec3>()
            / mass;

        let mut tensor = Mat3::ZERO;
        for member in members {
            let rotation = Mat3::from_quat(member.transform.rotation);
            let own = rotation * member.mass_properties.inertia_tensor() * rotation.transpose();
            let d = member.transform.position - centroid;
            let outer = Mat3::from_cols(d * d.x, d * d.y, d * d.z);
            let parallel_axis = (Mat3::IDENTITY * d.length_squared() - outer)
                * member.mass_properties.mass;
            tensor += own + parallel_axis;
        }

        let (principal, axes) = symmetric_eigen(tensor);
        let rotation = Quat::from_mat3(&axes).normalize();

        // Angular momentum about the centroid, expressed in the principal frame.
        let mut momentum = Vec3::ZERO;
        for member in members {
            let d = member.transform.position - centroid;
            let rotation = Mat3::from_quat(member.transform.rotation);
            let own = rotation * member.mass_properties.inertia_tensor() * rotation.transpose();
            momentum += d.cross(member.velocity.linear * member.mass_properties.mass)
                + own * member.velocity.angular;
        }
        let local_momentum = rotation.inverse() * momentum;
        let angular = rotation * (local_momentum / principal);

        Self {
            mass_properties: MassProperties::new(mass, principal),
            transform: Transform::new(centroid, rotation),
            velocity: Velocity::new(linear, angular),
        }
    }
}
