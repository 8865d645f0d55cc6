use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::clump::ClumpData;
use super::dof::BlockedDofs;
use super::types::{MassProperties, Transform, Velocity};

/// Stable body identifier. Ids are handed out in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role of a body in the clump taxonomy.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BodyKind {
    #[default]
    Standalone,
    Clump(ClumpData),
    /// Member of the clump with the given id; never integrated on its own.
    Member { clump: BodyId },
}

/// Kinematic and inertial state of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub transform: Transform,
    pub velocity: Velocity,
    pub acceleration: Vec3,
    pub angular_acceleration: Vec3,
    pub mass_properties: MassProperties,
    pub blocked_dofs: BlockedDofs,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            velocity: Velocity::default(),
            acceleration: Vec3::ZERO,
            angular_acceleration: Vec3::ZERO,
            mass_properties: MassProperties::default(),
            blocked_dofs: BlockedDofs::NONE,
        }
    }
}

/// A body stored in the [`crate::core::registry::BodyRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub dynamic: bool,
    pub kind: BodyKind,
    pub state: BodyState,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            id: BodyId(u32::MAX),
            dynamic: true,
            kind: BodyKind::Standalone,
            state: BodyState::default(),
        }
    }
}

impl Body {
    /// Dynamic standalone body at `position` with the given mass properties.
    pub fn new(position: Vec3, mass_properties: MassProperties) -> Self {
        Self {
            state: BodyState {
                transform: Transform::from_position(position),
                mass_properties,
                ..BodyState::default()
            },
            ..Self::default()
        }
    }

    /// Non-dynamic body, excluded from integration.
    pub fn fixed(position: Vec3) -> Self {
        Self {
            dynamic: false,
            ..Self::new(position, MassProperties::default())
        }
    }

    pub fn with_velocity(mut self, linear: Vec3, angular: Vec3) -> Self {
        self.state.velocity = Velocity::new(linear, angular);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.state.transform = transform;
        self
    }

    pub fn with_blocked_dofs(mut self, blocked: BlockedDofs) -> Self {
        self.state.blocked_dofs = blocked;
        self
    }

    pub fn is_standalone(&self) -> bool {
        matches!(self.kind, BodyKind::Standalone)
    }

    pub fn is_clump(&self) -> bool {
        matches!(self.kind, BodyKind::Clump(_))
    }

    pub fn is_clump_member(&self) -> bool {
        matches!(self.kind, BodyKind::Member { .. })
    }

    /// Owning clump id for members.
    pub fn clump_id(&self) -> Option<BodyId> {
        match self.kind {
            BodyKind::Member { clump } => Some(clump),
            _ => None,
        }
    }

    pub fn clump_data(&self) -> Option<&ClumpData> {
        match &self.kind {
            BodyKind::Clump(data) => Some(data),
            _ => None,
        }
    }

    pub fn clump_data_mut(&mut self) -> Option<&mut ClumpData> {
        match &mut self.kind {
            BodyKind::Clump(data) => Some(data),
            _ => None,
        }
    }

    /// Whether the integrator visits this body at all.
    pub fn takes_part_in_step(&self) -> bool {
        self.dynamic || self.is_clump_member()
    }
}
