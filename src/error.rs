//! Error types for body construction, clump linkage, and stepping.

use thiserror::Error;

use crate::core::body::BodyId;

/// Errors raised by the registry, the clump builder, and the integrator.
///
/// Linkage errors discovered while stepping are fatal for that step: the
/// integrator returns before mutating any body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegratorError {
    /// Timestep must be finite and strictly positive.
    #[error("invalid timestep: {0}")]
    InvalidTimeStep(f32),

    /// Damping must lie in `[0, 1)`.
    #[error("invalid damping coefficient {0}, expected a value in [0, 1)")]
    InvalidDamping(f32),

    /// The id does not refer to a live body.
    #[error("unknown body {0}")]
    UnknownBody(BodyId),

    /// The id refers to a body that is not a clump.
    #[error("body {0} is not a clump")]
    NotAClump(BodyId),

    /// A member points at a clump that does not own it, or at a clump with
    /// an id not strictly greater than its own.
    #[error("broken clump link: member {member} -> clump {clump}")]
    BrokenClumpLink {
        /// The member whose back-reference is invalid.
        member: BodyId,
        /// The clump it refers to.
        clump: BodyId,
    },

    /// Dynamic bodies need positive, finite mass and inertia.
    #[error("degenerate mass properties on {body:?}: mass {mass}, inertia {inertia:?}")]
    DegenerateMass {
        /// Offending body, when already registered.
        body: Option<BodyId>,
        /// Mass value.
        mass: f32,
        /// Diagonal inertia.
        inertia: [f32; 3],
    },

    /// A clump needs at least one member.
    #[error("cannot build a clump without members")]
    EmptyClump,

    /// Only standalone bodies can join a clump.
    #[error("body {0} is already part of a clump or is a clump itself")]
    AlreadyClumped(BodyId),

    /// The same body was listed twice for one clump.
    #[error("body {0} listed twice in clump definition")]
    DuplicateMember(BodyId),
}

/// Convenient Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IntegratorError>;
