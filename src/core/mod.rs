//! Core types describing bodies, clumps, and the registry that owns them.

pub mod body;
pub mod clump;
pub mod dof;
pub mod registry;
pub mod types;

pub use body::{Body, BodyId, BodyKind, BodyState};
pub use clump::{ClumpAccumulator, ClumpData, ClumpMember, ClumpProperties};
pub use dof::BlockedDofs;
pub use registry::BodyRegistry;
pub use types::{MassProperties, Transform, Velocity};
