//! Simulation dynamics: load accumulation, Cundall damping, integration,
//! and clump motion propagation.

pub mod clump_motion;
pub mod damping;
pub mod forces;
pub mod integrator;

pub use clump_motion::ClumpMotionPropagator;
pub use damping::CundallDamper;
pub use forces::{
    ConstantForce, ForceAccumulator, ForceGenerator, ForceRegistry, ForceTorqueSource,
    GravityForce,
};
pub use integrator::{DampedNewtonIntegrator, StepContext, StepReport};
