//! DEM Kinematics – damped rigid-body integration for discrete-element simulations.
//!
//! This crate advances standalone bodies and rigid clumps by one timestep
//! from accumulated forces and torques, applying Cundall's direction-sensitive
//! damping to drive assemblies toward quasi-static equilibrium.

pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::{Mat3, Quat, Vec3};

pub use config::IntegratorConfig;
pub use crate::core::{
    body::{Body, BodyId, BodyKind, BodyState},
    clump::{ClumpAccumulator, ClumpData, ClumpMember},
    dof::BlockedDofs,
    registry::BodyRegistry,
    types::{MassProperties, Transform, Velocity},
};
pub use dynamics::{
    clump_motion::ClumpMotionPropagator,
    damping::CundallDamper,
    forces::{
        ConstantForce, ForceAccumulator, ForceGenerator, ForceRegistry, ForceTorqueSource,
        GravityForce,
    },
    integrator::{DampedNewtonIntegrator, StepContext, StepReport},
};
pub use error::{IntegratorError, Result};
pub use world::DemWorld;
