use glam::Vec3;
use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::clump_motion::ClumpMotionPropagator;
use super::damping::CundallDamper;
use super::forces::ForceTorqueSource;
use crate::core::{Body, BodyId, BodyKind, BodyRegistry, BodyState};
use crate::error::{IntegratorError, Result};
use crate::utils::math::{diag_div, rotation_vector_to_quat};

/// Per-step scalars supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    pub dt: f32,
    pub damping: f32,
}

impl StepContext {
    pub fn new(dt: f32, damping: f32) -> Result<Self> {
        let ctx = Self { dt, damping };
        ctx.validate()?;
        Ok(ctx)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(IntegratorError::InvalidTimeStep(self.dt));
        }
        CundallDamper::new(self.damping).map(|_| ())
    }
}

/// Summary of one integration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Largest squared linear velocity seen during this pass.
    pub max_velocity_sq: f32,
    /// Standalone and clump bodies advanced in time.
    pub integrated_bodies: usize,
    /// Clump members whose loads were folded into their clump.
    pub member_contributions: usize,
    /// Clumps whose members were repositioned.
    pub propagated_clumps: usize,
}

#[derive(Debug, Clone, Copy)]
struct MemberContribution {
    clump: BodyId,
    linear: Vec3,
    angular: Vec3,
    velocity_sq: f32,
}

/// Damped Newton-Euler integrator for standalone bodies and clumps.
///
/// A step runs in three phases:
/// 1. every clump member's load is turned into a damped acceleration
///    increment on its clump (read-only, so linkage errors abort the step
///    before anything is mutated), and the increments are added to the
///    clump accumulators;
/// 2. standalone and dynamic clump bodies are integrated;
/// 3. every clump hands its new pose to its members and resets its
///    accumulator.
#[derive(Debug, Clone, Default)]
pub struct DampedNewtonIntegrator {
    parallel: bool,
    max_velocity_sq: f32,
}

impl DampedNewtonIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables rayon for phases 1 and 2. Ignored without the `parallel` feature.
    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    pub fn parallel(&self) -> bool {
        self.parallel && cfg!(feature = "parallel")
    }

    /// Largest squared velocity since the last reset.
    pub fn max_velocity_sq(&self) -> f32 {
        self.max_velocity_sq
    }

    pub fn reset_max_velocity_sq(&mut self) {
        self.max_velocity_sq = 0.0;
    }

    /// Advances every dynamic body and clump by `ctx.dt`.
    pub fn step<S: ForceTorqueSource>(
        &mut self,
        bodies: &mut BodyRegistry,
        forces: &mut S,
        ctx: &StepContext,
    ) -> Result<StepReport> {
        ctx.validate()?;
        let damper = CundallDamper::new(ctx.damping)?;
        let dt = ctx.dt;

        forces.sync();
        let forces: &S = forces;

        bodies.validate_clumps()?;
        let contributions = self.member_contributions(bodies, forces, &damper, dt)?;

        let mut report = StepReport {
            member_contributions: contributions.len(),
            ..StepReport::default()
        };
        for contribution in &contributions {
            let data = bodies
                .get_mut(contribution.clump)
                .and_then(Body::clump_data_mut)
                .ok_or(IntegratorError::NotAClump(contribution.clump))?;
            data.accumulator
                .accumulate(contribution.linear, contribution.angular);
            report.max_velocity_sq =
                max_propagating(report.max_velocity_sq, contribution.velocity_sq);
        }

        let (integrated, max_velocity_sq) = self.integrate_bodies(bodies, forces, &damper, dt);
        report.integrated_bodies = integrated;
        report.max_velocity_sq = max_propagating(report.max_velocity_sq, max_velocity_sq);

        let clumps: Vec<BodyId> = bodies
            .iter()
            .filter(|body| body.is_clump())
            .map(|body| body.id)
            .collect();
        for clump in &clumps {
            ClumpMotionPropagator::propagate(bodies, *clump)?;
        }
        report.propagated_clumps = clumps.len();

        self.max_velocity_sq = max_propagating(self.max_velocity_sq, report.max_velocity_sq);
        debug!(
            "integrated {} bodies, {} member loads, {} clumps, max v^2 {:.6}",
            report.integrated_bodies,
            report.member_contributions,
            report.propagated_clumps,
            report.max_velocity_sq
        );
        Ok(report)
    }

    fn member_contributions<S: ForceTorqueSource>(
        &self,
        bodies: &BodyRegistry,
        forces: &S,
        damper: &CundallDamper,
        dt: f32,
    ) -> Result<Vec<MemberContribution>> {
        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                return bodies
                    .slots()
                    .par_iter()
                    .filter_map(|slot| slot.as_ref())
                    .filter_map(|body| body.clump_id().map(|clump| (body, clump)))
                    .map(|(member, clump)| {
                        member_contribution(bodies, member, clump, forces, damper, dt)
                    })
                    .collect();
            }
        }

        bodies
            .iter()
            .filter_map(|body| body.clump_id().map(|clump| (body, clump)))
            .map(|(member, clump)| member_contribution(bodies, member, clump, forces, damper, dt))
            .collect()
    }

    fn integrate_bodies<S: ForceTorqueSource>(
        &self,
        bodies: &mut BodyRegistry,
        forces: &S,
        damper: &CundallDamper,
        dt: f32,
    ) -> (usize, f32) {
        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                return bodies
                    .slots_mut()
                    .par_iter_mut()
                    .filter_map(|slot| slot.as_mut())
                    .filter_map(|body| integrate_body(body, forces, damper, dt))
                    .fold(
                        || (0usize, 0.0f32),
                        |(n, max), v| (n + 1, max_propagating(max, v)),
                    )
                    .reduce(|| (0, 0.0), |a, b| (a.0 + b.0, max_propagating(a.1, b.1)));
            }
        }

        bodies
            .iter_mut()
            .filter_map(|body| integrate_body(body, forces, damper, dt))
            .fold((0, 0.0), |(n, max), v| (n + 1, max_propagating(max, v)))
    }
}

/// Damped acceleration increment a member contributes to its clump.
fn member_contribution<S: ForceTorqueSource>(
    bodies: &BodyRegistry,
    member: &Body,
    clump: BodyId,
    forces: &S,
    damper: &CundallDamper,
    dt: f32,
) -> Result<MemberContribution> {
    let owner = &bodies.owning_clump(member.id, clump)?.state;
    let force = forces.force(member.id);
    let torque = forces.torque(member.id);
    let inertia = owner.mass_properties.inertia;

    let linear = force / owner.mass_properties.mass;
    let arm = member.state.transform.position - owner.transform.position;
    let angular = diag_div(torque, inertia) + diag_div(arm.cross(force), inertia);

    // Direction of travel is judged from the member's own velocity.
    let velocity = member.state.velocity;
    let (linear, angular) = damper.damp(
        dt,
        force,
        velocity.linear,
        linear,
        torque,
        velocity.angular,
        angular,
    );

    Ok(MemberContribution {
        clump,
        linear,
        angular,
        velocity_sq: velocity.linear.length_squared(),
    })
}

/// Integrates one standalone or clump body; returns its pre-step squared
/// speed, or `None` if the body is not integrated.
fn integrate_body<S: ForceTorqueSource>(
    body: &mut Body,
    forces: &S,
    damper: &CundallDamper,
    dt: f32,
) -> Option<f32> {
    if !body.dynamic {
        return None;
    }
    let id = body.id;
    let force = forces.force(id);
    let torque = forces.torque(id);
    let state = &mut body.state;
    let mass = state.mass_properties.mass;
    let inertia = state.mass_properties.inertia;

    match &mut body.kind {
        BodyKind::Standalone => {
            let (linear, angular) = damper.damp(
                dt,
                force,
                state.velocity.linear,
                force / mass,
                torque,
                state.velocity.angular,
                diag_div(torque, inertia),
            );
            state.acceleration = linear;
            state.angular_acceleration = angular;
        }
        BodyKind::Clump(data) => {
            // Member increments are already damped; loads on the clump itself are not.
            data.accumulator
                .accumulate(force / mass, diag_div(torque, inertia));
            let (linear, angular) = data.accumulator.totals();
            state.acceleration = linear;
            state.angular_acceleration = angular;
        }
        BodyKind::Member { .. } => return None,
    }

    let velocity_sq = state.velocity.linear.length_squared();
    integrate_velocity(state, dt);
    integrate_orientation(state, forces, id, dt);
    state.transform.position += state.velocity.linear * dt + forces.displacement(id);
    Some(velocity_sq)
}

fn integrate_velocity(state: &mut BodyState, dt: f32) {
    let blocked = state.blocked_dofs;
    if blocked.is_empty() {
        state.velocity.linear += state.acceleration * dt;
        state.velocity.angular += state.angular_acceleration * dt;
        return;
    }
    for axis in 0..3 {
        if !blocked.linear_blocked(axis) {
            state.velocity.linear[axis] += dt * state.acceleration[axis];
        }
        if !blocked.angular_blocked(axis) {
            state.velocity.angular[axis] += dt * state.angular_acceleration[axis];
        }
    }
}

fn integrate_orientation<S: ForceTorqueSource>(
    state: &mut BodyState,
    forces: &S,
    id: BodyId,
    dt: f32,
) {
    let mut rotation =
        rotation_vector_to_quat(state.velocity.angular, dt) * state.transform.rotation;
    if forces.move_rot_used() {
        let prescribed = forces.rotation(id);
        if prescribed != Vec3::ZERO {
            rotation = rotation_vector_to_quat(prescribed, 1.0) * rotation;
        }
    }
    state.transform.rotation = rotation.normalize();
}

fn max_propagating(current: f32, candidate: f32) -> f32 {
    if current.is_nan() || candidate.is_nan() {
        f32::NAN
    } else {
        current.max(candidate)
    }
}
