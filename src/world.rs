use glam::Vec3;
use log::debug;

use crate::{
    config::IntegratorConfig,
    core::{Body, BodyId, BodyRegistry, MassProperties, Transform},
    dynamics::{
        forces::{ForceAccumulator, ForceGenerator, ForceRegistry, GravityForce},
        integrator::{DampedNewtonIntegrator, StepContext, StepReport},
    },
    error::Result,
    utils::{
        logging::{warn_if_diverged, ScopedTimer},
        profiling::{PhaseTimer, StepProfile},
    },
};

/// Simulation container: bodies, per-step loads, generators, and the integrator.
pub struct DemWorld {
    pub bodies: BodyRegistry,
    pub force_registry: ForceRegistry,
    forces: ForceAccumulator,
    integrator: DampedNewtonIntegrator,
    context: StepContext,
    time_accumulated: f32,
    elapsed: f64,
    step_count: u64,
    profile: StepProfile,
}

impl DemWorld {
    /// Creates a world and registers gravity from `config`.
    pub fn new(config: IntegratorConfig) -> Result<Self> {
        let context = config.context()?;
        let mut integrator = DampedNewtonIntegrator::new();
        integrator.set_parallel(config.parallel);

        let mut force_registry = ForceRegistry::new();
        let gravity = Vec3::from_array(config.gravity);
        if gravity != Vec3::ZERO {
            force_registry.add_generator(GravityForce::new(gravity));
        }

        Ok(Self {
            bodies: BodyRegistry::new(),
            force_registry,
            forces: ForceAccumulator::new(),
            integrator,
            context,
            time_accumulated: 0.0,
            elapsed: 0.0,
            step_count: 0,
            profile: StepProfile::default(),
        })
    }

    pub fn add_body(&mut self, body: Body) -> Result<BodyId> {
        self.bodies.insert(body)
    }

    pub fn create_clump(&mut self, members: &[BodyId]) -> Result<BodyId> {
        self.bodies.create_clump(members)
    }

    pub fn create_clump_with(
        &mut self,
        members: &[BodyId],
        mass_properties: MassProperties,
        transform: Transform,
    ) -> Result<BodyId> {
        self.bodies
            .create_clump_with(members, mass_properties, transform)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn add_generator<F: ForceGenerator + 'static>(&mut self, generator: F) {
        self.force_registry.add_generator(generator);
    }

    /// Load container for contributions of the next tick (contacts, prescribed motion).
    pub fn forces(&self) -> &ForceAccumulator {
        &self.forces
    }

    pub fn context(&self) -> StepContext {
        self.context
    }

    pub fn set_damping(&mut self, damping: f32) -> Result<()> {
        self.context = StepContext::new(self.context.dt, damping)?;
        Ok(())
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.integrator.set_parallel(enabled);
    }

    pub fn parallel_enabled(&self) -> bool {
        self.integrator.parallel()
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn last_profile(&self) -> &StepProfile {
        &self.profile
    }

    /// Largest squared velocity observed in the last tick.
    pub fn max_velocity_sq(&self) -> f32 {
        self.integrator.max_velocity_sq()
    }

    /// Advances the simulation using a fixed timestep accumulator.
    ///
    /// Returns the report of the last tick taken, if any. A failed tick
    /// leaves its time in the accumulator.
    pub fn step(&mut self, dt: f32) -> Result<Option<StepReport>> {
        self.time_accumulated += dt;
        let mut last = None;

        while self.time_accumulated >= self.context.dt {
            last = Some(self.tick()?);
            self.time_accumulated -= self.context.dt;
        }
        Ok(last)
    }

    /// Runs exactly one integration tick of `context.dt`.
    ///
    /// Loads are cleared whether or not the tick succeeds.
    pub fn tick(&mut self) -> Result<StepReport> {
        let _timer = ScopedTimer::new("world::tick");
        self.profile.reset();
        self.profile.body_count = self.bodies.len();
        self.profile.clump_count = self.bodies.clump_count();
        self.profile.member_count = self.bodies.member_count();

        {
            let _phase = PhaseTimer::new(&mut self.profile.load_time);
            self.force_registry
                .apply_all(&self.bodies, &self.forces, self.context.dt);
        }

        self.integrator.reset_max_velocity_sq();
        let result = {
            let _phase = PhaseTimer::new(&mut self.profile.integration_time);
            self.integrator
                .step(&mut self.bodies, &mut self.forces, &self.context)
        };
        self.forces.reset();
        let report = result?;

        self.step_count += 1;
        self.elapsed += f64::from(self.context.dt);
        warn_if_diverged(self.step_count, report.max_velocity_sq);
        debug!(
            "tick {} done at t = {:.6}, max v^2 {:.6}",
            self.step_count, self.elapsed, report.max_velocity_sq
        );
        Ok(report)
    }
}
