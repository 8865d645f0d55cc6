use std::collections::HashMap;

use glam::Vec3;
use parking_lot::Mutex;

use crate::core::{Body, BodyId, BodyRegistry};

/// Read side of the per-step load container consumed by the integrator.
///
/// `sync` must run before any read; values stay fixed until the next sync.
pub trait ForceTorqueSource: Send + Sync {
    /// Finalizes every pending contribution for the current step.
    fn sync(&mut self);

    fn force(&self, id: BodyId) -> Vec3;

    fn torque(&self, id: BodyId) -> Vec3;

    /// Prescribed displacement added to the position after integration.
    fn displacement(&self, id: BodyId) -> Vec3;

    /// Prescribed rotation vector (axis times angle).
    fn rotation(&self, id: BodyId) -> Vec3;

    /// Whether prescribed rotations should be honored this step.
    fn move_rot_used(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct LoadRecord {
    force: Vec3,
    torque: Vec3,
    displacement: Vec3,
    rotation: Vec3,
}

#[derive(Debug, Clone, Copy)]
enum Contribution {
    Force(BodyId, Vec3),
    Torque(BodyId, Vec3),
    Move(BodyId, Vec3),
    Rot(BodyId, Vec3),
}

/// Thread-safe force/torque accumulator.
///
/// Contributions may be added concurrently through `&self`; they become
/// visible to readers only after [`ForceTorqueSource::sync`]. Records are
/// keyed by id, so loads on unknown ids cost one entry each.
#[derive(Debug, Default)]
pub struct ForceAccumulator {
    records: HashMap<BodyId, LoadRecord>,
    pending: Mutex<Vec<Contribution>>,
    move_rot_used: bool,
}

impl ForceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_force(&self, id: BodyId, force: Vec3) {
        self.pending.lock().push(Contribution::Force(id, force));
    }

    pub fn add_torque(&self, id: BodyId, torque: Vec3) {
        self.pending.lock().push(Contribution::Torque(id, torque));
    }

    /// Adds `force` acting at `point`, together with its moment about `centroid`.
    pub fn add_force_at_point(&self, id: BodyId, force: Vec3, point: Vec3, centroid: Vec3) {
        let mut pending = self.pending.lock();
        pending.push(Contribution::Force(id, force));
        pending.push(Contribution::Torque(id, (point - centroid).cross(force)));
    }

    pub fn add_move(&self, id: BodyId, displacement: Vec3) {
        self.pending.lock().push(Contribution::Move(id, displacement));
    }

    pub fn add_rot(&self, id: BodyId, rotation: Vec3) {
        self.pending.lock().push(Contribution::Rot(id, rotation));
    }

    /// Number of contributions waiting for the next sync.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Drops every record so the next step starts from zero loads.
    pub fn reset(&mut self) {
        self.records.clear();
        self.pending.get_mut().clear();
        self.move_rot_used = false;
    }

    fn record(&self, id: BodyId) -> LoadRecord {
        self.records.get(&id).copied().unwrap_or_default()
    }

    fn record_mut(&mut self, id: BodyId) -> &mut LoadRecord {
        self.records.entry(id).or_default()
    }
}

impl ForceTorqueSource for ForceAccumulator {
    fn sync(&mut self) {
        let pending = std::mem::take(self.pending.get_mut());
        for contribution in pending {
            match contribution {
                Contribution::Force(id, force) => self.record_mut(id).force += force,
                Contribution::Torque(id, torque) => self.record_mut(id).torque += torque,
                Contribution::Move(id, displacement) => {
                    self.record_mut(id).displacement += displacement
                }
                Contribution::Rot(id, rotation) => {
                    self.move_rot_used = true;
                    self.record_mut(id).rotation += rotation;
                }
            }
        }
    }

    fn force(&self, id: BodyId) -> Vec3 {
        self.record(id).force
    }

    fn torque(&self, id: BodyId) -> Vec3 {
        self.record(id).torque
    }

    fn displacement(&self, id: BodyId) -> Vec3 {
        self.record(id).displacement
    }

    fn rotation(&self, id: BodyId) -> Vec3 {
        self.record(id).rotation
    }

    fn move_rot_used(&self) -> bool {
        self.move_rot_used
    }
}

/// Trait describing an external load applied to bodies each step.
pub trait ForceGenerator: Send + Sync {
    fn apply(&self, body: &Body, forces: &ForceAccumulator, dt: f32);
}

/// Gravity acting on every massive body.
///
/// Clumps are skipped: their members carry the mass and the member loads
/// are folded into the clump by the integrator.
pub struct GravityForce {
    pub gravity: Vec3,
}

impl GravityForce {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

impl ForceGenerator for GravityForce {
    fn apply(&self, body: &Body, forces: &ForceAccumulator, _dt: f32) {
        if body.is_clump() || !body.takes_part_in_step() {
            return;
        }
        forces.add_force(body.id, self.gravity * body.state.mass_properties.mass);
    }
}

/// Constant force on a fixed set of bodies.
pub struct ConstantForce {
    pub bodies: Vec<BodyId>,
    pub force: Vec3,
}

impl ForceGenerator for ConstantForce {
    fn apply(&self, body: &Body, forces: &ForceAccumulator, _dt: f32) {
        if self.bodies.contains(&body.id) {
            forces.add_force(body.id, self.force);
        }
    }
}

/// Collection of generators that are applied every step.
pub struct ForceRegistry {
    generators: Vec<Box<dyn ForceGenerator>>,
}

impl Default for ForceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    pub fn add_generator<F: ForceGenerator + 'static>(&mut self, generator: F) {
        self.generators.push(Box::new(generator));
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn apply_all(&self, bodies: &BodyRegistry, forces: &ForceAccumulator, dt: f32) {
        for generator in &self.generators {
            for body in bodies.iter() {
                generator.apply(body, forces, dt);
            }
        }
    }
}
