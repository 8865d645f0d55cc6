use glam::Vec3;
use log::trace;

use crate::core::{BodyId, BodyRegistry, ClumpMember};
use crate::error::{IntegratorError, Result};

/// Fans a clump's rigid motion out to its members.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClumpMotionPropagator;

impl ClumpMotionPropagator {
    /// Places every member of `clump_id` from the clump's current pose and
    /// velocity, then consumes the clump's accumulator.
    ///
    /// Returns the consumed `(linear, angular)` acceleration totals.
    pub fn propagate(registry: &mut BodyRegistry, clump_id: BodyId) -> Result<(Vec3, Vec3)> {
        let clump = registry
            .get(clump_id)
            .ok_or(IntegratorError::UnknownBody(clump_id))?;
        let data = clump
            .clump_data()
            .ok_or(IntegratorError::NotAClump(clump_id))?;
        let pose = clump.state.transform;
        let velocity = clump.state.velocity;
        let members: Vec<ClumpMember> = data.members.clone();

        for member in &members {
            let body = registry
                .get_mut(member.id)
                .filter(|body| body.clump_id() == Some(clump_id))
                .ok_or(IntegratorError::BrokenClumpLink {
                    member: member.id,
                    clump: clump_id,
                })?;
            let placed = pose.combine(&member.local);
            body.state.transform = placed;
            body.state.velocity.linear =
                velocity.linear + velocity.angular.cross(placed.position - pose.position);
            body.state.velocity.angular = velocity.angular;
        }

        let data = registry
            .get_mut(clump_id)
            .and_then(|clump| clump.clump_data_mut())
            .ok_or(IntegratorError::NotAClump(clump_id))?;
        let consumed = data.accumulator.consume_and_reset();
        trace!(
            "clump {clump_id}: moved {} members, consumed accel {:?} / {:?}",
            members.len(),
            consumed.0,
            consumed.1
        );
        Ok(consumed)
    }
}
