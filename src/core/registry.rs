use std::collections::HashSet;

use log::debug;

use super::body::{Body, BodyId, BodyKind, BodyState};
use super::clump::{ClumpData, ClumpMember, ClumpProperties};
use super::types::{MassProperties, Transform};
use crate::error::{IntegratorError, Result};

/// Owner of every body in the simulation.
///
/// Ids double as slot indices. Slots of removed bodies stay empty so ids are
/// never reused, which keeps "clump id > member id" true for any clump
/// created after its members.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    items: Vec<Option<Body>>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `body` under the next free id.
    ///
    /// Dynamic bodies must carry valid mass properties. Clumps are created
    /// through [`BodyRegistry::create_clump`], not inserted directly.
    pub fn insert(&mut self, mut body: Body) -> Result<BodyId> {
        if body.dynamic {
            body.state
                .mass_properties
                .validate()
                .map_err(|err| with_body(err, None))?;
        }
        let id = self.next_id();
        body.id = id;
        self.items.push(Some(body));
        Ok(id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.items.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.items.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    pub fn get2_mut(&mut self, id_a: BodyId, id_b: BodyId) -> Option<(&mut Body, &mut Body)> {
        if id_a == id_b {
            return None;
        }

        let (first, second, flipped) = if id_a < id_b {
            (id_a, id_b, false)
        } else {
            (id_b, id_a, true)
        };

        if second.index() >= self.items.len() {
            return None;
        }

        let (left, right) = self.items.split_at_mut(second.index());
        let first_slot = left.get_mut(first.index()).and_then(|slot| slot.as_mut())?;
        let second_slot = right.get_mut(0).and_then(|slot| slot.as_mut())?;

        if flipped {
            Some((second_slot, first_slot))
        } else {
            Some((first_slot, second_slot))
        }
    }

    /// Removes a body. Members of a removed clump become dynamic standalone
    /// bodies again; a removed member is dropped from its clump's list.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let body = self.items.get_mut(id.index())?.take()?;
        match &body.kind {
            BodyKind::Clump(data) => {
                for member in data.member_ids() {
                    if let Some(released) = self.get_mut(member) {
                        released.kind = BodyKind::Standalone;
                        released.dynamic = true;
                    }
                }
            }
            BodyKind::Member { clump } => {
                if let Some(data) = self.get_mut(*clump).and_then(Body::clump_data_mut) {
                    data.members.retain(|member| member.id != id);
                }
            }
            BodyKind::Standalone => {}
        }
        Some(body)
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.iter().map(|body| body.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> + '_ {
        self.items.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> + '_ {
        self.items.iter_mut().filter_map(|slot| slot.as_mut())
    }

    /// Raw slots, indexed by id. Used by the parallel integration path.
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Body>] {
        &mut self.items
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn slots(&self) -> &[Option<Body>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clump_count(&self) -> usize {
        self.iter().filter(|body| body.is_clump()).count()
    }

    pub fn member_count(&self) -> usize {
        self.iter().filter(|body| body.is_clump_member()).count()
    }

    /// Builds a clump from standalone bodies, deriving its mass, principal
    /// inertia, centroid, orientation, and velocity from the members.
    pub fn create_clump(&mut self, members: &[BodyId]) -> Result<BodyId> {
        let states = self.collect_candidates(members)?;
        let refs: Vec<&BodyState> = states.iter().collect();
        let properties = ClumpProperties::from_members(&refs);
        self.attach_clump(members, properties)
    }

    /// Builds a clump with caller-supplied mass properties and pose.
    pub fn create_clump_with(
        &mut self,
        members: &[BodyId],
        mass_properties: MassProperties,
        transform: Transform,
    ) -> Result<BodyId> {
        mass_properties
            .validate()
            .map_err(|err| with_body(err, None))?;
        let states = self.collect_candidates(members)?;
        let refs: Vec<&BodyState> = states.iter().collect();
        let derived = ClumpProperties::from_members(&refs);
        self.attach_clump(
            members,
            ClumpProperties {
                mass_properties,
                transform,
                velocity: derived.velocity,
            },
        )
    }

    /// Checks every clump/member link in both directions.
    pub fn validate_clumps(&self) -> Result<()> {
        for body in self.iter() {
            match &body.kind {
                BodyKind::Member { clump } => {
                    self.owning_clump(body.id, *clump)?;
                }
                BodyKind::Clump(data) => {
                    for member in data.member_ids() {
                        let linked = self
                            .get(member)
                            .and_then(Body::clump_id)
                            .is_some_and(|clump| clump == body.id);
                        if !linked || member >= body.id {
                            return Err(IntegratorError::BrokenClumpLink {
                                member,
                                clump: body.id,
                            });
                        }
                    }
                }
                BodyKind::Standalone => {}
            }
        }
        Ok(())
    }

    /// Resolves the clump that owns `member`, enforcing the id ordering and
    /// the back-reference.
    pub fn owning_clump(&self, member: BodyId, clump: BodyId) -> Result<&Body> {
        let broken = IntegratorError::BrokenClumpLink { member, clump };
        if clump <= member {
            return Err(broken);
        }
        let body = self.get(clump).ok_or(broken.clone())?;
        match body.clump_data() {
            Some(data) if data.contains(member) => Ok(body),
            Some(_) => Err(broken),
            None => Err(IntegratorError::NotAClump(clump)),
        }
    }

    fn next_id(&self) -> BodyId {
        BodyId(self.items.len() as u32)
    }

    fn collect_candidates(&self, members: &[BodyId]) -> Result<Vec<BodyState>> {
        if members.is_empty() {
            return Err(IntegratorError::EmptyClump);
        }
        let mut seen = HashSet::with_capacity(members.len());
        let mut states = Vec::with_capacity(members.len());
        for &id in members {
            if !seen.insert(id) {
                return Err(IntegratorError::DuplicateMember(id));
            }
            let body = self.get(id).ok_or(IntegratorError::UnknownBody(id))?;
            if !body.is_standalone() {
                return Err(IntegratorError::AlreadyClumped(id));
            }
            body.state
                .mass_properties
                .validate()
                .map_err(|err| with_body(err, Some(id)))?;
            states.push(body.state);
        }
        Ok(states)
    }

    fn attach_clump(&mut self, members: &[BodyId], properties: ClumpProperties) -> Result<BodyId> {
        let clump_id = self.next_id();
        let mut data = ClumpData::default();

        for &id in members {
            let body = self.get_mut(id).ok_or(IntegratorError::UnknownBody(id))?;
            data.members.push(ClumpMember {
                id,
                local: properties.transform.relative(&body.state.transform),
            });
            body.kind = BodyKind::Member { clump: clump_id };
            body.dynamic = false;
        }

        debug!(
            "clump {clump_id} created from {} members, mass {:.4}",
            data.members.len(),
            properties.mass_properties.mass
        );

        let mut clump = Body::new(properties.transform.position, properties.mass_properties)
            .with_transform(properties.transform)
            .with_velocity(properties.velocity.linear, properties.velocity.angular);
        clump.id = clump_id;
        clump.kind = BodyKind::Clump(data);
        self.items.push(Some(clump));
        Ok(clump_id)
    }
}

fn with_body(err: IntegratorError, id: Option<BodyId>) -> IntegratorError {
    match err {
        IntegratorError::DegenerateMass { mass, inertia, .. } => IntegratorError::DegenerateMass {
            body: id,
            mass,
            inertia,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sphere(position: Vec3) -> Body {
        Body::new(position, MassProperties::new(1.0, Vec3::splat(0.4)))
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut registry = BodyRegistry::new();
        let a = registry.insert(sphere(Vec3::ZERO)).unwrap();
        let b = registry.insert(sphere(Vec3::X)).unwrap();
        assert_eq!((a, b), (BodyId(0), BodyId(1)));

        registry.remove(a).unwrap();
        let c = registry.insert(sphere(Vec3::Y)).unwrap();
        assert_eq!(c, BodyId(2));
        assert!(registry.get(a).is_none());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn insert_rejects_degenerate_dynamic_body() {
        let mut registry = BodyRegistry::new();
        let bad = Body::new(Vec3::ZERO, MassProperties::new(0.0, Vec3::ONE));
        assert!(matches!(
            registry.insert(bad),
            Err(IntegratorError::DegenerateMass { mass, .. }) if mass == 0.0
        ));

        let mut fixed = Body::fixed(Vec3::ZERO);
        fixed.state.mass_properties.mass = 0.0;
        assert!(registry.insert(fixed).is_ok());
    }

    #[test]
    fn create_clump_links_members() {
        let mut registry = BodyRegistry::new();
        let a = registry.insert(sphere(Vec3::new(-1.0, 0.0, 0.0))).unwrap();
        let b = registry.insert(sphere(Vec3::new(1.0, 0.0, 0.0))).unwrap();
        let clump = registry.create_clump(&[a, b]).unwrap();

        assert!(clump > b);
        assert!(registry.validate_clumps().is_ok());

        let member = registry.get(a).unwrap();
        assert_eq!(member.clump_id(), Some(clump));
        assert!(!member.dynamic);

        let clump_body = registry.get(clump).unwrap();
        assert!(clump_body.dynamic);
        assert_eq!(clump_body.clump_data().unwrap().members.len(), 2);
        assert!((clump_body.state.mass_properties.mass - 2.0).abs() < 1e-6);
    }

    #[test]
    fn create_clump_rejects_bad_member_lists() {
        let mut registry = BodyRegistry::new();
        let a = registry.insert(sphere(Vec3::ZERO)).unwrap();
        let b = registry.insert(sphere(Vec3::X)).unwrap();

        assert_eq!(registry.create_clump(&[]), Err(IntegratorError::EmptyClump));
        assert_eq!(
            registry.create_clump(&[a, a]),
            Err(IntegratorError::DuplicateMember(a))
        );
        assert_eq!(
            registry.create_clump(&[a, BodyId(42)]),
            Err(IntegratorError::UnknownBody(BodyId(42)))
        );

        let clump = registry.create_clump(&[a, b]).unwrap();
        let c = registry.insert(sphere(Vec3::Y)).unwrap();
        assert_eq!(
            registry.create_clump(&[c, clump]),
            Err(IntegratorError::AlreadyClumped(clump))
        );
        assert_eq!(
            registry.create_clump(&[a, c]),
            Err(IntegratorError::AlreadyClumped(a))
        );
    }

    #[test]
    fn validate_detects_broken_links() {
        let mut registry = BodyRegistry::new();
        let a = registry.insert(sphere(Vec3::ZERO)).unwrap();
        let b = registry.insert(sphere(Vec3::X)).unwrap();
        let clump = registry.create_clump(&[a, b]).unwrap();

        registry.get_mut(b).unwrap().kind = BodyKind::Member { clump: a };
        assert_eq!(
            registry.validate_clumps(),
            Err(IntegratorError::BrokenClumpLink { member: b, clump: a })
        );

        let stray = registry.insert(sphere(Vec3::Z)).unwrap();
        registry.get_mut(b).unwrap().kind = BodyKind::Member { clump: stray };
        assert_eq!(
            registry.validate_clumps(),
            Err(IntegratorError::NotAClump(stray))
        );

        registry.get_mut(b).unwrap().kind = BodyKind::Member { clump };
        assert!(registry.validate_clumps().is_ok());
    }

    #[test]
    fn removing_clump_releases_members() {
        let mut registry = BodyRegistry::new();
        let a = registry.insert(sphere(Vec3::ZERO)).unwrap();
        let b = registry.insert(sphere(Vec3::X)).unwrap();
        let clump = registry.create_clump(&[a, b]).unwrap();

        registry.remove(a).unwrap();
        assert_eq!(registry.get(clump).unwrap().clump_data().unwrap().members.len(), 1);

        registry.remove(clump).unwrap();
        let released = registry.get(b).unwrap();
        assert!(released.is_standalone());
        assert!(released.dynamic);
    }

    #[test]
    fn get2_mut_returns_requested_order() {
        let mut registry = BodyRegistry::new();
        let a = registry.insert(sphere(Vec3::ZERO)).unwrap();
        let b = registry.insert(sphere(Vec3::X)).unwrap();

        let (first, second) = registry.get2_mut(b, a).unwrap();
        assert_eq!((first.id, second.id), (b, a));
        assert!(registry.get2_mut(a, a).is_none());
    }
}
