//! Registration of attack and vulnerability volumes.

use std::sync::Arc;

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::collision::{BoundingSphere, CollisionRecord, VolumeSet};
use crate::error::{SimError, SimResult};
use crate::object::{Capabilities, ObjectState};
use crate::phase::Phase;

/// Registers the object's volumes with the collision registry every frame.
///
/// Volume sets are shared, immutable lists; swapping them (e.g. for an attack
/// animation) replaces the `Arc` and recomputes the bounding circle. Objects
/// with no hit reaction, or a frame with no registry installed, register
/// nothing.
#[derive(Debug, Clone)]
pub struct DynamicCollisionComponent {
    attack: VolumeSet,
    vulnerability: VolumeSet,
    bounds: BoundingSphere,
}

impl Default for DynamicCollisionComponent {
    fn default() -> Self {
        Self::new(Arc::from(Vec::new()), Arc::from(Vec::new()))
    }
}

impl DynamicCollisionComponent {
    /// Creates a component with the given volume sets.
    #[must_use]
    pub fn new(attack: VolumeSet, vulnerability: VolumeSet) -> Self {
        let bounds = BoundingSphere::enclosing(attack.iter().chain(vulnerability.iter()));
        Self {
            attack,
            vulnerability,
            bounds,
        }
    }

    /// Replaces both volume sets.
    pub fn set_volumes(&mut self, attack: VolumeSet, vulnerability: VolumeSet) {
        *self = Self::new(attack, vulnerability);
    }

    /// Volumes that deal hits.
    #[must_use]
    pub fn attack(&self) -> &VolumeSet {
        &self.attack
    }

    /// Volumes that receive hits.
    #[must_use]
    pub fn vulnerability(&self) -> &VolumeSet {
        &self.vulnerability
    }

    /// Local bounding circle of both sets.
    #[must_use]
    pub fn bounds(&self) -> BoundingSphere {
        self.bounds
    }
}

impl Behavior for DynamicCollisionComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "dynamic_collision",
            phase: Phase::CollisionDetection,
            requires: Capabilities::HIT_REACTION,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        if self.bounds.is_empty() || state.hit_reaction.is_none() {
            return Ok(());
        }
        let Some(registry) = ctx.systems.collisions.as_mut() else {
            return Ok(());
        };
        registry
            .register(CollisionRecord::new(
                ctx.handle,
                state.position,
                state.size,
                state.flip(),
                self.bounds,
                Arc::clone(&self.attack),
                Arc::clone(&self.vulnerability),
            ))
            .map_err(SimError::exhausted("collision registry"))
    }
}
