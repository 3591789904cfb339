//! Collision and combat.
//!
//! Two independent mechanisms:
//!
//! - **Background collision**: objects ray-cast against static
//!   [`WorldGeometry`] and snap out of walls and floors.
//! - **Dynamic collision**: objects register attack and vulnerability volumes
//!   in a [`CollisionRegistry`], which resolves overlaps into hits and hands
//!   them to a [`HitArbiter`].

pub mod geometry;
pub mod registry;
pub mod volume;

pub use geometry::{RayHit, Segment, SegmentWorld, WorldGeometry};
pub use registry::{CollisionRecord, CollisionRegistry, HitArbiter, HitRecord};
pub use volume::{BoundingSphere, CollisionVolume, Flip, HitType, Shape, VolumeSet};
