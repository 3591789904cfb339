//! Static world geometry for background collision.
//!
//! Background collision is a ray cast from an object's previous center to its
//! current one. [`SegmentWorld`] stores one-sided line segments: a segment only
//! blocks movement heading against its normal, so a platform can be jumped
//! through from below.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::EPSILON;

/// Where a ray met the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Intersection point.
    pub point: Vec2,
    /// Surface normal at the point.
    pub normal: Vec2,
}

/// Ray-castable level geometry.
pub trait WorldGeometry: Send {
    /// Casts from `from` to `to`. Surfaces facing along `direction` are
    /// ignored. Returns the hit closest to `from`.
    fn cast_ray(&self, from: Vec2, to: Vec2, direction: Vec2) -> Option<RayHit>;
}

/// A one-sided wall or floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
    /// Unit normal pointing out of the solid side.
    pub normal: Vec2,
}

/// Level geometry made of line segments.
#[derive(Debug, Clone, Default)]
pub struct SegmentWorld {
    segments: Vec<Segment>,
}

impl SegmentWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment. `normal` is normalized.
    pub fn add_segment(&mut self, start: Vec2, end: Vec2, normal: Vec2) {
        self.segments.push(Segment {
            start,
            end,
            normal: normal.normalize_or_zero(),
        });
    }

    /// Adds the four outward-facing edges of a solid box.
    pub fn add_box(&mut self, min: Vec2, max: Vec2) {
        let top_left = Vec2::new(min.x, max.y);
        let bottom_right = Vec2::new(max.x, min.y);
        self.add_segment(top_left, max, Vec2::Y);
        self.add_segment(min, bottom_right, Vec2::NEG_Y);
        self.add_segment(min, top_left, Vec2::NEG_X);
        self.add_segment(bottom_right, max, Vec2::X);
    }

    /// Adds a floor that can be passed from below.
    pub fn add_platform(&mut self, left: Vec2, width: f32) {
        self.add_segment(left, left + Vec2::new(width, 0.0), Vec2::Y);
    }

    /// Stored segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl WorldGeometry for SegmentWorld {
    fn cast_ray(&self, from: Vec2, to: Vec2, direction: Vec2) -> Option<RayHit> {
        let ray = to - from;
        let heading = if direction == Vec2::ZERO { ray } else { direction };

        let mut best: Option<(f32, RayHit)> = None;
        for segment in &self.segments {
            if heading.dot(segment.normal) >= 0.0 {
                continue;
            }
            let span = segment.end - segment.start;
            let denominator = ray.perp_dot(span);
            if denominator.abs() < EPSILON {
                continue;
            }
            let offset = segment.start - from;
            let t = offset.perp_dot(span) / denominator;
            let u = offset.perp_dot(ray) / denominator;
            if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
                continue;
            }
            if best.map_or(true, |(closest, _)| t < closest) {
                best = Some((
                    t,
                    RayHit {
                        point: from + ray * t,
                        normal: segment.normal,
                    },
                ));
            }
        }
        best.map(|(_, hit)| hit)
    }
}
