//! Collision volumes, flipping and intersection tests.
//!
//! Volumes are authored in an object's local space, where `(0, 0)` is the
//! object's bottom-left corner and `(width, height)` its top-right. They are
//! mirrored inside that box before being moved to world space, so a volume at
//! the front of a right-facing sprite stays at the front after it turns.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What a volume does when it overlaps another.
///
/// An attack volume carries the hit it deals. A vulnerability volume either
/// accepts every hit ([`HitType::Invalid`]) or only the matching one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitType {
    /// No hit. As a vulnerability: accepts any hit type.
    #[default]
    Invalid,
    /// One point of damage.
    Hit,
    /// Instant kill.
    Death,
    /// Picks up the victim.
    Collect,
    /// Takes control of the victim.
    Possess,
    /// Presses the victim (buttons, switches).
    Depress,
    /// Throws the victim with the attacker's launch impulse.
    Launch,
}

impl HitType {
    /// Returns `true` for hits that hurt and respect invulnerability.
    #[must_use]
    pub fn is_harmful(self) -> bool {
        matches!(self, Self::Hit | Self::Death)
    }
}

/// Mirroring applied to an object's volumes and sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flip {
    /// Mirror around the vertical axis of the object box.
    pub horizontal: bool,
    /// Mirror around the horizontal axis of the object box.
    pub vertical: bool,
}

/// Geometric shape of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A circle.
    Sphere {
        /// Center.
        center: Vec2,
        /// Radius.
        radius: f32,
    },
    /// An axis-aligned box.
    AaBox {
        /// Bottom-left corner.
        min: Vec2,
        /// Top-right corner.
        max: Vec2,
    },
}

impl Shape {
    /// Mirrors the shape inside a `size` box, then offsets it by `position`.
    #[must_use]
    pub fn to_world(self, position: Vec2, size: Vec2, flip: Flip) -> Shape {
        match self {
            Self::Sphere { center, radius } => {
                let mut center = center;
                if flip.horizontal {
                    center.x = size.x - center.x;
                }
                if flip.vertical {
                    center.y = size.y - center.y;
                }
                Self::Sphere {
                    center: center + position,
                    radius,
                }
            }
            Self::AaBox { min, max } => {
                let (mut lo, mut hi) = (min, max);
                if flip.horizontal {
                    lo.x = size.x - max.x;
                    hi.x = size.x - min.x;
                }
                if flip.vertical {
                    lo.y = size.y - max.y;
                    hi.y = size.y - min.y;
                }
                Self::AaBox {
                    min: lo + position,
                    max: hi + position,
                }
            }
        }
    }

    /// Returns `true` if the shapes overlap. Touching counts.
    #[must_use]
    pub fn intersects(&self, other: &Shape) -> bool {
        match (*self, *other) {
            (
                Self::Sphere { center: a, radius: ra },
                Self::Sphere { center: b, radius: rb },
            ) => a.distance_squared(b) <= (ra + rb) * (ra + rb),
            (Self::AaBox { min: a0, max: a1 }, Self::AaBox { min: b0, max: b1 }) => {
                a0.x <= b1.x && b0.x <= a1.x && a0.y <= b1.y && b0.y <= a1.y
            }
            (Self::Sphere { center, radius }, Self::AaBox { min, max })
            | (Self::AaBox { min, max }, Self::Sphere { center, radius }) => {
                center.clamp(min, max).distance_squared(center) <= radius * radius
            }
        }
    }

    /// Bottom-left and top-right corners of the shape's bounding box.
    #[must_use]
    pub fn extents(&self) -> (Vec2, Vec2) {
        match *self {
            Self::Sphere { center, radius } => {
                (center - Vec2::splat(radius), center + Vec2::splat(radius))
            }
            Self::AaBox { min, max } => (min, max),
        }
    }
}

/// A shape tagged with the hit it deals or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionVolume {
    /// Local-space shape.
    pub shape: Shape,
    /// Hit dealt (attack) or accepted (vulnerability).
    pub hit_type: HitType,
}

impl CollisionVolume {
    /// A circular volume.
    #[must_use]
    pub fn sphere(center: Vec2, radius: f32, hit_type: HitType) -> Self {
        Self {
            shape: Shape::Sphere { center, radius },
            hit_type,
        }
    }

    /// A box volume with bottom-left corner `min` and the given `size`.
    #[must_use]
    pub fn aabox(min: Vec2, size: Vec2, hit_type: HitType) -> Self {
        Self {
            shape: Shape::AaBox {
                min,
                max: min + size,
            },
            hit_type,
        }
    }

    /// Returns `true` if this volume accepts an incoming hit of `hit`.
    #[must_use]
    pub fn accepts(&self, hit: HitType) -> bool {
        self.hit_type == HitType::Invalid || self.hit_type == hit
    }
}

/// Immutable volume list shared by every instance of an object kind.
pub type VolumeSet = Arc<[CollisionVolume]>;

/// Conservative circle enclosing a set of volumes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// Center.
    pub center: Vec2,
    /// Radius; zero for an empty set.
    pub radius: f32,
}

impl BoundingSphere {
    /// Encloses every volume in `volumes` by circumscribing their combined
    /// bounding box.
    #[must_use]
    pub fn enclosing<'a, I>(volumes: I) -> Self
    where
        I: IntoIterator<Item = &'a CollisionVolume>,
    {
        let mut bounds: Option<(Vec2, Vec2)> = None;
        for volume in volumes {
            let (lo, hi) = volume.shape.extents();
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        match bounds {
            Some((min, max)) => Self {
                center: (min + max) * 0.5,
                radius: (max - min).length() * 0.5,
            },
            None => Self::default(),
        }
    }

    /// Returns `true` if nothing is enclosed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0
    }

    /// The circle as a [`Shape`].
    #[must_use]
    pub fn shape(&self) -> Shape {
        Shape::Sphere {
            center: self.center,
            radius: self.radius,
        }
    }

    /// Moves the circle to world space for an object.
    #[must_use]
    pub fn to_world(self, position: Vec2, size: Vec2, flip: Flip) -> Self {
        match self.shape().to_world(position, size, flip) {
            Shape::Sphere { center, radius } => Self { center, radius },
            Shape::AaBox { .. } => self,
        }
    }

    /// Returns `true` if the circles overlap. Touching counts.
    #[must_use]
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        self.shape().intersects(&other.shape())
    }

    /// Leftmost x covered by the circle.
    #[must_use]
    pub fn min_x(&self) -> f32 {
        self.center.x - self.radius
    }

    /// Rightmost x covered by the circle.
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.center.x + self.radius
    }
}
