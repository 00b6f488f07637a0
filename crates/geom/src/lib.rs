//! Geometry primitives for line-of-sight occlusion.
//!
//! All operations are pure functions of small `Copy` value types built on
//! [`glam::Vec3`]. Z is up.
//!
//! # Invariants
//! - Segment tests never divide by zero; "no hit" is reported as `NaN`
//!   (cuboids) or `false`, never as a panic.
//! - Cuboid face perimeters wind counter-clockwise about their outward
//!   normal, so an edge shared by two faces appears once in each direction.

mod aabb;
mod bounds;
mod cuboid;
mod frustum;
mod plane;
mod sphere;

pub use aabb::{Aabb, Segment};
pub use bounds::{BOUND_VERTICES, CharacterBounds};
pub use cuboid::{CUBOID_FACES, CUBOID_VERTICES, Cuboid, Face};
pub use frustum::ShadowFrustum;
pub use plane::{Plane, in_half_spaces};
pub use sphere::Sphere;

/// Lengths below this are treated as zero when normalizing directions.
pub const DIRECTION_EPSILON: f32 = 1e-6;
