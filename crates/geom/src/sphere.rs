use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A spherical occluder. Immutable after load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// True iff the segment from `start` to `end` is blocked by the sphere.
    ///
    /// Projects the center onto the line through the endpoints. The segment
    /// is blocked only when the closest point falls strictly inside the
    /// segment (`0 < u < 1`) and within the radius. A closest point outside
    /// the segment and a closest point beyond the radius are both reported as
    /// unblocked, even though an endpoint may sit inside the sphere.
    pub fn blocks(&self, start: Vec3, end: Vec3) -> bool {
        let to_end = end - start;
        let length_squared = to_end.length_squared();
        if length_squared == 0.0 {
            return false;
        }
        let u = to_end.dot(self.center - start) / length_squared;
        if !(0.0 < u && u < 1.0) {
            return false;
        }
        let closest = start + to_end * u;
        (self.center - closest).length_squared() <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_through_center_is_blocked() {
        let s = Sphere::new(Vec3::ZERO, 1.0);
        assert!(s.blocks(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn segment_passing_beside_is_clear() {
        let s = Sphere::new(Vec3::ZERO, 1.0);
        assert!(!s.blocks(Vec3::new(-5.0, 1.5, 0.0), Vec3::new(5.0, 1.5, 0.0)));
    }

    #[test]
    fn closest_point_outside_segment_is_clear() {
        let s = Sphere::new(Vec3::ZERO, 1.0);
        // Ends before the sphere center projection.
        assert!(!s.blocks(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0)));
        // Ends inside the sphere but the projection lies past the end.
        assert!(!s.blocks(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.0)));
    }

    #[test]
    fn degenerate_segment_is_clear() {
        let s = Sphere::new(Vec3::ZERO, 1.0);
        assert!(!s.blocks(Vec3::ZERO, Vec3::ZERO));
    }
}
