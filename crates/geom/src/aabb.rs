use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A bounded segment `origin + t * direction` for `t` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Segment {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Segment running from `start` to `end`.
    pub fn between(start: Vec3, end: Vec3) -> Self {
        Self {
            origin: start,
            direction: end - start,
        }
    }

    pub fn end(&self) -> Vec3 {
        self.origin + self.direction
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box defined by min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box that contains nothing; the identity for [`Aabb::merged`].
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand(*p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Surface area, used by the BVH split heuristic. Zero for an empty box.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow every side by `amount`.
    pub fn padded(&self, amount: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Slab test against a bounded segment.
    ///
    /// Returns the clipped parameter interval `(t_near, t_far)` within `[0, 1]`
    /// if the segment touches the box.
    pub fn segment_hit(&self, segment: &Segment) -> Option<(f32, f32)> {
        let mut t_near = 0.0f32;
        let mut t_far = 1.0f32;
        for axis in 0..3 {
            let origin = segment.origin[axis];
            let dir = segment.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if dir == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }
        Some((t_near, t_far))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
        assert_eq!(aabb.surface_area(), 6.0);
    }

    #[test]
    fn empty_is_merge_identity() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(Aabb::empty().is_empty());
        assert_eq!(Aabb::empty().merged(&a), a);
        assert_eq!(Aabb::empty().surface_area(), 0.0);
    }

    #[test]
    fn from_points_bounds_all() {
        let pts = [Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0)];
        let aabb = Aabb::from_points(&pts);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(pts.iter().all(|p| aabb.contains_point(*p)));
    }

    #[test]
    fn segment_hit_through_box() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let seg = Segment::between(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(3.0, 0.5, 0.5));
        let (t0, t1) = aabb.segment_hit(&seg).unwrap();
        assert!((t0 - 0.25).abs() < 1e-6);
        assert!((t1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn segment_stopping_short_misses() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let seg = Segment::between(Vec3::new(-3.0, 0.5, 0.5), Vec3::new(-1.0, 0.5, 0.5));
        assert!(aabb.segment_hit(&seg).is_none());
    }

    #[test]
    fn axis_parallel_segment_outside_slab_misses() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let seg = Segment::between(Vec3::new(-1.0, 2.0, 0.5), Vec3::new(3.0, 2.0, 0.5));
        assert!(aabb.segment_hit(&seg).is_none());
    }

    #[test]
    fn segment_starting_inside_hits_at_zero() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let seg = Segment::between(Vec3::splat(0.5), Vec3::splat(5.0));
        let (t0, _) = aabb.segment_hit(&seg).unwrap();
        assert_eq!(t0, 0.0);
    }
}
