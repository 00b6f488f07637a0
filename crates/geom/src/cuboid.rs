use glam::{Quat, Vec3};

use crate::aabb::{Aabb, Segment};
use crate::plane::Plane;

pub const CUBOID_VERTICES: usize = 8;
pub const CUBOID_FACES: usize = 6;

/// One face of a cuboid.
///
/// `perimeter` holds vertex indices wound counter-clockwise about `normal`
/// (right-hand rule), so neighbouring faces list their shared edge in
/// opposite directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub normal: Vec3,
    pub perimeter: [usize; 4],
}

impl Face {
    /// Directed perimeter edges `(i, j)`.
    pub fn edges(&self) -> [(usize, usize); 4] {
        let p = self.perimeter;
        [(p[0], p[1]), (p[1], p[2]), (p[2], p[3]), (p[3], p[0])]
    }
}

/// Face layout shared by every cuboid.
///
/// Vertices 0..4 form the bottom ring, counter-clockwise seen from above;
/// vertex `i + 4` sits above vertex `i`.
const PERIMETERS: [[usize; 4]; CUBOID_FACES] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// A convex hexahedron occluder: 8 vertices and 6 planar faces.
///
/// Immutable after load. Engines reference cuboids by index into a stable
/// array and never copy them into caches.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    pub vertices: [Vec3; CUBOID_VERTICES],
    pub faces: [Face; CUBOID_FACES],
}

impl Cuboid {
    /// Build from vertices in the bottom-ring/top-ring convention.
    ///
    /// Face normals are derived from the perimeters. A degenerate face gets a
    /// zero normal, which the segment test treats as a plane it never crosses.
    pub fn from_vertices(vertices: [Vec3; CUBOID_VERTICES]) -> Self {
        let faces = PERIMETERS.map(|perimeter| {
            let a = vertices[perimeter[0]];
            let b = vertices[perimeter[1]];
            let c = vertices[perimeter[2]];
            Face {
                normal: (b - a).cross(c - b).normalize_or_zero(),
                perimeter,
            }
        });
        Self { vertices, faces }
    }

    pub fn axis_aligned(min: Vec3, max: Vec3) -> Self {
        Self::oriented((min + max) * 0.5, (max - min) * 0.5, Quat::IDENTITY)
    }

    /// Box of the given half extents, rotated about its center.
    pub fn oriented(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        let h = half_extents;
        let local = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        Self::from_vertices(local.map(|v| center + rotation * v))
    }

    /// Vertex `k` of face `face`.
    pub fn face_vertex(&self, face: usize, k: usize) -> Vec3 {
        self.vertices[self.faces[face].perimeter[k]]
    }

    pub fn face_plane(&self, face: usize) -> Plane {
        Plane::from_point_normal(self.face_vertex(face, 0), self.faces[face].normal)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    pub fn center(&self) -> Vec3 {
        self.vertices.iter().copied().sum::<Vec3>() / CUBOID_VERTICES as f32
    }

    /// Parametric time at which `origin + t * direction` first touches the
    /// cuboid, for `t` in `[0, 1]`.
    ///
    /// Returns `NaN` when the segment misses, so callers can test a hit with
    /// a single `is_nan()`. A segment starting inside reports `0.0`.
    pub fn intersection_time(&self, origin: Vec3, direction: Vec3) -> f32 {
        let mut t_enter = 0.0f32;
        let mut t_exit = 1.0f32;
        for face in &self.faces {
            let point = self.vertices[face.perimeter[0]];
            let denom = face.normal.dot(direction);
            let dist = face.normal.dot(origin - point);
            if denom == 0.0 {
                if dist > 0.0 {
                    return f32::NAN;
                }
                continue;
            }
            let t = -dist / denom;
            if denom < 0.0 {
                t_enter = t_enter.max(t);
            } else {
                t_exit = t_exit.min(t);
            }
            if t_enter > t_exit {
                return f32::NAN;
            }
        }
        t_enter
    }

    /// Segment form of [`Cuboid::intersection_time`].
    pub fn segment_time(&self, segment: &Segment) -> f32 {
        self.intersection_time(segment.origin, segment.direction)
    }

    /// True iff the segment from `start` to `end` touches the cuboid.
    pub fn blocks(&self, start: Vec3, end: Vec3) -> bool {
        !self.intersection_time(start, end - start).is_nan()
    }

    /// Indices of faces lying between a viewer and a target: facing the
    /// viewer and facing away from the target.
    pub fn faces_between(&self, viewer: Vec3, target: Vec3) -> Vec<usize> {
        (0..CUBOID_FACES)
            .filter(|&i| {
                let normal = self.faces[i].normal;
                let v = self.face_vertex(i, 0);
                (v - viewer).dot(normal) < 0.0 && (v - target).dot(normal) > 0.0
            })
            .collect()
    }
}
