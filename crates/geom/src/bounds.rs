use cornercull_common::Transform;
use glam::Vec3;

/// Number of vertices in each of the top and bottom vertex sets.
pub const BOUND_VERTICES: usize = 4;

/// Per-tick visibility bounds of a living character.
///
/// Derived fresh on every cull tick and never carried over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterBounds {
    pub camera_location: Vec3,
    pub center: Vec3,
    /// Corners of the top of the hitbox.
    pub top_vertices: [Vec3; BOUND_VERTICES],
    /// Corners of the bottom of the hitbox.
    pub bottom_vertices: [Vec3; BOUND_VERTICES],
}

const CORNERS: [(f32, f32); BOUND_VERTICES] = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];

impl CharacterBounds {
    /// Bounds of a hitbox with `half_extents`, posed by the actor transform.
    pub fn new(camera_location: Vec3, transform: &Transform, half_extents: Vec3) -> Self {
        let h = half_extents;
        let corner = |sx: f32, sy: f32, sz: f32| {
            transform.transform_point(Vec3::new(sx * h.x, sy * h.y, sz * h.z))
        };
        Self {
            camera_location,
            center: transform.position,
            top_vertices: CORNERS.map(|(sx, sy)| corner(sx, sy, 1.0)),
            bottom_vertices: CORNERS.map(|(sx, sy)| corner(sx, sy, -1.0)),
        }
    }

    /// All eight hitbox corners, top first.
    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.top_vertices.iter().chain(self.bottom_vertices.iter()).copied()
    }
}
