use glam::Vec3;

/// An oriented plane `normal · p = distance`.
///
/// The side the normal points to is "outside": points with positive signed
/// distance lie outside the half-space the plane bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane through `point` with the given (unit) normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    /// Plane through three points, normal `(b - a) × (c - a)` normalized.
    ///
    /// Returns `None` when the points are collinear or coincident.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let normal = (b - a).cross(c - a).try_normalize()?;
        Some(Self::from_point_normal(a, normal))
    }

    /// Signed distance from point to plane (positive = outside).
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// True iff every point lies inside (signed distance ≤ 0) every plane.
pub fn in_half_spaces(points: &[Vec3], planes: &[Plane]) -> bool {
    points
        .iter()
        .all(|p| planes.iter().all(|plane| plane.signed_distance(*p) <= 0.0))
}
