use glam::Vec3;

use crate::cuboid::{CUBOID_VERTICES, Cuboid};
use crate::plane::{Plane, in_half_spaces};

/// Convex region hidden behind a cuboid as seen from a viewpoint.
///
/// `planes` pass through the viewpoint and one silhouette edge each. `caps`
/// are the planes of the faces between viewer and target; a point must lie
/// behind them too, otherwise it sits between the viewer and the occluder.
///
/// Built once, then reused for any number of point tests from the same
/// viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowFrustum {
    pub planes: Vec<Plane>,
    pub caps: Vec<Plane>,
}

impl ShadowFrustum {
    /// Frustum cast by `cuboid` from `viewer` toward `target`.
    pub fn toward(viewer: Vec3, target: Vec3, cuboid: &Cuboid) -> Option<Self> {
        let faces = cuboid.faces_between(viewer, target);
        Self::build(viewer, cuboid, &faces)
    }

    /// Build from an explicit set of faces between viewer and target.
    ///
    /// Edge `(i, j)` is a silhouette edge when it lies on the perimeter of a
    /// listed face and `(j, i)` does not: edges shared by two listed faces
    /// show up in both directions and cancel.
    ///
    /// Returns `None` when no face lies between, or when a silhouette plane
    /// is degenerate (viewer collinear with an edge). Either way the cuboid
    /// hides nothing.
    pub fn build(viewer: Vec3, cuboid: &Cuboid, faces_between: &[usize]) -> Option<Self> {
        if faces_between.is_empty() {
            return None;
        }
        let mut edge_set = [[false; CUBOID_VERTICES]; CUBOID_VERTICES];
        for &f in faces_between {
            for (i, j) in cuboid.faces[f].edges() {
                edge_set[i][j] = true;
            }
        }
        let mut planes = Vec::with_capacity(6);
        for &f in faces_between {
            for (i, j) in cuboid.faces[f].edges() {
                if !edge_set[j][i] {
                    planes.push(Plane::from_points(
                        viewer,
                        cuboid.vertices[i],
                        cuboid.vertices[j],
                    )?);
                }
            }
        }
        let caps = faces_between.iter().map(|&f| cuboid.face_plane(f)).collect();
        Some(Self { planes, caps })
    }

    /// True iff the point is hidden from the viewer by the occluder.
    pub fn contains(&self, point: Vec3) -> bool {
        self.contains_all(std::slice::from_ref(&point))
    }

    /// True iff every point is hidden.
    pub fn contains_all(&self, points: &[Vec3]) -> bool {
        in_half_spaces(points, &self.planes) && in_half_spaces(points, &self.caps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cornercull_common::{RandomSource, SplitMix64};
    use glam::Quat;

    fn wall() -> Cuboid {
        Cuboid::axis_aligned(Vec3::new(0.0, -2.0, -2.0), Vec3::new(1.0, 2.0, 2.0))
    }

    #[test]
    fn isolated_face_on_cuboid_has_four_side_planes() {
        let viewer = Vec3::new(-10.0, 0.0, 0.0);
        let frustum = ShadowFrustum::toward(viewer, Vec3::new(10.0, 0.0, 0.0), &wall()).unwrap();
        assert_eq!(frustum.planes.len(), 4);
        assert_eq!(frustum.caps.len(), 1);
        // Every silhouette plane passes through the viewer.
        for plane in &frustum.planes {
            assert!(plane.signed_distance(viewer).abs() < 1e-4);
            // And none of them is the near or far face.
            assert!(plane.normal.x.abs() < 0.99);
        }
    }

    #[test]
    fn corner_view_cancels_shared_edge() {
        let c = wall();
        let viewer = Vec3::new(-10.0, -10.0, 0.0);
        let faces = c.faces_between(viewer, Vec3::new(10.0, 10.0, 0.0));
        assert_eq!(faces.len(), 2);
        let frustum = ShadowFrustum::build(viewer, &c, &faces).unwrap();
        assert_eq!(frustum.planes.len(), 6);
    }

    #[test]
    fn no_faces_between_hides_nothing() {
        let c = wall();
        // Target on the viewer's side of the wall.
        assert!(ShadowFrustum::toward(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(-5.0, 0.0, 0.0), &c).is_none());
    }

    #[test]
    fn axis_aligned_parity_with_segments() {
        let c = wall();
        let viewer = Vec3::new(-10.0, 0.3, 0.1);
        let frustum = ShadowFrustum::toward(viewer, Vec3::new(10.0, 0.0, 0.0), &c).unwrap();
        for x in [0.5f32, 3.0, 12.0] {
            for y in [-7.0f32, -3.0, -0.5, 0.0, 1.5, 4.0] {
                for z in [-6.0f32, -1.0, 0.0, 1.0, 6.0] {
                    let p = Vec3::new(x, y, z);
                    assert_eq!(frustum.contains(p), c.blocks(viewer, p), "point {p:?}");
                }
            }
        }
    }

    #[test]
    fn point_in_front_of_occluder_is_not_hidden() {
        let c = wall();
        let viewer = Vec3::new(-10.0, 0.0, 0.0);
        let frustum = ShadowFrustum::toward(viewer, Vec3::new(10.0, 0.0, 0.0), &c).unwrap();
        assert!(!frustum.contains(Vec3::new(-5.0, 0.0, 0.0)));
        assert!(frustum.contains(Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn randomized_parity_with_segments() {
        let mut rng = SplitMix64::new(0xC0FFEE);
        let mut agree = 0;
        let mut total = 0;
        while total < 2000 {
            let c = Cuboid::oriented(
                Vec3::ZERO,
                Vec3::new(rng.range_f32(0.5, 4.0), rng.range_f32(0.5, 4.0), rng.range_f32(0.5, 4.0)),
                Quat::from_rotation_z(rng.range_f32(0.0, std::f32::consts::TAU)),
            );
            let viewer = Vec3::new(rng.range_f32(-20.0, 20.0), rng.range_f32(-20.0, 20.0), rng.range_f32(-5.0, 5.0));
            let target = Vec3::new(rng.range_f32(-20.0, 20.0), rng.range_f32(-20.0, 20.0), rng.range_f32(-5.0, 5.0));
            if c.aabb().padded(0.5).contains_point(viewer) {
                continue;
            }
            total += 1;
            let hidden = ShadowFrustum::toward(viewer, target, &c).is_some_and(|f| f.contains(target));
            if hidden == c.blocks(viewer, target) {
                agree += 1;
            }
        }
        assert!(agree * 100 >= total * 95, "parity {agree}/{total}");
    }
}
