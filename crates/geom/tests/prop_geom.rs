use cornercull_geom::{Cuboid, Plane, Sphere, in_half_spaces};
use glam::{Quat, Vec3};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f32> {
    -100.0f32..100.0
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_cuboid() -> impl Strategy<Value = Cuboid> {
    (arb_vec3(), (0.5f32..20.0, 0.5f32..20.0, 0.5f32..20.0), 0.0f32..std::f32::consts::TAU)
        .prop_map(|(center, (hx, hy, hz), yaw)| {
            Cuboid::oriented(center, Vec3::new(hx, hy, hz), Quat::from_rotation_z(yaw))
        })
}

proptest! {
    // A hit time is either NaN or inside [0, 1], and the hit point is on the cuboid's bounds.
    #[test]
    fn cuboid_hit_time_is_nan_or_unit_interval(c in arb_cuboid(), a in arb_vec3(), b in arb_vec3()) {
        let t = c.intersection_time(a, b - a);
        if !t.is_nan() {
            prop_assert!((0.0..=1.0).contains(&t));
            let hit = a + (b - a) * t;
            prop_assert!(c.aabb().padded(1e-2).contains_point(hit));
        }
    }

    // Segments from the cuboid center to anywhere always touch it.
    #[test]
    fn segment_from_inside_always_hits(c in arb_cuboid(), b in arb_vec3()) {
        prop_assert!(c.blocks(c.center(), b));
    }

    // A sphere never blocks a segment whose line stays outside its radius.
    #[test]
    fn sphere_far_line_never_blocks(center in arb_vec3(), r in 0.1f32..10.0, a in arb_vec3(), b in arb_vec3()) {
        let s = Sphere::new(center, r);
        let d = b - a;
        prop_assume!(d.length_squared() > 1e-3);
        let line_distance = d.cross(center - a).length() / d.length();
        if line_distance > r * 1.01 + 1e-3 {
            prop_assert!(!s.blocks(a, b));
        }
    }

    // A sphere straddled by the segment with its center projecting inside blocks it.
    #[test]
    fn sphere_on_segment_blocks(a in arb_vec3(), b in arb_vec3(), u in 0.05f32..0.95, r in 0.1f32..10.0) {
        prop_assume!((b - a).length() > 1.0);
        let s = Sphere::new(a + (b - a) * u, r);
        prop_assert!(s.blocks(a, b));
    }

    // Adding a plane can only shrink the half-space intersection.
    #[test]
    fn extra_plane_only_shrinks(p in arb_vec3(), n in arb_vec3(), d in coord()) {
        prop_assume!(n.length_squared() > 1e-3);
        let base = [Plane::new(Vec3::Z, 50.0)];
        let more = [base[0], Plane::new(n.normalize(), d)];
        if in_half_spaces(&[p], &more) {
            prop_assert!(in_half_spaces(&[p], &base));
        }
    }
}
