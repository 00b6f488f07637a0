//! Blocking tests between one bundle and one occluder.
//!
//! Every test answers "is every sampled line of sight blocked?" and stops at
//! the first line that gets through.

use cornercull_geom::{CharacterBounds, Cuboid, ShadowFrustum, Sphere};

use crate::bundle::Bundle;
use crate::config::OcclusionMethod;

/// True iff the cuboid intersects every peek-to-vertex segment.
pub fn cuboid_blocks(bundle: &Bundle, enemy: &CharacterBounds, cuboid: &Cuboid) -> bool {
    bundle
        .sight_lines(enemy)
        .all(|(peek, vertex)| !cuboid.intersection_time(peek, vertex - peek).is_nan())
}

/// True iff the sphere blocks every peek-to-vertex segment.
pub fn sphere_blocks(bundle: &Bundle, enemy: &CharacterBounds, sphere: &Sphere) -> bool {
    bundle
        .sight_lines(enemy)
        .all(|(peek, vertex)| sphere.blocks(peek, vertex))
}

/// Shadow-frustum form of [`cuboid_blocks`].
///
/// Builds one frustum per peek, toward the enemy's center, and checks that it
/// hides the vertex group that peek is sampled against.
pub fn frustum_blocks(bundle: &Bundle, enemy: &CharacterBounds, cuboid: &Cuboid) -> bool {
    bundle.peeks.iter().enumerate().all(|(k, &peek)| {
        let vertices = if k < 2 {
            &enemy.top_vertices
        } else {
            &enemy.bottom_vertices
        };
        ShadowFrustum::toward(peek, enemy.center, cuboid)
            .is_some_and(|frustum| frustum.contains_all(vertices))
    })
}

/// Dispatch on the configured cuboid test.
pub(crate) fn blocks(
    method: OcclusionMethod,
    bundle: &Bundle,
    enemy: &CharacterBounds,
    cuboid: &Cuboid,
) -> bool {
    match method {
        OcclusionMethod::Segments => cuboid_blocks(bundle, enemy, cuboid),
        OcclusionMethod::ShadowFrustum => frustum_blocks(bundle, enemy, cuboid),
    }
}
