use cornercull_bvh::{Bvh, TraversalMode, Traverser};
use cornercull_geom::{CharacterBounds, Cuboid, Segment, Sphere};

use crate::bundle::Bundle;
use crate::cache::VisibilityCache;
use crate::config::OcclusionMethod;
use crate::occlusion;

/// Static occluder geometry plus its spatial index.
///
/// Cuboids keep their load-time index for the life of the match. Destroyed
/// cuboids are disabled in place rather than removed.
#[derive(Debug, Clone)]
pub struct Occluders {
    cuboids: Vec<Cuboid>,
    active: Vec<bool>,
    spheres: Vec<Sphere>,
    bvh: Bvh,
}

impl Occluders {
    pub fn new(cuboids: Vec<Cuboid>, spheres: Vec<Sphere>, leaf_size: usize) -> Self {
        let bounds: Vec<_> = cuboids.iter().map(Cuboid::aabb).collect();
        let bvh = Bvh::with_leaf_size(&bounds, leaf_size);
        Self {
            active: vec![true; cuboids.len()],
            cuboids,
            spheres,
            bvh,
        }
    }

    pub fn cuboids(&self) -> &[Cuboid] {
        &self.cuboids
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn is_active(&self, index: u32) -> bool {
        self.active.get(index as usize).copied().unwrap_or(false)
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Stop a cuboid from occluding. Returns `false` for an unknown index.
    pub fn disable(&mut self, index: u32) -> bool {
        match self.active.get_mut(index as usize) {
            Some(active) => {
                *active = false;
                true
            }
            None => false,
        }
    }
}

/// Bundle counts for one cull pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub bundles: usize,
    pub fail_open: usize,
    pub culled_by_cache: usize,
    pub culled_by_spheres: usize,
    pub culled_by_cuboids: usize,
    pub visible: usize,
}

/// The three culling stages of a pass: cache, spheres, cuboids.
///
/// Each stage takes the queue and returns only the bundles it could not
/// prove blocked.
pub struct OcclusionPipeline<'a> {
    occluders: &'a Occluders,
    bounds: &'a [Option<CharacterBounds>],
    method: OcclusionMethod,
    use_bvh: bool,
    tick: u64,
}

impl<'a> OcclusionPipeline<'a> {
    pub fn new(
        occluders: &'a Occluders,
        bounds: &'a [Option<CharacterBounds>],
        method: OcclusionMethod,
        use_bvh: bool,
        tick: u64,
    ) -> Self {
        Self {
            occluders,
            bounds,
            method,
            use_bvh,
            tick,
        }
    }

    /// Run all three stages and return the visible bundles.
    pub fn run(&self, queue: Vec<Bundle>, cache: &mut VisibilityCache, stats: &mut PassStats) -> Vec<Bundle> {
        stats.bundles = queue.len();
        let queue = self.cull_with_cache(queue, cache);
        stats.culled_by_cache = stats.bundles - queue.len();
        let before = queue.len();
        let queue = self.cull_with_spheres(queue);
        stats.culled_by_spheres = before - queue.len();
        let before = queue.len();
        let queue = self.cull_with_cuboids(queue, cache);
        stats.culled_by_cuboids = before - queue.len();
        queue
    }

    /// Drop bundles blocked by a cuboid already cached for the pair,
    /// refreshing that entry's timestamp.
    pub fn cull_with_cache(&self, queue: Vec<Bundle>, cache: &mut VisibilityCache) -> Vec<Bundle> {
        let mut remaining = Vec::with_capacity(queue.len());
        for bundle in queue {
            let Some(enemy) = self.enemy_bounds(&bundle) else {
                continue;
            };
            let hit = cache.occluders(bundle.player, bundle.enemy).and_then(|entries| {
                entries.entries().find(|&(_, cuboid)| {
                    self.occluders.is_active(cuboid) && self.is_blocking(&bundle, enemy, cuboid)
                })
            });
            match hit {
                Some((slot, _)) => cache.touch_occluder(bundle.player, bundle.enemy, slot, self.tick),
                None => remaining.push(bundle),
            }
        }
        remaining
    }

    /// Drop bundles blocked by any sphere. Spheres are few, so no index.
    pub fn cull_with_spheres(&self, queue: Vec<Bundle>) -> Vec<Bundle> {
        queue
            .into_iter()
            .filter(|bundle| {
                let Some(enemy) = self.enemy_bounds(bundle) else {
                    return false;
                };
                !self
                    .occluders
                    .spheres()
                    .iter()
                    .any(|sphere| occlusion::sphere_blocks(bundle, enemy, sphere))
            })
            .collect()
    }

    /// Drop bundles blocked by any cuboid and cache the blocker for the pair.
    pub fn cull_with_cuboids(&self, queue: Vec<Bundle>, cache: &mut VisibilityCache) -> Vec<Bundle> {
        let mut remaining = Vec::with_capacity(queue.len());
        for bundle in queue {
            let Some(enemy) = self.enemy_bounds(&bundle) else {
                continue;
            };
            match self.find_blocker(&bundle, enemy) {
                Some(cuboid) => cache.insert_occluder(bundle.player, bundle.enemy, cuboid, self.tick),
                None => remaining.push(bundle),
            }
        }
        remaining
    }

    /// First active cuboid blocking the bundle, nearest first when indexed.
    ///
    /// A blocker must cut every sight line, so the BVH is walked along just
    /// one of them.
    fn find_blocker(&self, bundle: &Bundle, enemy: &CharacterBounds) -> Option<u32> {
        let accept = |cuboid: u32| self.occluders.is_active(cuboid) && self.is_blocking(bundle, enemy, cuboid);
        if self.use_bvh {
            let probe = Segment::between(bundle.peeks[0], enemy.top_vertices[0]);
            Traverser::new(self.occluders.bvh(), TraversalMode::OcclusionOnly).first_hit(&probe, accept)
        } else {
            (0..self.occluders.cuboids().len() as u32).find(|&cuboid| accept(cuboid))
        }
    }

    fn is_blocking(&self, bundle: &Bundle, enemy: &CharacterBounds, cuboid: u32) -> bool {
        self.occluders
            .cuboids()
            .get(cuboid as usize)
            .is_some_and(|c| occlusion::blocks(self.method, bundle, enemy, c))
    }

    fn enemy_bounds(&self, bundle: &Bundle) -> Option<&'a CharacterBounds> {
        let bounds = self.bounds.get(bundle.enemy).and_then(Option::as_ref);
        if bounds.is_none() {
            debug_assert!(false, "bundle references slot {} without bounds", bundle.enemy);
            tracing::warn!(player = bundle.player, enemy = bundle.enemy, "skipping stale bundle");
        }
        bounds
    }
}
