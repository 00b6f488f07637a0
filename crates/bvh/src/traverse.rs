use cornercull_geom::Segment;

use crate::builder::{Bvh, MAX_DEPTH};

/// Size of the fixed traversal stack. Covers any tree of [`MAX_DEPTH`] levels.
pub const STACK_CAPACITY: usize = 64;

const _: () = assert!(STACK_CAPACITY > MAX_DEPTH + 1);

/// What a traversal collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// Visit every leaf the segment reaches and collect every accepted primitive.
    AllHits,
    /// Stop at the first accepted primitive.
    OcclusionOnly,
}

#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    node: u32,
    t_near: f32,
}

/// Walks a [`Bvh`] along a segment.
///
/// Children whose boxes the segment touches are visited nearest first. At a
/// leaf every primitive is handed to the caller's intersector, which decides
/// whether it counts as a hit.
#[derive(Debug, Clone, Copy)]
pub struct Traverser<'a> {
    bvh: &'a Bvh,
    mode: TraversalMode,
}

impl<'a> Traverser<'a> {
    pub fn new(bvh: &'a Bvh, mode: TraversalMode) -> Self {
        Self { bvh, mode }
    }

    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    /// Traverse and return accepted primitive indices in visit order.
    ///
    /// In [`TraversalMode::OcclusionOnly`] the result holds at most one index.
    pub fn traverse<F>(&self, segment: &Segment, mut intersector: F) -> Vec<u32>
    where
        F: FnMut(u32) -> bool,
    {
        let mut hits = Vec::new();
        let nodes = self.bvh.nodes();
        let Some(root) = nodes.first() else {
            return hits;
        };
        let Some((root_near, _)) = root.bounds.segment_hit(segment) else {
            return hits;
        };

        let mut stack = [Pending::default(); STACK_CAPACITY];
        let mut len = 1;
        stack[0] = Pending {
            node: 0,
            t_near: root_near,
        };

        while len > 0 {
            len -= 1;
            let current = stack[len].node as usize;
            let node = &nodes[current];

            if node.is_leaf() {
                let start = node.start as usize;
                let primitives = &self.bvh.indices()[start..start + node.count as usize];
                for &primitive in primitives {
                    if intersector(primitive) {
                        hits.push(primitive);
                        if self.mode == TraversalMode::OcclusionOnly {
                            return hits;
                        }
                    }
                }
                continue;
            }

            let mut closer = current + 1;
            let mut other = current + node.right_offset as usize;
            let hit_left = nodes[closer].bounds.segment_hit(segment);
            let hit_right = nodes[other].bounds.segment_hit(segment);

            match (hit_left, hit_right) {
                (Some((mut near_closer, _)), Some((mut near_other, _))) => {
                    if near_other < near_closer {
                        std::mem::swap(&mut closer, &mut other);
                        std::mem::swap(&mut near_closer, &mut near_other);
                    }
                    // Farther first so the nearer child is popped next.
                    stack[len] = Pending {
                        node: other as u32,
                        t_near: near_other,
                    };
                    stack[len + 1] = Pending {
                        node: closer as u32,
                        t_near: near_closer,
                    };
                    len += 2;
                }
                (Some((t_near, _)), None) => {
                    stack[len] = Pending {
                        node: closer as u32,
                        t_near,
                    };
                    len += 1;
                }
                (None, Some((t_near, _))) => {
                    stack[len] = Pending {
                        node: other as u32,
                        t_near,
                    };
                    len += 1;
                }
                (None, None) => {}
            }
        }
        hits
    }

    /// First accepted primitive, if any. Ignores the configured mode.
    pub fn first_hit<F>(&self, segment: &Segment, intersector: F) -> Option<u32>
    where
        F: FnMut(u32) -> bool,
    {
        Traverser::new(self.bvh, TraversalMode::OcclusionOnly)
            .traverse(segment, intersector)
            .first()
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cornercull_common::{RandomSource, SplitMix64};
    use cornercull_geom::{Aabb, Cuboid};
    use glam::{Quat, Vec3};

    fn wall_row(count: usize) -> Vec<Cuboid> {
        (0..count)
            .map(|i| {
                let x = i as f32 * 10.0;
                Cuboid::axis_aligned(Vec3::new(x, -5.0, -5.0), Vec3::new(x + 1.0, 5.0, 5.0))
            })
            .collect()
    }

    fn bounds_of(cuboids: &[Cuboid]) -> Vec<Aabb> {
        cuboids.iter().map(Cuboid::aabb).collect()
    }

    #[test]
    fn empty_tree_has_no_hits() {
        let bvh = Bvh::build(&[]);
        let t = Traverser::new(&bvh, TraversalMode::AllHits);
        let seg = Segment::between(Vec3::ZERO, Vec3::ONE);
        assert!(t.traverse(&seg, |_| true).is_empty());
    }

    #[test]
    fn all_hits_collects_every_wall_crossed() {
        let walls = wall_row(20);
        let bvh = Bvh::with_leaf_size(&bounds_of(&walls), 2);
        let seg = Segment::between(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(45.0, 0.0, 0.0));
        let t = Traverser::new(&bvh, TraversalMode::AllHits);
        let mut hits = t.traverse(&seg, |i| walls[i as usize].blocks(seg.origin, seg.end()));
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn occlusion_only_stops_at_first_hit() {
        let walls = wall_row(20);
        let bvh = Bvh::with_leaf_size(&bounds_of(&walls), 1);
        let seg = Segment::between(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(195.0, 0.0, 0.0));
        let t = Traverser::new(&bvh, TraversalMode::OcclusionOnly);
        let mut calls = 0;
        let hits = t.traverse(&seg, |i| {
            calls += 1;
            walls[i as usize].blocks(seg.origin, seg.end())
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn nearest_child_is_visited_first() {
        let walls = wall_row(16);
        let bvh = Bvh::with_leaf_size(&bounds_of(&walls), 1);
        // Travelling toward -X the nearest wall is the last one.
        let seg = Segment::between(Vec3::new(200.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0));
        let t = Traverser::new(&bvh, TraversalMode::OcclusionOnly);
        let hit = t.traverse(&seg, |i| walls[i as usize].blocks(seg.origin, seg.end()));
        assert_eq!(hit, vec![15]);
        let forward = Segment::between(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(t.first_hit(&forward, |_| true), Some(0));
    }

    #[test]
    fn miss_returns_nothing() {
        let walls = wall_row(8);
        let bvh = Bvh::build(&bounds_of(&walls));
        let seg = Segment::between(Vec3::new(-5.0, 50.0, 0.0), Vec3::new(100.0, 50.0, 0.0));
        let t = Traverser::new(&bvh, TraversalMode::AllHits);
        assert!(t.traverse(&seg, |_| true).is_empty());
    }

    fn random_scene(rng: &mut SplitMix64, count: usize) -> Vec<Cuboid> {
        (0..count)
            .map(|_| {
                let center = Vec3::new(
                    rng.range_f32(-500.0, 500.0),
                    rng.range_f32(-500.0, 500.0),
                    rng.range_f32(-50.0, 50.0),
                );
                let half = Vec3::new(
                    rng.range_f32(1.0, 40.0),
                    rng.range_f32(1.0, 40.0),
                    rng.range_f32(1.0, 40.0),
                );
                let yaw = rng.range_f32(0.0, std::f32::consts::TAU);
                Cuboid::oriented(center, half, Quat::from_rotation_z(yaw))
            })
            .collect()
    }

    #[test]
    fn occlusion_verdict_matches_brute_force() {
        let mut rng = SplitMix64::new(2024);
        for scene in 0..8 {
            let count = 1 + (scene * 71) % 500;
            let cuboids = random_scene(&mut rng, count);
            let bvh = Bvh::build(&bounds_of(&cuboids));
            let t = Traverser::new(&bvh, TraversalMode::OcclusionOnly);
            for _ in 0..50 {
                let a = Vec3::new(rng.range_f32(-600.0, 600.0), rng.range_f32(-600.0, 600.0), rng.range_f32(-60.0, 60.0));
                let b = Vec3::new(rng.range_f32(-600.0, 600.0), rng.range_f32(-600.0, 600.0), rng.range_f32(-60.0, 60.0));
                let seg = Segment::between(a, b);
                let brute = cuboids.iter().any(|c| c.blocks(a, b));
                let hit = t.traverse(&seg, |i| cuboids[i as usize].blocks(a, b));
                assert_eq!(!hit.is_empty(), brute, "scene {scene} segment {a:?} -> {b:?}");
            }
        }
    }

    #[test]
    fn all_hits_matches_brute_force_set() {
        let mut rng = SplitMix64::new(77);
        let cuboids = random_scene(&mut rng, 300);
        let bvh = Bvh::build(&bounds_of(&cuboids));
        let t = Traverser::new(&bvh, TraversalMode::AllHits);
        for _ in 0..50 {
            let a = Vec3::new(rng.range_f32(-600.0, 600.0), rng.range_f32(-600.0, 600.0), 0.0);
            let b = Vec3::new(rng.range_f32(-600.0, 600.0), rng.range_f32(-600.0, 600.0), 0.0);
            let seg = Segment::between(a, b);
            let mut expected: Vec<u32> = (0..cuboids.len() as u32)
                .filter(|&i| cuboids[i as usize].blocks(a, b))
                .collect();
            let mut hits = t.traverse(&seg, |i| cuboids[i as usize].blocks(a, b));
            expected.sort_unstable();
            hits.sort_unstable();
            assert_eq!(hits, expected);
        }
    }
}
