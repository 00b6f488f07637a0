use cornercull_common::{RandomSource, SplitMix64, TeamId, Transform};
use cornercull_geom::{Cuboid, Sphere};
use cornercull_kernel::World;
use glam::{Quat, Vec3};

/// Shape of a randomly generated arena.
#[derive(Debug, Clone, Copy)]
pub struct ArenaSpec {
    pub cuboids: usize,
    pub spheres: usize,
    pub characters: usize,
    /// Half width of the square floor, centred on the origin.
    pub half_size: f32,
    pub seed: u64,
}

impl Default for ArenaSpec {
    fn default() -> Self {
        Self {
            cuboids: 500,
            spheres: 10,
            characters: 10,
            half_size: 4000.0,
            seed: 42,
        }
    }
}

/// Random occluders plus a world of characters split over two teams.
pub struct Arena {
    pub world: World,
    pub cuboids: Vec<Cuboid>,
    pub spheres: Vec<Sphere>,
}

impl Arena {
    pub fn generate(spec: &ArenaSpec) -> Self {
        let mut rng = SplitMix64::new(spec.seed);
        let h = spec.half_size;

        let cuboids = (0..spec.cuboids)
            .map(|_| {
                let half = Vec3::new(rng.range_f32(10.0, 200.0), rng.range_f32(10.0, 200.0), rng.range_f32(50.0, 200.0));
                let center = Vec3::new(rng.range_f32(-h, h), rng.range_f32(-h, h), half.z);
                let yaw = rng.range_f32(0.0, std::f32::consts::TAU);
                Cuboid::oriented(center, half, Quat::from_rotation_z(yaw))
            })
            .collect();

        let spheres = (0..spec.spheres)
            .map(|_| {
                let radius = rng.range_f32(20.0, 150.0);
                Sphere::new(Vec3::new(rng.range_f32(-h, h), rng.range_f32(-h, h), radius), radius)
            })
            .collect();

        let mut world = World::with_seed(spec.seed);
        for i in 0..spec.characters {
            let position = Vec3::new(rng.range_f32(-h, h), rng.range_f32(-h, h), 44.0);
            world.register(TeamId((i % 2) as u8), Transform::from_position(position), Vec3::Z * 26.0);
        }
        tracing::debug!(
            cuboids = spec.cuboids,
            spheres = spec.spheres,
            characters = spec.characters,
            seed = spec.seed,
            "arena generated"
        );

        Self { world, cuboids, spheres }
    }

    /// Nudge every living character by up to `max_step` on the ground plane.
    pub fn wander(&mut self, rng: &mut impl RandomSource, max_step: f32) {
        for slot in 0..self.world.character_count() {
            let Some(character) = self.world.get(slot) else {
                continue;
            };
            if !character.alive {
                continue;
            }
            let step = Vec3::new(rng.range_f32(-max_step, max_step), rng.range_f32(-max_step, max_step), 0.0);
            let mut transform = character.transform;
            transform.position += step;
            if self.world.set_transform(slot, transform).is_err() {
                tracing::warn!(slot, "character vanished while wandering");
            }
        }
    }
}
