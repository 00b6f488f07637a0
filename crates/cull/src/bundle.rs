use cornercull_geom::{CharacterBounds, DIRECTION_EPSILON};
use cornercull_kernel::Character;
use glam::Vec3;

use crate::cache::VisibilityCache;
use crate::config::CullConfig;

/// Candidate eye positions sampled per bundle.
pub const NUM_PEEKS: usize = 4;

/// One tick's visibility query for an ordered (player, enemy) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bundle {
    pub player: usize,
    pub enemy: usize,
    /// Peek positions in the order `+H+V, -H+V, -H-V, +H-V`.
    pub peeks: [Vec3; NUM_PEEKS],
}

impl Bundle {
    /// Every sampled line of sight as `(peek, enemy vertex)`.
    ///
    /// The two raised peeks look at the top of the enemy's hitbox and the two
    /// lowered peeks at the bottom.
    pub fn sight_lines<'a>(
        &'a self,
        enemy: &'a CharacterBounds,
    ) -> impl Iterator<Item = (Vec3, Vec3)> + 'a {
        let top = enemy
            .top_vertices
            .iter()
            .flat_map(move |v| [(self.peeks[0], *v), (self.peeks[1], *v)]);
        let bottom = enemy
            .bottom_vertices
            .iter()
            .flat_map(move |v| [(self.peeks[2], *v), (self.peeks[3], *v)]);
        top.chain(bottom)
    }
}

/// Positions a player could see from by leaning and crouching.
///
/// The horizontal offset is perpendicular to the camera→enemy direction and
/// parallel to the ground; the vertical offset runs along +Z. Returns `None`
/// when camera and enemy coincide and no direction exists.
pub fn possible_peeks(
    camera: Vec3,
    enemy_center: Vec3,
    horizontal: f32,
    vertical: f32,
) -> Option<[Vec3; NUM_PEEKS]> {
    let to_enemy = enemy_center - camera;
    if to_enemy.length() < DIRECTION_EPSILON {
        return None;
    }
    let side = Vec3::new(-to_enemy.y, to_enemy.x, 0.0)
        .try_normalize()
        .unwrap_or(Vec3::X);
    let h = side * horizontal;
    let v = Vec3::Z * vertical;
    Some([camera + h + v, camera - h + v, camera - h - v, camera + h - v])
}

/// Output of bundle generation for one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleBatch {
    pub queue: Vec<Bundle>,
    /// Pairs with no usable peek direction; treated as visible without testing.
    pub fail_open: Vec<(usize, usize)>,
}

/// Builds character bounds and bundles at the start of every cull pass.
#[derive(Debug, Clone)]
pub struct BundleGenerator {
    peek_horizontal: f32,
    peek_vertical: f32,
    hitbox_half_extents: Vec3,
}

impl BundleGenerator {
    pub fn new(config: &CullConfig) -> Self {
        Self {
            peek_horizontal: config.peek_horizontal,
            peek_vertical: config.peek_vertical,
            hitbox_half_extents: config.hitbox_half_extents,
        }
    }

    /// Recompute bounds for every living character; dead slots get `None`.
    pub fn refresh_bounds(&self, characters: &[Character], bounds: &mut Vec<Option<CharacterBounds>>) {
        bounds.clear();
        bounds.extend(characters.iter().map(|c| {
            c.alive.then(|| {
                CharacterBounds::new(c.camera_location(), &c.transform, self.hitbox_half_extents)
            })
        }));
    }

    /// Count timers down and queue a bundle for each living enemy pair whose
    /// timer is exactly zero.
    pub fn populate(
        &self,
        characters: &[Character],
        bounds: &[Option<CharacterBounds>],
        cache: &mut VisibilityCache,
    ) -> BundleBatch {
        let mut batch = BundleBatch::default();
        for (i, player) in characters.iter().enumerate() {
            let Some(player_bounds) = bounds.get(i).and_then(Option::as_ref) else {
                continue;
            };
            for (j, enemy) in characters.iter().enumerate() {
                if i == j {
                    continue;
                }
                if cache.decrement_timer(i, j) != 0 || !enemy.alive || enemy.team == player.team {
                    continue;
                }
                let Some(enemy_bounds) = bounds.get(j).and_then(Option::as_ref) else {
                    continue;
                };
                match possible_peeks(
                    player_bounds.camera_location,
                    enemy_bounds.center,
                    self.peek_horizontal,
                    self.peek_vertical,
                ) {
                    Some(peeks) => batch.queue.push(Bundle {
                        player: i,
                        enemy: j,
                        peeks,
                    }),
                    None => batch.fail_open.push((i, j)),
                }
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cornercull_common::{TeamId, Transform};
    use cornercull_kernel::World;

    #[test]
    fn peeks_are_in_fixed_order() {
        let peeks = possible_peeks(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), 15.0, 10.0).unwrap();
        assert_eq!(peeks[0], Vec3::new(0.0, 15.0, 10.0));
        assert_eq!(peeks[1], Vec3::new(0.0, -15.0, 10.0));
        assert_eq!(peeks[2], Vec3::new(0.0, -15.0, -10.0));
        assert_eq!(peeks[3], Vec3::new(0.0, 15.0, -10.0));
    }

    #[test]
    fn horizontal_offset_has_fixed_magnitude() {
        let camera = Vec3::new(0.0, 0.0, 50.0);
        let peeks = possible_peeks(camera, Vec3::new(30.0, 40.0, 0.0), 15.0, 10.0).unwrap();
        let h = (peeks[0] - peeks[1]) * 0.5;
        assert!((h.length() - 15.0).abs() < 1e-4);
        assert_eq!(h.z, 0.0);
        assert!(h.dot(Vec3::new(30.0, 40.0, 0.0)).abs() < 1e-3);
    }

    #[test]
    fn vertical_direction_falls_back_to_x() {
        let peeks = possible_peeks(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0), 15.0, 10.0).unwrap();
        assert_eq!(peeks[0], Vec3::new(15.0, 0.0, 10.0));
    }

    #[test]
    fn coincident_positions_have_no_peeks() {
        assert!(possible_peeks(Vec3::ONE, Vec3::ONE, 15.0, 10.0).is_none());
    }

    #[test]
    fn sixteen_sight_lines_split_top_and_bottom() {
        let t = Transform::default();
        let enemy = CharacterBounds::new(Vec3::ZERO, &t, Vec3::ONE);
        let bundle = Bundle {
            player: 0,
            enemy: 1,
            peeks: [Vec3::X, Vec3::Y, Vec3::NEG_X, Vec3::NEG_Y],
        };
        let lines: Vec<_> = bundle.sight_lines(&enemy).collect();
        assert_eq!(lines.len(), 16);
        for (peek, v) in &lines[..8] {
            assert!(*peek == Vec3::X || *peek == Vec3::Y);
            assert_eq!(v.z, 1.0);
        }
        for (peek, v) in &lines[8..] {
            assert!(*peek == Vec3::NEG_X || *peek == Vec3::NEG_Y);
            assert_eq!(v.z, -1.0);
        }
    }

    fn three_player_world() -> World {
        let mut w = World::new();
        w.register(TeamId(0), Transform::from_position(Vec3::ZERO), Vec3::Z * 30.0);
        w.register(TeamId(1), Transform::from_position(Vec3::new(500.0, 0.0, 0.0)), Vec3::Z * 30.0);
        w.register(TeamId(0), Transform::from_position(Vec3::new(0.0, 500.0, 0.0)), Vec3::Z * 30.0);
        w
    }

    #[test]
    fn bundles_only_for_living_opponents_with_expired_timers() {
        let mut w = three_player_world();
        let generator = BundleGenerator::new(&CullConfig::default());
        let mut bounds = Vec::new();
        let mut cache = VisibilityCache::new(3);
        cache.set_timer(2, 1, 3);

        generator.refresh_bounds(w.characters(), &mut bounds);
        let batch = generator.populate(w.characters(), &bounds, &mut cache);
        let pairs: Vec<_> = batch.queue.iter().map(|b| (b.player, b.enemy)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 0), (1, 2)]);
        assert_eq!(cache.timer(2, 1), 2);

        w.kill(1).unwrap();
        generator.refresh_bounds(w.characters(), &mut bounds);
        assert!(bounds[1].is_none());
        let batch = generator.populate(w.characters(), &bounds, &mut cache);
        assert!(batch.queue.is_empty());
        // Timers of living observers keep counting down toward dead targets.
        assert_eq!(cache.timer(2, 1), 1);
    }

    #[test]
    fn coincident_cameras_fail_open() {
        let mut w = World::new();
        w.register(TeamId(0), Transform::from_position(Vec3::ZERO), Vec3::ZERO);
        w.register(TeamId(1), Transform::from_position(Vec3::ZERO), Vec3::ZERO);
        let generator = BundleGenerator::new(&CullConfig::default());
        let mut bounds = Vec::new();
        let mut cache = VisibilityCache::new(2);
        generator.refresh_bounds(w.characters(), &mut bounds);
        let batch = generator.populate(w.characters(), &bounds, &mut cache);
        assert!(batch.queue.is_empty());
        assert_eq!(batch.fail_open, vec![(0, 1), (1, 0)]);
    }
}
