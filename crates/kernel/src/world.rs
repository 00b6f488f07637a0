use cornercull_common::{CharacterId, TeamId, Transform, splitmix64};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors from world mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("no character in slot {0}")]
    UnknownSlot(usize),
}

/// A player character as seen by the occlusion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub team: TeamId,
    pub alive: bool,
    /// Actor transform; its position is the geometric center of the hitbox.
    pub transform: Transform,
    /// First-person camera position relative to the actor, in actor space.
    pub camera_offset: Vec3,
}

impl Character {
    /// World-space location of the first-person camera.
    pub fn camera_location(&self) -> Vec3 {
        self.transform.position + self.transform.rotation * self.camera_offset
    }
}

/// The authoritative character registry.
///
/// Characters live in registration order; the index into
/// [`World::characters`] is the character's slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    characters: Vec<Character>,
    tick: u64,
    /// Seed for deterministic RNG. Advanced each step for reproducibility.
    seed: u64,
}

impl World {
    /// Create an empty world at tick 0 with seed 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Snapshot of every registered character, indexed by slot.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn alive_count(&self) -> usize {
        self.characters.iter().filter(|c| c.alive).count()
    }

    pub fn get(&self, slot: usize) -> Option<&Character> {
        self.characters.get(slot)
    }

    /// Register a living character and return its slot.
    pub fn register(&mut self, team: TeamId, transform: Transform, camera_offset: Vec3) -> usize {
        let slot = self.characters.len();
        self.characters.push(Character {
            id: CharacterId::new(),
            team,
            alive: true,
            transform,
            camera_offset,
        });
        tracing::debug!(slot, team = team.0, "character registered");
        slot
    }

    pub fn set_transform(&mut self, slot: usize, transform: Transform) -> Result<(), WorldError> {
        self.slot_mut(slot)?.transform = transform;
        Ok(())
    }

    pub fn kill(&mut self, slot: usize) -> Result<(), WorldError> {
        self.slot_mut(slot)?.alive = false;
        tracing::debug!(slot, "character died");
        Ok(())
    }

    /// Bring a character back at a new transform.
    pub fn respawn(&mut self, slot: usize, transform: Transform) -> Result<(), WorldError> {
        let character = self.slot_mut(slot)?;
        character.alive = true;
        character.transform = transform;
        tracing::debug!(slot, "character respawned");
        Ok(())
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        self.tick += 1;
        self.seed = splitmix64(self.seed);
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut Character, WorldError> {
        self.characters
            .get_mut(slot)
            .ok_or(WorldError::UnknownSlot(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.character_count(), 0);
    }

    #[test]
    fn slots_are_stable_across_death_and_respawn() {
        let mut w = World::new();
        let a = w.register(TeamId(0), Transform::default(), Vec3::ZERO);
        let b = w.register(TeamId(1), Transform::default(), Vec3::ZERO);
        assert_eq!((a, b), (0, 1));

        w.kill(a).unwrap();
        assert_eq!(w.alive_count(), 1);
        assert!(!w.get(a).unwrap().alive);

        let moved = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));
        w.respawn(a, moved).unwrap();
        assert!(w.get(a).unwrap().alive);
        assert_eq!(w.get(a).unwrap().transform, moved);
        assert_eq!(w.character_count(), 2);
    }

    #[test]
    fn unknown_slot_is_an_error() {
        let mut w = World::new();
        assert_eq!(w.kill(3), Err(WorldError::UnknownSlot(3)));
        assert!(w.set_transform(0, Transform::default()).is_err());
    }

    #[test]
    fn camera_location_follows_rotation() {
        let mut w = World::new();
        let slot = w.register(
            TeamId(0),
            Transform::from_position_yaw(Vec3::new(1.0, 0.0, 0.0), std::f32::consts::FRAC_PI_2),
            Vec3::new(2.0, 0.0, 60.0),
        );
        let cam = w.get(slot).unwrap().camera_location();
        assert!((cam - Vec3::new(1.0, 2.0, 60.0)).length() < 1e-4);
    }

    #[test]
    fn step_is_deterministic() {
        let mut w1 = World::with_seed(42);
        let mut w2 = World::with_seed(42);
        for _ in 0..100 {
            w1.step();
            w2.step();
        }
        assert_eq!(w1.tick(), 100);
        assert_eq!(w1.seed(), w2.seed());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut w1 = World::with_seed(1);
        let mut w2 = World::with_seed(2);
        w1.step();
        w2.step();
        assert_ne!(w1.seed(), w2.seed());
    }
}
