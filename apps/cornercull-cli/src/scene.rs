use std::path::Path;

use anyhow::{Context, bail};
use cornercull_common::{TeamId, Transform};
use cornercull_cull::CullConfig;
use cornercull_geom::{Cuboid, Sphere};
use cornercull_kernel::World;
use glam::{Quat, Vec3};
use serde::Deserialize;

/// A scripted match loaded from YAML or JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub config: CullConfig,
    pub characters: Vec<CharacterSpec>,
    pub cuboids: Vec<CuboidSpec>,
    pub spheres: Vec<Sphere>,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CharacterSpec {
    pub team: u8,
    pub position: Vec3,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default = "default_camera_offset")]
    pub camera_offset: Vec3,
}

fn default_camera_offset() -> Vec3 {
    Vec3::Z * 26.0
}

/// Cuboid given as an axis-aligned box, an oriented box, or eight raw vertices.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CuboidSpec {
    AxisAligned {
        min: Vec3,
        max: Vec3,
    },
    Oriented {
        center: Vec3,
        half_extents: Vec3,
        #[serde(default)]
        yaw: f32,
    },
    Vertices {
        vertices: [Vec3; 8],
    },
}

impl CuboidSpec {
    pub fn build(&self) -> Cuboid {
        match *self {
            Self::AxisAligned { min, max } => Cuboid::axis_aligned(min, max),
            Self::Oriented {
                center,
                half_extents,
                yaw,
            } => Cuboid::oriented(center, half_extents, Quat::from_rotation_z(yaw)),
            Self::Vertices { vertices } => Cuboid::from_vertices(vertices),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Kill { slot: usize },
    Respawn { slot: usize, position: Vec3 },
    Move { slot: usize, position: Vec3 },
    RemoveCuboid { index: u32 },
}

impl Scene {
    /// Load a scene; `.yaml`/`.yml` files are YAML, anything else JSON.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let scene: Scene = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?,
            _ => serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?,
        };
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        for event in &self.events {
            match event.action {
                Action::Kill { slot } | Action::Respawn { slot, .. } | Action::Move { slot, .. } => {
                    if slot >= self.characters.len() {
                        bail!("event at tick {} names unknown character slot {slot}", event.tick);
                    }
                }
                Action::RemoveCuboid { index } => {
                    if index as usize >= self.cuboids.len() {
                        bail!("event at tick {} names unknown cuboid {index}", event.tick);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn world(&self, seed: u64) -> World {
        let mut world = World::with_seed(seed);
        for c in &self.characters {
            world.register(
                TeamId(c.team),
                Transform::from_position_yaw(c.position, c.yaw),
                c.camera_offset,
            );
        }
        world
    }

    pub fn cuboids(&self) -> Vec<Cuboid> {
        self.cuboids.iter().map(CuboidSpec::build).collect()
    }

    /// Events scheduled for `tick`, in file order.
    pub fn events_at(&self, tick: u64) -> impl Iterator<Item = &Action> {
        self.events.iter().filter(move |e| e.tick == tick).map(|e| &e.action)
    }
}
