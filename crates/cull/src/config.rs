use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::CullError;

/// How a cuboid is tested against a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcclusionMethod {
    /// Intersect every peek-to-vertex segment with the cuboid.
    #[default]
    Segments,
    /// Build one shadow frustum per peek and test the vertices against it.
    ShadowFrustum,
}

/// Occlusion engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullConfig {
    /// A cull pass runs once every this many ticks.
    pub culling_period: u64,
    /// Visibility timer increment under normal load.
    pub min_timer_increment: u32,
    /// Visibility timer increment once the rolling max cull time is over budget.
    pub max_timer_increment: u32,
    /// Exclusive upper bound of the random jitter added to a timer reset.
    pub timer_jitter: u32,
    /// Rolling max cull time, in microseconds, above which passes are spaced out.
    pub timer_load_threshold_us: u64,
    /// Ticks per rolling statistics window.
    pub rolling_window: u64,
    /// Sideways lean distance sampled around the camera.
    pub peek_horizontal: f32,
    /// Vertical crouch/jump distance sampled around the camera.
    pub peek_vertical: f32,
    /// Half size of the character hitbox.
    pub hitbox_half_extents: Vec3,
    pub occlusion_method: OcclusionMethod,
    /// Query cuboids through the BVH instead of testing all of them.
    pub use_bvh: bool,
    pub bvh_leaf_size: usize,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            culling_period: 4,
            min_timer_increment: 8,
            max_timer_increment: 20,
            timer_jitter: 3,
            timer_load_threshold_us: 2_000,
            rolling_window: 64,
            peek_horizontal: 15.0,
            peek_vertical: 10.0,
            hitbox_half_extents: Vec3::new(15.0, 15.0, 44.0),
            occlusion_method: OcclusionMethod::Segments,
            use_bvh: true,
            bvh_leaf_size: 4,
        }
    }
}

impl CullConfig {
    /// Load from a YAML (`.yaml`/`.yml`) or JSON file and validate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CullError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CullError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CullError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CullError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(CullError::InvalidConfig {
                field,
                reason: reason.to_string(),
            })
        };
        if self.culling_period == 0 {
            return invalid("culling_period", "must be at least 1");
        }
        if self.min_timer_increment == 0 {
            return invalid("min_timer_increment", "must be at least 1");
        }
        if self.min_timer_increment > self.max_timer_increment {
            return invalid("max_timer_increment", "must not be below min_timer_increment");
        }
        if self.rolling_window == 0 {
            return invalid("rolling_window", "must be at least 1");
        }
        if self.bvh_leaf_size == 0 {
            return invalid("bvh_leaf_size", "must be at least 1");
        }
        if !(self.peek_horizontal.is_finite() && self.peek_horizontal >= 0.0) {
            return invalid("peek_horizontal", "must be finite and non-negative");
        }
        if !(self.peek_vertical.is_finite() && self.peek_vertical >= 0.0) {
            return invalid("peek_vertical", "must be finite and non-negative");
        }
        if !(self.hitbox_half_extents.is_finite() && self.hitbox_half_extents.min_element() >= 0.0) {
            return invalid("hitbox_half_extents", "must be finite and non-negative");
        }
        Ok(())
    }
}
