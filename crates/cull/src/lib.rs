//! Occlusion culling: decides every tick which opposing characters can see
//! each other, so only visible pairs exchange positions.
//!
//! A pass builds one [`Bundle`] per pair whose visibility timer has run out,
//! then filters the queue through the pair's occluder cache, every sphere,
//! and the BVH-indexed cuboids. Bundles that survive are visible: their timer
//! is reset and the enemy is reported to the [`LocationSink`] for as long as
//! the timer stays positive.
//!
//! # Invariants
//! - Visibility timers never go below zero and only drop by one per cull pass.
//! - A bundle is blocked only if every sampled line of sight is blocked by
//!   the same occluder; anything doubtful resolves to visible.
//! - The sink hears about each visible pair at most once per tick.

mod bundle;
mod cache;
mod config;
mod engine;
mod error;
mod matrix;
mod occlusion;
mod pipeline;
mod scheduler;
mod sink;

pub use bundle::{Bundle, BundleBatch, BundleGenerator, NUM_PEEKS, possible_peeks};
pub use cache::{OCCLUDER_CACHE_SIZE, OccluderCache, VisibilityCache};
pub use config::{CullConfig, OcclusionMethod};
pub use engine::OcclusionEngine;
pub use error::CullError;
pub use matrix::PairMatrix;
pub use occlusion::{cuboid_blocks, frustum_blocks, sphere_blocks};
pub use pipeline::{OcclusionPipeline, Occluders, PassStats};
pub use scheduler::{CullTimer, Scheduler, SchedulerStats};
pub use sink::{Filtered, LocationSink, RecordingSink, TracingSink};

pub fn crate_info() -> &'static str {
    "cornercull-cull v0.1.0"
}
