//! Shared value types used across the cornercull crates.

mod rng;
mod types;

pub use rng::{RandomSource, SplitMix64, splitmix64};
pub use types::{CharacterId, TeamId, Transform};
