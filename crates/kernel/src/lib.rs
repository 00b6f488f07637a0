//! World Kernel: authoritative character state and simulation stepping.
//!
//! # Invariants
//! - A character's slot is assigned at registration and never reused or
//!   moved, so per-pair matrices can index by slot.
//! - Death and respawn flip the alive flag; they never remove a slot.

pub mod world;

pub use world::{Character, World, WorldError};
