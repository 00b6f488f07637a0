//! Developer tooling: engine inspector and random arenas for profiling.
//!
//! # Invariants
//! - Inspection is read-only; nothing here mutates engine state.

mod arena;
mod inspector;

pub use arena::{Arena, ArenaSpec};
pub use inspector::{EngineInspector, EngineSummary, PairInfo};

pub fn crate_info() -> &'static str {
    "cornercull-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
