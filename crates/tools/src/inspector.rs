use std::time::Duration;

use cornercull_common::RandomSource;
use cornercull_cull::OcclusionEngine;

/// Engine inspector for developer tooling.
///
/// Provides read-only queries against occlusion state for debugging,
/// profiling, and the CLI.
pub struct EngineInspector;

impl EngineInspector {
    /// Produce a summary of the engine state.
    pub fn summary<R: RandomSource>(engine: &OcclusionEngine<R>) -> EngineSummary {
        let occluders = engine.occluders();
        let stats = engine.scheduler().stats();
        EngineSummary {
            tick: engine.current_tick(),
            cuboids: occluders.cuboids().len(),
            active_cuboids: occluders.active_count(),
            spheres: occluders.spheres().len(),
            bvh_nodes: occluders.bvh().nodes().len(),
            bvh_depth: occluders.bvh().depth(),
            visible_pairs: engine.cache().visible_pairs().count(),
            cached_occluders: engine.cache().cached_count(),
            timer_increment: stats.timer_increment,
            cull_passes: stats.cull_passes,
            average_cull: stats.rolling_average,
            rolling_max_cull: stats.rolling_max,
        }
    }

    /// Timer and cached occluders of one ordered pair.
    pub fn inspect_pair<R: RandomSource>(engine: &OcclusionEngine<R>, player: usize, enemy: usize) -> Option<PairInfo> {
        let occluders = engine.cache().occluders(player, enemy)?;
        Some(PairInfo {
            player,
            enemy,
            timer: engine.timer(player, enemy),
            cached_cuboids: occluders.cuboids(),
        })
    }
}

/// Summary of engine state for the inspector.
#[derive(Debug, Clone)]
pub struct EngineSummary {
    pub tick: u64,
    pub cuboids: usize,
    pub active_cuboids: usize,
    pub spheres: usize,
    pub bvh_nodes: usize,
    pub bvh_depth: usize,
    pub visible_pairs: usize,
    pub cached_occluders: usize,
    pub timer_increment: u32,
    pub cull_passes: u64,
    pub average_cull: Duration,
    pub rolling_max_cull: Duration,
}

impl std::fmt::Display for EngineSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Engine: tick={} passes={} visible_pairs={} cached_occluders={} timer_increment={}",
            self.tick, self.cull_passes, self.visible_pairs, self.cached_occluders, self.timer_increment
        )?;
        writeln!(
            f,
            "Occluders: cuboids={} (active {}) spheres={} bvh_nodes={} bvh_depth={}",
            self.cuboids, self.active_cuboids, self.spheres, self.bvh_nodes, self.bvh_depth
        )?;
        write!(
            f,
            "Cull time: avg={:?} rolling_max={:?}",
            self.average_cull, self.rolling_max_cull
        )
    }
}

/// Visibility state of one ordered pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairInfo {
    pub player: usize,
    pub enemy: usize,
    pub timer: u32,
    pub cached_cuboids: Vec<u32>,
}

impl std::fmt::Display for PairInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pair [{} -> {}] timer={} cached={:?}",
            self.player, self.enemy, self.timer, self.cached_cuboids
        )
    }
}
