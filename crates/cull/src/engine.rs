use std::time::{Duration, Instant};

use cornercull_common::{RandomSource, SplitMix64};
use cornercull_geom::{CharacterBounds, Cuboid, Sphere};
use cornercull_kernel::Character;

use crate::bundle::BundleGenerator;
use crate::cache::VisibilityCache;
use crate::config::CullConfig;
use crate::error::CullError;
use crate::pipeline::{OcclusionPipeline, Occluders, PassStats};
use crate::scheduler::Scheduler;
use crate::sink::LocationSink;

/// Owns all tick-to-tick occlusion state and runs the per-tick update.
///
/// Character slots are indices into the slice passed to [`tick`](Self::tick);
/// they must stay stable across ticks. The slice may grow between ticks.
pub struct OcclusionEngine<R: RandomSource = SplitMix64> {
    config: CullConfig,
    generator: BundleGenerator,
    occluders: Occluders,
    cache: VisibilityCache,
    bounds: Vec<Option<CharacterBounds>>,
    scheduler: Scheduler,
    rng: R,
    tick: u64,
    last_pass: PassStats,
}

impl<R: RandomSource> OcclusionEngine<R> {
    /// Validate `config`, build the BVH over `cuboids` and start at tick 0.
    pub fn new(config: CullConfig, cuboids: Vec<Cuboid>, spheres: Vec<Sphere>, rng: R) -> Result<Self, CullError> {
        config.validate()?;
        let occluders = Occluders::new(cuboids, spheres, config.bvh_leaf_size);
        tracing::info!(
            cuboids = occluders.cuboids().len(),
            spheres = occluders.spheres().len(),
            bvh_nodes = occluders.bvh().nodes().len(),
            bvh_depth = occluders.bvh().depth(),
            "occlusion engine ready"
        );
        Ok(Self {
            generator: BundleGenerator::new(&config),
            scheduler: Scheduler::new(&config),
            occluders,
            cache: VisibilityCache::default(),
            bounds: Vec::new(),
            rng,
            tick: 0,
            last_pass: PassStats::default(),
            config,
        })
    }

    /// Advance one tick: cull if due, then report every visible pair.
    pub fn tick(&mut self, characters: &[Character], sink: &mut impl LocationSink) {
        self.cache.grow(characters.len());

        let culled = self.scheduler.should_cull(self.tick);
        let elapsed = if culled {
            self.cull(characters)
        } else {
            Duration::ZERO
        };
        self.scheduler.record(elapsed, culled);

        self.report(characters, sink);
        self.tick += 1;
    }

    fn cull(&mut self, characters: &[Character]) -> Duration {
        let _span = tracing::info_span!("cull_pass", tick = self.tick).entered();
        let start = Instant::now();

        self.generator.refresh_bounds(characters, &mut self.bounds);
        let batch = self.generator.populate(characters, &self.bounds, &mut self.cache);

        let mut stats = PassStats {
            fail_open: batch.fail_open.len(),
            ..PassStats::default()
        };
        let pipeline = OcclusionPipeline::new(
            &self.occluders,
            &self.bounds,
            self.config.occlusion_method,
            self.config.use_bvh,
            self.tick,
        );
        let visible = pipeline.run(batch.queue, &mut self.cache, &mut stats);
        stats.visible = visible.len() + batch.fail_open.len();

        let increment = self.scheduler.timer_increment();
        let pairs = visible.iter().map(|b| (b.player, b.enemy)).chain(batch.fail_open);
        for (player, enemy) in pairs {
            let jitter = self.rng.below(self.config.timer_jitter);
            self.cache.set_timer(player, enemy, increment + jitter);
        }

        tracing::debug!(
            bundles = stats.bundles,
            fail_open = stats.fail_open,
            cache = stats.culled_by_cache,
            spheres = stats.culled_by_spheres,
            cuboids = stats.culled_by_cuboids,
            visible = stats.visible,
            "cull pass complete"
        );
        self.last_pass = stats;
        start.elapsed()
    }

    fn report(&self, characters: &[Character], sink: &mut impl LocationSink) {
        for (i, observer) in characters.iter().enumerate() {
            if !observer.alive {
                continue;
            }
            for (j, target) in characters.iter().enumerate() {
                if i != j && target.alive && self.cache.timer(i, j) > 0 {
                    sink.report(i, j);
                }
            }
        }
    }

    /// Stop cuboid `index` from occluding from the next pass on, and drop
    /// it from every pair's occluder cache.
    pub fn disable_cuboid(&mut self, index: u32) -> bool {
        if !self.occluders.disable(index) {
            return false;
        }
        let forgotten = self.cache.forget_occluder(index);
        tracing::debug!(index, forgotten, "cuboid disabled");
        true
    }

    pub fn config(&self) -> &CullConfig {
        &self.config
    }

    pub fn occluders(&self) -> &Occluders {
        &self.occluders
    }

    pub fn cache(&self) -> &VisibilityCache {
        &self.cache
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Stage counts of the most recent cull pass.
    pub fn last_pass(&self) -> PassStats {
        self.last_pass
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn timer(&self, player: usize, enemy: usize) -> u32 {
        self.cache.timer(player, enemy)
    }

    /// Bounds computed by the most recent cull pass.
    pub fn bounds(&self) -> &[Option<CharacterBounds>] {
        &self.bounds
    }
}
