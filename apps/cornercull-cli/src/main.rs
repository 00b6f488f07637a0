mod scene;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cornercull_common::{SplitMix64, Transform};
use cornercull_cull::{CullConfig, OcclusionEngine, RecordingSink};
use cornercull_tools::{Arena, ArenaSpec, EngineInspector};
use tracing_subscriber::EnvFilter;

use crate::scene::{Action, Scene};

#[derive(Parser)]
#[command(name = "cornercull-cli", about = "Corner-culling occlusion engine tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and engine limits
    Info,
    /// Run a scripted scene and report who saw whom
    Simulate {
        /// Scene file (.yaml/.yml or .json)
        #[arg(short = 'f', long)]
        scene: PathBuf,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Seed for the timer jitter
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Time the engine on a random arena
    Bench {
        #[arg(long, default_value = "500")]
        cuboids: usize,
        #[arg(long, default_value = "10")]
        spheres: usize,
        #[arg(long, default_value = "10")]
        characters: usize,
        #[arg(short, long, default_value = "1000")]
        ticks: u64,
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cornercull-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("cull: {}", cornercull_cull::crate_info());
            println!("tools: {}", cornercull_tools::crate_info());
            println!(
                "bvh: leaf_size={} max_depth={} stack={}",
                cornercull_bvh::DEFAULT_LEAF_SIZE,
                cornercull_bvh::MAX_DEPTH,
                cornercull_bvh::STACK_CAPACITY
            );
            println!("occluder cache: {} per pair", cornercull_cull::OCCLUDER_CACHE_SIZE);
        }
        Commands::Simulate { scene, ticks, seed } => simulate(&Scene::from_path(&scene)?, ticks, seed)?,
        Commands::Bench {
            cuboids,
            spheres,
            characters,
            ticks,
            seed,
        } => {
            let spec = ArenaSpec {
                cuboids,
                spheres,
                characters,
                seed,
                ..ArenaSpec::default()
            };
            bench(&spec, ticks)?;
        }
    }

    Ok(())
}

fn simulate(scene: &Scene, ticks: u64, seed: u64) -> anyhow::Result<()> {
    let mut world = scene.world(seed);
    let mut engine = OcclusionEngine::new(
        scene.config.clone(),
        scene.cuboids(),
        scene.spheres.clone(),
        SplitMix64::new(seed),
    )?;
    let mut sink = RecordingSink::new();

    println!(
        "Simulating {} characters, {} cuboids, {} spheres for {ticks} ticks",
        world.character_count(),
        scene.cuboids.len(),
        scene.spheres.len()
    );

    for tick in 0..ticks {
        for action in scene.events_at(tick) {
            match *action {
                Action::Kill { slot } => world.kill(slot)?,
                Action::Respawn { slot, position } => {
                    world.respawn(slot, Transform::from_position(position))?
                }
                Action::Move { slot, position } => {
                    let yawed = world
                        .get(slot)
                        .map(|c| Transform { position, ..c.transform })
                        .with_context(|| format!("no character in slot {slot}"))?;
                    world.set_transform(slot, yawed)?
                }
                Action::RemoveCuboid { index } => {
                    engine.disable_cuboid(index);
                }
            }
            tracing::info!(tick, ?action, "scripted event");
        }
        engine.tick(world.characters(), &mut sink);
        world.step();
    }

    let mut totals: Vec<_> = sink.totals().into_iter().collect();
    totals.sort_unstable();
    println!("Reveals (observer -> target: ticks visible):");
    for ((observer, target), count) in totals {
        println!("  {observer} -> {target}: {count}");
    }
    println!("{}", EngineInspector::summary(&engine));
    Ok(())
}

fn bench(spec: &ArenaSpec, ticks: u64) -> anyhow::Result<()> {
    let mut arena = Arena::generate(spec);
    let mut engine = OcclusionEngine::new(
        CullConfig::default(),
        std::mem::take(&mut arena.cuboids),
        std::mem::take(&mut arena.spheres),
        SplitMix64::new(spec.seed),
    )?;
    let mut walk = SplitMix64::new(spec.seed ^ 0x5eed);
    let mut reports = 0u64;

    let start = Instant::now();
    for _ in 0..ticks {
        engine.tick(arena.world.characters(), &mut |_, _| reports += 1);
        arena.wander(&mut walk, 20.0);
        arena.world.step();
    }
    let elapsed = start.elapsed();

    let stats = engine.scheduler().stats();
    println!(
        "Bench: {} cuboids, {} spheres, {} characters, {ticks} ticks",
        spec.cuboids, spec.spheres, spec.characters
    );
    println!(
        "  wall time {elapsed:?} ({:?}/tick), {reports} reports",
        per_tick(elapsed, ticks)
    );
    println!(
        "  cull passes {} total {:?}, rolling avg {:?}, rolling max {:?}",
        stats.cull_passes, stats.total_time, stats.rolling_average, stats.rolling_max
    );
    println!("{}", EngineInspector::summary(&engine));
    Ok(())
}

/// Average time per tick; zero ticks count as one.
fn per_tick(elapsed: Duration, ticks: u64) -> Duration {
    elapsed.div_f64(ticks.max(1) as f64)
}
