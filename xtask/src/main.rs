use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

const SCENES: &str = "apps/cornercull-cli/scenes";

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for cornercull")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, tests, then every sample scene
    Check,
    /// cargo fmt --check
    Fmt,
    /// clippy with warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Run the occlusion benchmark in release mode
    Bench,
    /// Simulate every sample scene through the CLI
    Scenes,
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test()?;
            scenes()?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Bench => cargo("bench", &["bench", "-p", "cornercull-cull", "--bench", "bench_cull"])?,
        Commands::Scenes => scenes()?,
    }
    Ok(())
}

fn cargo(what: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("spawning cargo {what}"))?;
    if !status.success() {
        bail!("cargo {what} failed");
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo("clippy", &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
}

fn test() -> Result<()> {
    cargo("test", &["test", "--workspace"])
}

fn scenes() -> Result<()> {
    let mut found = 0;
    for entry in std::fs::read_dir(Path::new(SCENES)).with_context(|| format!("listing {SCENES}"))? {
        let path = entry?.path();
        let Some(path) = path.to_str().filter(|p| p.ends_with(".yaml") || p.ends_with(".json")) else {
            continue;
        };
        cargo(
            "run (scene)",
            &["run", "-q", "-p", "cornercull-cli", "--", "simulate", "--scene", path, "--ticks", "200"],
        )?;
        found += 1;
    }
    if found == 0 {
        bail!("no scenes under {SCENES}");
    }
    Ok(())
}
