#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Macrodata Refinement terminal.

mod config;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Headless refinement terminal driven by a scripted player.
#[derive(Debug, Parser)]
#[command(name = "refinement", version, about)]
struct Args {
    /// TOML file with `[terminal]` and `[autoplay]` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for grid generation and the scripted player
    #[arg(long, default_value_t = refinement_world::DEFAULT_SEED)]
    seed: u64,

    /// Upper bound on simulated steps before giving up on the day
    #[arg(long, default_value_t = 10_000)]
    max_steps: usize,

    /// Print the viewport after every step
    #[arg(long)]
    render: bool,
}

/// Entry point for the refinement command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = config::load(args.config.as_deref())?;
    let mut session =
        Session::new(&settings, args.seed).context("failed to build the terminal")?;
    println!("{}", session.banner());

    let report = session.run(args.max_steps, |session| {
        if args.render {
            println!("{}\n", session.frame());
        }
    });

    info!(
        steps = report.steps,
        chunks = report.chunks_applied,
        tiles = report.tiles_cleared,
        scary = report.scary_consumed,
        highlights = report.highlights,
        "session finished"
    );
    match report.day_duration {
        Some(duration) => println!(
            "Day complete: {} files refined in {:.1}s of terminal time.",
            report.files_refined,
            duration.as_secs_f32()
        ),
        None => println!(
            "Day unfinished after {} steps: {} files refined.",
            report.steps, report.files_refined
        ),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
