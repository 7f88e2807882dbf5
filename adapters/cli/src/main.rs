#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Robot Rescue game without a renderer.
//!
//! The autopilot plays until the game ends or the tick budget runs out.
//! Snapshots can be streamed to stdout as JSON lines for an external renderer;
//! logs go to stderr.

mod host;
mod leaderboard;
mod settings;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use robot_rescue_system_autopilot::{Autopilot, Config};
use robot_rescue_system_session::Session;
use robot_rescue_world::{query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    host::{HeadlessHost, HostConfig},
    leaderboard::{Leaderboard, DISPLAYED_ENTRIES},
    settings::{LifeLostPolicy, RunConfig, Settings},
};

/// Command-line arguments; each overrides the matching settings-file value.
#[derive(Debug, Parser)]
#[command(name = "robot-rescue", about = "Headless Robot Rescue runner")]
struct Args {
    /// Player name recorded on the leaderboard.
    #[arg(long)]
    name: Option<String>,

    /// Seed for board placement and autopilot fallback.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// TOML settings file supplying defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Leaderboard file to update when the run ends.
    #[arg(long, value_name = "PATH")]
    leaderboard: Option<PathBuf>,

    /// Sleep out each tick interval instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Answer to the pause after a lost life.
    #[arg(long, value_enum)]
    on_life_lost: Option<LifeLostPolicy>,

    /// Write one JSON snapshot per frame to stdout.
    #[arg(long)]
    snapshots: bool,

    /// Enable the area-clear extension.
    #[arg(long)]
    bomb: bool,
}

/// Entry point for the Robot Rescue command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load(path).context("failed to load settings")?,
        None => Settings::default(),
    };
    let config = RunConfig::resolve(&args, settings).context("invalid configuration")?;

    let world = World::new(config.name.clone(), config.rules);
    let autopilot = Autopilot::new(Config::new(config.rules.seed));
    let mut session = Session::new(world, autopilot);

    let stdout = io::stdout();
    let sink = config.snapshots.then(|| stdout.lock());
    let mut host = HeadlessHost::new(
        HostConfig {
            max_ticks: config.max_ticks,
            realtime: config.realtime,
            on_life_lost: config.on_life_lost,
        },
        sink,
    );

    let phase = session.run(&mut host).context("session aborted")?;
    let record = session
        .final_record()
        .unwrap_or_else(|| query::progress(session.world()).record());
    info!(
        ?phase,
        ticks = session.ticks(),
        frames = host.presented(),
        score = record.score,
        level = record.level,
        "run finished"
    );

    let mut leaderboard = Leaderboard::load(&config.leaderboard)?;
    let placement = leaderboard.record(record);
    leaderboard.save(&config.leaderboard)?;

    if placement.new_high_score {
        info!(rank = placement.rank, "new high score");
    } else {
        info!(rank = placement.rank, "run recorded");
    }
    for (index, entry) in leaderboard.top(DISPLAYED_ENTRIES).iter().enumerate() {
        info!(
            rank = index + 1,
            name = %entry.name,
            score = entry.score,
            level = entry.level,
            "leaderboard"
        );
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}
