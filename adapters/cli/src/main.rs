#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a battle headlessly and narrates it.
//!
//! Scripted placements from the level file are submitted before the first
//! tick; after that the loop only relays world events and auto-collects
//! every resource token a producer emits.

mod level;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lane_defence_core::{Command, Event, TokenId, BATTLE_BANNER};
use lane_defence_headless::BattleRunner;

/// Runs a lane defence battle without a renderer.
#[derive(Parser, Debug)]
#[command(name = "lane-defence")]
struct Args {
    /// Level file in TOML format; omit to run the built-in demo level.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Seed for the manifest shuffle and the calamity draws.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Fixed simulation step in milliseconds.
    #[arg(long, default_value_t = 100)]
    dt_ms: u64,

    /// Maximum ticks before the run is abandoned as undecided.
    #[arg(long, default_value_t = 6000)]
    max_ticks: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match &args.level {
        Some(path) => level::load_level(path)
            .with_context(|| format!("loading level from {}", path.display()))?,
        None => level::demo_level().context("building the demo level")?,
    };

    println!("{BATTLE_BANNER}");

    let mut runner =
        BattleRunner::new(level.config, args.seed).context("starting the battle")?;
    for placement in &level.placements {
        runner.submit(Command::PlaceDefender {
            archetype: placement.archetype,
            cell: placement.cell,
        });
    }

    let dt = Duration::from_millis(args.dt_ms);
    let mut uncollected: Vec<TokenId> = Vec::new();
    for _ in 0..args.max_ticks {
        for token in uncollected.drain(..) {
            runner.submit(Command::CollectToken { token });
        }
        for event in runner.tick(dt) {
            report(event, &mut uncollected);
        }
        if runner.outcome().is_some() {
            break;
        }
    }

    let progress = runner.progress();
    match runner.outcome() {
        Some(outcome) => println!("battle over: {outcome:?}"),
        None => println!("battle undecided after {} ticks", args.max_ticks),
    }
    println!(
        "spawned {}/{}, killed {}, escaped {}, neutralized {}, resources {}",
        progress.spawned,
        progress.total,
        progress.killed,
        progress.escaped,
        progress.neutralized,
        progress.resources,
    );
    Ok(())
}

fn report(event: &Event, uncollected: &mut Vec<TokenId>) {
    match event {
        Event::HostileSpawned { archetype, lane, .. } => {
            println!("{archetype:?} entered lane {}", lane.get());
        }
        Event::HostileSlain { .. } => println!("a hostile fell"),
        Event::HostileEscaped { .. } => println!("a hostile escaped off the field"),
        Event::DefenderPlaced { archetype, cell, .. } => {
            println!(
                "{archetype:?} placed at column {}, lane {}",
                cell.column(),
                cell.lane().get()
            );
        }
        Event::PlacementRejected { archetype, reason, .. } => {
            println!("could not place {archetype:?}: {reason:?}");
        }
        Event::DefenderSlain { .. } => println!("a defender was destroyed"),
        Event::DefenderSeized { .. } => println!("a defender was carried off"),
        Event::TokenEmitted { token } => uncollected.push(*token),
        Event::TokenCollected { value, .. } => println!("collected {value} resources"),
        Event::SweeperTriggered { lane } => {
            println!("sweeper cleared lane {}", lane.get());
        }
        Event::CalamityStarted { kind } => {
            println!("calamity! {}: {}", kind.name(), kind.description());
        }
        Event::CalamityEnded { kind } => println!("the {} subsided", kind.name()),
        Event::BattleEnded { outcome } => println!("the battle ended: {outcome:?}"),
        Event::TimeAdvanced { .. } => {}
    }
}
