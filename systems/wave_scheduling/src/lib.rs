#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduling system that drains the level manifest.

use std::time::Duration;

use lane_defence_core::{BattleProgress, Command, Event, WaveEntry};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SPAWN_COOLDOWN: Duration = Duration::from_millis(2800);
const FINAL_WAVE_COOLDOWN: Duration = Duration::from_millis(1100);
const FINAL_WAVE_THRESHOLD: f32 = 0.6;

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    manifest: Vec<WaveEntry>,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the level manifest and seed.
    #[must_use]
    pub fn new(manifest: Vec<WaveEntry>, rng_seed: u64) -> Self {
        Self { manifest, rng_seed }
    }
}

/// Pure system that deterministically emits hostile spawn commands.
///
/// The manifest is shuffled exactly once at construction; entries are then
/// consumed front to back on the active cadence. Crossing the final-wave
/// threshold swaps in the shorter cadence, one-way.
#[derive(Debug)]
pub struct WaveScheduling {
    queue: Vec<WaveEntry>,
    cursor: usize,
    accumulator: Duration,
    final_wave: bool,
}

impl WaveScheduling {
    /// Creates a new scheduler, shuffling the manifest with the seed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut queue = config.manifest;
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        queue.shuffle(&mut rng);
        Self {
            queue,
            cursor: 0,
            accumulator: Duration::ZERO,
            final_wave: false,
        }
    }

    /// Consumes tick events and emits spawn commands on the active cadence.
    pub fn handle(
        &mut self,
        events: &[Event],
        progress: &BattleProgress,
        out: &mut Vec<Command>,
    ) {
        if progress.outcome.is_some() || self.cursor >= self.queue.len() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }
        if accumulated.is_zero() {
            return;
        }
        self.accumulator = self.accumulator.saturating_add(accumulated);

        while self.cursor < self.queue.len() {
            self.update_final_wave();
            let cooldown = self.active_cooldown();
            if self.accumulator < cooldown {
                break;
            }
            self.accumulator -= cooldown;
            let entry = self.queue[self.cursor];
            self.cursor += 1;
            out.push(Command::SpawnHostile {
                archetype: entry.archetype,
                lane: entry.lane,
            });
        }
    }

    /// Fraction of the manifest handed to the world so far.
    #[must_use]
    pub fn spawn_progress(&self) -> f32 {
        if self.queue.is_empty() {
            return 0.0;
        }
        self.cursor as f32 / self.queue.len() as f32
    }

    /// Reports whether the shorter final-wave cadence took over.
    #[must_use]
    pub fn final_wave(&self) -> bool {
        self.final_wave
    }

    /// Number of manifest entries not yet handed to the world.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len() - self.cursor
    }

    fn update_final_wave(&mut self) {
        if !self.final_wave && self.spawn_progress() >= FINAL_WAVE_THRESHOLD {
            self.final_wave = true;
        }
    }

    fn active_cooldown(&self) -> Duration {
        if self.final_wave {
            FINAL_WAVE_COOLDOWN
        } else {
            SPAWN_COOLDOWN
        }
    }
}
