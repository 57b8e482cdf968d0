#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Calamity director: randomized, level-scoped global events.
//!
//! The eligible pool is shuffled once at construction and consumed in order
//! as spawn progress crosses the trigger thresholds. At most one calamity is
//! ever active; persistent kinds run for a fixed duration before the
//! director expires them, one-shot kinds act immediately and deactivate at
//! once. All randomness lives here, seeded, so the world stays
//! deterministic.

use std::time::Duration;

use lane_defence_core::{
    BattleProgress, CalamityEffect, CalamityKind, Command, DefenderId, DefenderView,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TRIGGER_THRESHOLDS: [f32; 3] = [0.25, 0.5, 0.75];
const CALAMITY_DURATION: Duration = Duration::from_secs(10);

/// Configuration parameters required to construct the director.
#[derive(Clone, Debug)]
pub struct Config {
    pool: Vec<CalamityKind>,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the level pool and seed.
    #[must_use]
    pub fn new(pool: Vec<CalamityKind>, rng_seed: u64) -> Self {
        Self { pool, rng_seed }
    }
}

/// Pure system that triggers, times, and expires calamities.
#[derive(Debug)]
pub struct CalamityDirector {
    pool: Vec<CalamityKind>,
    pool_cursor: usize,
    threshold_cursor: usize,
    active_until: Option<Duration>,
    rng: ChaCha8Rng,
}

impl CalamityDirector {
    /// Creates a new director, shuffling the pool with the seed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let mut pool = config.pool;
        pool.shuffle(&mut rng);
        Self {
            pool,
            pool_cursor: 0,
            threshold_cursor: 0,
            active_until: None,
            rng,
        }
    }

    /// Evaluates expiry and trigger conditions for this tick.
    pub fn handle(
        &mut self,
        progress: &BattleProgress,
        defenders: &DefenderView,
        out: &mut Vec<Command>,
    ) {
        if let Some(until) = self.active_until {
            if progress.clock < until {
                return;
            }
            self.active_until = None;
            out.push(Command::ExpireCalamity);
            return;
        }

        if progress.outcome.is_some()
            || self.pool_cursor >= self.pool.len()
            || self.threshold_cursor >= TRIGGER_THRESHOLDS.len()
            || progress.spawn_progress() < TRIGGER_THRESHOLDS[self.threshold_cursor]
        {
            return;
        }

        let kind = self.pool[self.pool_cursor];
        self.pool_cursor += 1;
        self.threshold_cursor += 1;
        out.push(Command::ActivateCalamity { kind });

        match kind.effect() {
            CalamityEffect::CullShare(share) => {
                let victims = self.select_cull_victims(defenders, share);
                out.push(Command::CullDefenders { defenders: victims });
            }
            CalamityEffect::HostileDamage(_)
            | CalamityEffect::HostileSpeed(_)
            | CalamityEffect::DefenderDamage(_) => {
                self.active_until = Some(progress.clock + CALAMITY_DURATION);
            }
        }
    }

    /// Kind queued for the next trigger, if the pool is not exhausted.
    #[must_use]
    pub fn upcoming(&self) -> Option<CalamityKind> {
        self.pool.get(self.pool_cursor).copied()
    }

    fn select_cull_victims(&mut self, defenders: &DefenderView, share: f32) -> Vec<DefenderId> {
        let mut candidates: Vec<DefenderId> = defenders
            .iter()
            .filter(|defender| !defender.archetype.is_producer())
            .map(|defender| defender.id)
            .collect();
        if candidates.is_empty() {
            return candidates;
        }
        candidates.shuffle(&mut self.rng);
        let count = (candidates.len() as f32 * share).ceil() as usize;
        candidates.truncate(count);
        candidates
    }
}
