#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Aura recomputation system for damage-buffing support defenders.
//!
//! Every tick the factor table is rebuilt from scratch: each defender starts
//! at `1.0` and multiplies in the buff value of every living aura source
//! whose radius covers it. Overlapping auras compose multiplicatively, so the
//! result is independent of iteration order. The whole table is submitted as
//! a single command; the world replaces its factors wholesale.

use lane_defence_core::{Command, DefenderArchetype, DefenderView};

/// Pure system that recomputes the aura factor table.
#[derive(Debug, Default)]
pub struct Aura;

impl Aura {
    /// Creates a new aura system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Rebuilds the factor table and submits it as one command.
    pub fn handle(&mut self, defenders: &DefenderView, out: &mut Vec<Command>) {
        let mut factors = Vec::new();
        for defender in defenders.iter() {
            let mut factor = 1.0;
            for source in defenders.iter() {
                if source.archetype == DefenderArchetype::Herald
                    && source.id != defender.id
                    && source.position.distance_to(defender.position) <= source.radius
                {
                    factor *= source.buff_factor;
                }
            }
            factors.push((defender.id, factor));
        }
        out.push(Command::ApplyAuras { factors });
    }
}
