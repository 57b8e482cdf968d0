#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hostile behaviour system driving per-archetype state machine transitions.
//!
//! The world integrates the per-tick consequences of each phase (movement,
//! strike cadence, leap trajectories, escape motion); this system only
//! decides the transitions and submits them as commands. Stale decisions are
//! harmless: the world validates every command against current liveness.

use std::collections::HashSet;
use std::time::Duration;

use lane_defence_core::{
    Command, DefenderSnapshot, DefenderView, Event, HostileArchetype, HostileId, HostilePhase,
    HostileSnapshot, HostileView, CONTACT_RANGE, GRAB_RANGE, LEAP_CLEARANCE,
};

const CONTACT_SLACK: f32 = 0.5;

/// Pure system that emits hostile state machine transition commands.
#[derive(Debug, Default)]
pub struct HostileBehaviour {
    thieves: HashSet<HostileId>,
}

impl HostileBehaviour {
    /// Creates a new hostile behaviour system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes events and snapshots to emit transition commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        hostiles: &HostileView,
        defenders: &DefenderView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::HostileSlain { hostile } | Event::HostileEscaped { hostile } => {
                    let _ = self.thieves.remove(hostile);
                }
                _ => {}
            }
        }

        for hostile in hostiles.iter() {
            if hostile.melee_fallback {
                drive_melee(hostile, defenders, out);
                continue;
            }
            match hostile.archetype {
                HostileArchetype::Walker => drive_melee(hostile, defenders, out),
                HostileArchetype::Spitter => drive_spitter(hostile, defenders, out),
                HostileArchetype::Leaper => drive_leaper(hostile, defenders, out),
                HostileArchetype::Snatcher => drive_snatcher(hostile, defenders, out),
                HostileArchetype::Looter => self.drive_looter(hostile, defenders, out),
            }
        }
    }

    fn drive_looter(
        &mut self,
        hostile: &HostileSnapshot,
        defenders: &DefenderView,
        out: &mut Vec<Command>,
    ) {
        match hostile.phase {
            HostilePhase::Advancing => match nearest_producer(hostile, defenders) {
                Some(producer) => out.push(Command::Hunt {
                    hostile: hostile.id,
                    target: producer.id,
                }),
                None if self.thieves.contains(&hostile.id) => {
                    out.push(Command::Flee {
                        hostile: hostile.id,
                    });
                }
                None => out.push(Command::AdoptMeleeFallback {
                    hostile: hostile.id,
                }),
            },
            HostilePhase::Hunting { target } => {
                let Some(victim) = defenders.get(target) else {
                    return;
                };
                if !victim.archetype.is_producer() {
                    return;
                }
                if hostile.position.distance_to(victim.position) <= GRAB_RANGE {
                    out.push(Command::StealProducer {
                        hostile: hostile.id,
                        victim: target,
                    });
                    let _ = self.thieves.insert(hostile.id);
                }
            }
            _ => {}
        }
    }
}

fn drive_melee(hostile: &HostileSnapshot, defenders: &DefenderView, out: &mut Vec<Command>) {
    if hostile.phase != HostilePhase::Advancing {
        return;
    }
    if let Some(target) = contact_target(hostile, defenders) {
        out.push(Command::BeginStrike {
            hostile: hostile.id,
            target: target.id,
        });
    }
}

fn drive_spitter(hostile: &HostileSnapshot, defenders: &DefenderView, out: &mut Vec<Command>) {
    match hostile.phase {
        HostilePhase::Advancing => {
            if lane_ahead_occupied(hostile, defenders) {
                out.push(Command::HaltAndVolley {
                    hostile: hostile.id,
                });
            }
        }
        HostilePhase::Volleying => {
            if !lane_ahead_occupied(hostile, defenders) {
                out.push(Command::ResumeAdvance {
                    hostile: hostile.id,
                });
            } else if hostile.ready_in == Duration::ZERO {
                out.push(Command::FireHostileBolt {
                    hostile: hostile.id,
                });
            }
        }
        _ => {}
    }
}

fn drive_leaper(hostile: &HostileSnapshot, defenders: &DefenderView, out: &mut Vec<Command>) {
    if hostile.phase != HostilePhase::Advancing {
        return;
    }
    if hostile.leapt {
        // The single leap is spent; the leaper fights like a walker now.
        drive_melee(hostile, defenders, out);
        return;
    }
    if let Some(blocker) = contact_target(hostile, defenders) {
        out.push(Command::BeginLeap {
            hostile: hostile.id,
            clearance_x: blocker.position.x - LEAP_CLEARANCE,
        });
    }
}

fn drive_snatcher(hostile: &HostileSnapshot, defenders: &DefenderView, out: &mut Vec<Command>) {
    match hostile.phase {
        HostilePhase::Advancing => match highest_damage_target(defenders) {
            Some(target) => out.push(Command::Hunt {
                hostile: hostile.id,
                target: target.id,
            }),
            // No abduction candidate: behave like a walker until one appears.
            None => drive_melee(hostile, defenders, out),
        },
        HostilePhase::Hunting { target } => {
            let Some(victim) = defenders.get(target) else {
                return;
            };
            if hostile.position.distance_to(victim.position) <= GRAB_RANGE {
                out.push(Command::GrabDefender {
                    hostile: hostile.id,
                    victim: target,
                });
            }
        }
        _ => {}
    }
}

fn contact_target<'view>(
    hostile: &HostileSnapshot,
    defenders: &'view DefenderView,
) -> Option<&'view DefenderSnapshot> {
    let mut best: Option<(f32, &DefenderSnapshot)> = None;
    for defender in defenders.iter() {
        if defender.cell.lane() != hostile.lane || defender.position.x >= hostile.position.x {
            continue;
        }
        let gap = hostile.position.x - defender.position.x;
        if gap > CONTACT_RANGE + CONTACT_SLACK {
            continue;
        }
        match best {
            Some((closest, _)) if gap >= closest => {}
            _ => best = Some((gap, defender)),
        }
    }
    best.map(|(_, defender)| defender)
}

fn lane_ahead_occupied(hostile: &HostileSnapshot, defenders: &DefenderView) -> bool {
    defenders.iter().any(|defender| {
        defender.cell.lane() == hostile.lane && defender.position.x < hostile.position.x
    })
}

fn highest_damage_target(defenders: &DefenderView) -> Option<&DefenderSnapshot> {
    let mut best: Option<&DefenderSnapshot> = None;
    for defender in defenders.iter() {
        if defender.archetype.is_producer() || defender.damage <= 0.0 {
            continue;
        }
        match best {
            Some(current) if defender.damage <= current.damage => {}
            _ => best = Some(defender),
        }
    }
    best
}

fn nearest_producer<'view>(
    hostile: &HostileSnapshot,
    defenders: &'view DefenderView,
) -> Option<&'view DefenderSnapshot> {
    let mut best: Option<(f32, &DefenderSnapshot)> = None;
    for defender in defenders.iter() {
        if !defender.archetype.is_producer() {
            continue;
        }
        let distance = hostile.position.distance_to(defender.position);
        match best {
            Some((closest, _)) if distance >= closest => {}
            _ => best = Some((distance, defender)),
        }
    }
    best.map(|(_, defender)| defender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{
        DefenderArchetype, DefenderId, FieldPoint, GridCell, Lane, CELL_LENGTH,
    };

    fn defender(
        id: u32,
        archetype: DefenderArchetype,
        column: u32,
        lane: u32,
        damage: f32,
    ) -> DefenderSnapshot {
        let cell = GridCell::new(column, Lane::new(lane));
        DefenderSnapshot {
            id: DefenderId::new(id),
            archetype,
            cell,
            position: cell.center(),
            health: 100.0,
            max_health: 100.0,
            damage,
            radius: 0.0,
            buff_factor: 1.0,
            buff_multiplier: 1.0,
            calamity_factor: 1.0,
            ready_in: Duration::ZERO,
            heal_pool: 0.0,
            being_eaten: false,
            upgraded: false,
        }
    }

    fn hostile(
        id: u32,
        archetype: HostileArchetype,
        lane: u32,
        x: f32,
        phase: HostilePhase,
    ) -> HostileSnapshot {
        HostileSnapshot {
            id: HostileId::new(id),
            archetype,
            lane: Lane::new(lane),
            position: FieldPoint::new(x, (lane as f32 + 0.5) * CELL_LENGTH),
            health: 100.0,
            max_health: 100.0,
            damage: 12.0,
            phase,
            ready_in: Duration::ZERO,
            slowed: false,
            leapt: false,
            melee_fallback: false,
        }
    }

    fn decide(
        system: &mut HostileBehaviour,
        hostiles: Vec<HostileSnapshot>,
        defenders: Vec<DefenderSnapshot>,
    ) -> Vec<Command> {
        let mut out = Vec::new();
        system.handle(
            &[],
            &HostileView::from_snapshots(hostiles),
            &DefenderView::from_snapshots(defenders),
            &mut out,
        );
        out
    }

    #[test]
    fn walker_strikes_the_defender_it_is_pressed_against() {
        let mut system = HostileBehaviour::new();
        let blocker = defender(0, DefenderArchetype::Gunner, 2, 1, 25.0);
        let edge = blocker.position.x + CONTACT_RANGE;
        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Walker, 1, edge, HostilePhase::Advancing)],
            vec![blocker],
        );
        assert_eq!(
            commands,
            vec![Command::BeginStrike {
                hostile: HostileId::new(0),
                target: DefenderId::new(0),
            }]
        );
    }

    #[test]
    fn walker_ignores_defenders_outside_contact_or_lane() {
        let mut system = HostileBehaviour::new();
        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Walker, 1, 500.0, HostilePhase::Advancing)],
            vec![
                defender(0, DefenderArchetype::Gunner, 2, 1, 25.0),
                defender(1, DefenderArchetype::Gunner, 5, 2, 25.0),
            ],
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn spitter_halts_volleys_and_resumes() {
        let mut system = HostileBehaviour::new();
        let blocker = defender(0, DefenderArchetype::Gunner, 2, 1, 25.0);

        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Spitter, 1, 600.0, HostilePhase::Advancing)],
            vec![blocker.clone()],
        );
        assert_eq!(
            commands,
            vec![Command::HaltAndVolley {
                hostile: HostileId::new(0)
            }]
        );

        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Spitter, 1, 600.0, HostilePhase::Volleying)],
            vec![blocker],
        );
        assert_eq!(
            commands,
            vec![Command::FireHostileBolt {
                hostile: HostileId::new(0)
            }]
        );

        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Spitter, 1, 600.0, HostilePhase::Volleying)],
            Vec::new(),
        );
        assert_eq!(
            commands,
            vec![Command::ResumeAdvance {
                hostile: HostileId::new(0)
            }]
        );
    }

    #[test]
    fn spitter_waits_for_its_volley_cadence() {
        let mut system = HostileBehaviour::new();
        let mut shooter =
            hostile(0, HostileArchetype::Spitter, 1, 600.0, HostilePhase::Volleying);
        shooter.ready_in = Duration::from_millis(400);
        let commands = decide(
            &mut system,
            vec![shooter],
            vec![defender(0, DefenderArchetype::Gunner, 2, 1, 25.0)],
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn leaper_vaults_once_then_fights_in_melee() {
        let mut system = HostileBehaviour::new();
        let blocker = defender(0, DefenderArchetype::Gunner, 2, 1, 25.0);
        let edge = blocker.position.x + CONTACT_RANGE;

        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Leaper, 1, edge, HostilePhase::Advancing)],
            vec![blocker.clone()],
        );
        assert_eq!(
            commands,
            vec![Command::BeginLeap {
                hostile: HostileId::new(0),
                clearance_x: blocker.position.x - LEAP_CLEARANCE,
            }]
        );

        let mut landed = hostile(0, HostileArchetype::Leaper, 1, edge, HostilePhase::Advancing);
        landed.leapt = true;
        let commands = decide(&mut system, vec![landed], vec![blocker]);
        assert_eq!(
            commands,
            vec![Command::BeginStrike {
                hostile: HostileId::new(0),
                target: DefenderId::new(0),
            }]
        );
    }

    #[test]
    fn snatcher_hunts_the_highest_damage_non_producer() {
        let mut system = HostileBehaviour::new();
        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Snatcher, 1, 600.0, HostilePhase::Advancing)],
            vec![
                defender(0, DefenderArchetype::Gunner, 2, 1, 25.0),
                defender(1, DefenderArchetype::Mortar, 3, 2, 60.0),
                defender(2, DefenderArchetype::Harvester, 4, 1, 0.0),
            ],
        );
        assert_eq!(
            commands,
            vec![Command::Hunt {
                hostile: HostileId::new(0),
                target: DefenderId::new(1),
            }]
        );
    }

    #[test]
    fn snatcher_grabs_within_range_and_walks_without_targets() {
        let mut system = HostileBehaviour::new();
        let victim = defender(0, DefenderArchetype::Gunner, 2, 1, 25.0);
        let mut hunter =
            hostile(0, HostileArchetype::Snatcher, 1, 0.0, HostilePhase::Hunting {
                target: DefenderId::new(0),
            });
        hunter.position = FieldPoint::new(victim.position.x + 10.0, victim.position.y);
        let commands = decide(&mut system, vec![hunter], vec![victim.clone()]);
        assert_eq!(
            commands,
            vec![Command::GrabDefender {
                hostile: HostileId::new(0),
                victim: DefenderId::new(0),
            }]
        );

        // Only a producer on the field: fall back to walker behaviour,
        // reversibly, and eat whatever blocks the lane.
        let producer = defender(1, DefenderArchetype::Harvester, 2, 1, 0.0);
        let edge = producer.position.x + CONTACT_RANGE;
        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Snatcher, 1, edge, HostilePhase::Advancing)],
            vec![producer],
        );
        assert_eq!(
            commands,
            vec![Command::BeginStrike {
                hostile: HostileId::new(0),
                target: DefenderId::new(1),
            }]
        );
    }

    #[test]
    fn looter_hunts_the_nearest_producer_and_flees_after_theft() {
        let mut system = HostileBehaviour::new();
        let near = defender(0, DefenderArchetype::Harvester, 6, 1, 0.0);
        let far = defender(1, DefenderArchetype::Harvester, 1, 1, 0.0);

        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Looter, 1, 600.0, HostilePhase::Advancing)],
            vec![near.clone(), far],
        );
        assert_eq!(
            commands,
            vec![Command::Hunt {
                hostile: HostileId::new(0),
                target: DefenderId::new(0),
            }]
        );

        let mut thief = hostile(0, HostileArchetype::Looter, 1, 0.0, HostilePhase::Hunting {
            target: DefenderId::new(0),
        });
        thief.position = FieldPoint::new(near.position.x + 5.0, near.position.y);
        let commands = decide(&mut system, vec![thief], vec![near]);
        assert_eq!(
            commands,
            vec![Command::StealProducer {
                hostile: HostileId::new(0),
                victim: DefenderId::new(0),
            }]
        );

        // Nothing left to steal: the thief leaves with its loot.
        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Looter, 1, 300.0, HostilePhase::Advancing)],
            Vec::new(),
        );
        assert_eq!(
            commands,
            vec![Command::Flee {
                hostile: HostileId::new(0)
            }]
        );
    }

    #[test]
    fn looter_without_producers_adopts_melee_fallback() {
        let mut system = HostileBehaviour::new();
        let commands = decide(
            &mut system,
            vec![hostile(0, HostileArchetype::Looter, 1, 600.0, HostilePhase::Advancing)],
            vec![defender(0, DefenderArchetype::Gunner, 2, 1, 25.0)],
        );
        assert_eq!(
            commands,
            vec![Command::AdoptMeleeFallback {
                hostile: HostileId::new(0)
            }]
        );

        let mut demoted = hostile(0, HostileArchetype::Looter, 1, 600.0, HostilePhase::Advancing);
        demoted.melee_fallback = true;
        let commands = decide(
            &mut system,
            vec![demoted],
            vec![defender(0, DefenderArchetype::Harvester, 2, 1, 0.0)],
        );
        assert!(commands.is_empty());
    }
}
