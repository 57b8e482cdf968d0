#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Defender behaviour system driving each archetype's update routine.
//!
//! Cooldown gating is read from the snapshots (`ready_in`) and re-checked by
//! the world, so a request racing a cooldown is a silent no-op rather than a
//! double fire. A defender with a melee attacker locked onto it takes no
//! action at all.

use std::time::Duration;

use lane_defence_core::{
    Command, DefenderArchetype, DefenderSnapshot, DefenderView, HostileSnapshot, HostileView,
    CONTACT_RANGE,
};

/// Pure system that emits defender action commands.
#[derive(Debug, Default)]
pub struct DefenderBehaviour;

impl DefenderBehaviour {
    /// Creates a new defender behaviour system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes snapshots to emit one action per ready defender.
    pub fn handle(
        &mut self,
        defenders: &DefenderView,
        hostiles: &HostileView,
        out: &mut Vec<Command>,
    ) {
        for defender in defenders.iter() {
            if defender.being_eaten {
                continue;
            }
            match defender.archetype {
                DefenderArchetype::Gunner | DefenderArchetype::Chiller => {
                    if defender.ready_in == Duration::ZERO
                        && lane_target_exists(defender, hostiles)
                    {
                        out.push(Command::FireProjectile {
                            defender: defender.id,
                        });
                    }
                }
                DefenderArchetype::Lancer => {
                    if defender.ready_in == Duration::ZERO
                        && lane_target_exists(defender, hostiles)
                    {
                        out.push(Command::FirePiercingWave {
                            defender: defender.id,
                        });
                    }
                }
                DefenderArchetype::Mortar => {
                    if defender.ready_in == Duration::ZERO {
                        if let Some(anchor) = healthiest_hostile(hostiles) {
                            out.push(Command::DetonateBurst {
                                defender: defender.id,
                                center: anchor.position,
                            });
                        }
                    }
                }
                DefenderArchetype::Harvester => {
                    if defender.ready_in == Duration::ZERO {
                        out.push(Command::ProduceToken {
                            defender: defender.id,
                        });
                    }
                }
                DefenderArchetype::Herald => {}
                DefenderArchetype::Mender => {
                    if defender.ready_in == Duration::ZERO && defender.heal_pool > 0.0 {
                        if let Some(ally) = most_wounded_ally(defender, defenders) {
                            out.push(Command::HealAlly {
                                healer: defender.id,
                                ally: ally.id,
                            });
                        }
                    }
                }
                DefenderArchetype::Charger => {
                    if let Some(objective) = nearest_hostile(defender, hostiles) {
                        let distance = defender.position.distance_to(objective.position);
                        if distance <= CONTACT_RANGE {
                            out.push(Command::DetonateCharger {
                                defender: defender.id,
                            });
                        } else {
                            out.push(Command::SetChargerObjective {
                                defender: defender.id,
                                hostile: objective.id,
                            });
                        }
                    }
                }
            }
        }
    }
}

fn lane_target_exists(defender: &DefenderSnapshot, hostiles: &HostileView) -> bool {
    hostiles.iter().any(|hostile| {
        hostile.lane == defender.cell.lane() && hostile.position.x >= defender.position.x
    })
}

fn healthiest_hostile(hostiles: &HostileView) -> Option<&HostileSnapshot> {
    let mut best: Option<&HostileSnapshot> = None;
    for hostile in hostiles.iter() {
        match best {
            Some(current) if hostile.health <= current.health => {}
            _ => best = Some(hostile),
        }
    }
    best
}

fn most_wounded_ally<'view>(
    healer: &DefenderSnapshot,
    defenders: &'view DefenderView,
) -> Option<&'view DefenderSnapshot> {
    let mut best: Option<(f32, &DefenderSnapshot)> = None;
    for ally in defenders.iter() {
        if ally.id == healer.id
            || ally.health >= ally.max_health
            || healer.position.distance_to(ally.position) > healer.radius
        {
            continue;
        }
        let fraction = ally.health / ally.max_health;
        match best {
            Some((lowest, _)) if fraction >= lowest => {}
            _ => best = Some((fraction, ally)),
        }
    }
    best.map(|(_, ally)| ally)
}

fn nearest_hostile<'view>(
    defender: &DefenderSnapshot,
    hostiles: &'view HostileView,
) -> Option<&'view HostileSnapshot> {
    let mut best: Option<(f32, &HostileSnapshot)> = None;
    for hostile in hostiles.iter() {
        let distance = defender.position.distance_to(hostile.position);
        match best {
            Some((closest, _)) if distance >= closest => {}
            _ => best = Some((distance, hostile)),
        }
    }
    best.map(|(_, hostile)| hostile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{
        DefenderId, FieldPoint, GridCell, HostileArchetype, HostileId, HostilePhase, Lane,
        CELL_LENGTH,
    };

    fn defender(id: u32, archetype: DefenderArchetype, column: u32, lane: u32) -> DefenderSnapshot {
        let cell = GridCell::new(column, Lane::new(lane));
        let radius = match archetype {
            DefenderArchetype::Mender => 160.0,
            DefenderArchetype::Herald => 140.0,
            _ => 0.0,
        };
        DefenderSnapshot {
            id: DefenderId::new(id),
            archetype,
            cell,
            position: cell.center(),
            health: 100.0,
            max_health: 100.0,
            damage: 25.0,
            radius,
            buff_factor: 1.0,
            buff_multiplier: 1.0,
            calamity_factor: 1.0,
            ready_in: Duration::ZERO,
            heal_pool: 150.0,
            being_eaten: false,
            upgraded: false,
        }
    }

    fn hostile(id: u32, lane: u32, x: f32, health: f32) -> HostileSnapshot {
        HostileSnapshot {
            id: HostileId::new(id),
            archetype: HostileArchetype::Walker,
            lane: Lane::new(lane),
            position: FieldPoint::new(x, (lane as f32 + 0.5) * CELL_LENGTH),
            health,
            max_health: 160.0,
            damage: 12.0,
            phase: HostilePhase::Advancing,
            ready_in: Duration::ZERO,
            slowed: false,
            leapt: false,
            melee_fallback: false,
        }
    }

    fn decide(
        defenders: Vec<DefenderSnapshot>,
        hostiles: Vec<HostileSnapshot>,
    ) -> Vec<Command> {
        let mut out = Vec::new();
        DefenderBehaviour::new().handle(
            &DefenderView::from_snapshots(defenders),
            &HostileView::from_snapshots(hostiles),
            &mut out,
        );
        out
    }

    #[test]
    fn shooters_fire_only_at_lane_targets_ahead() {
        let commands = decide(
            vec![defender(0, DefenderArchetype::Gunner, 2, 1)],
            vec![hostile(0, 1, 600.0, 100.0)],
        );
        assert_eq!(
            commands,
            vec![Command::FireProjectile {
                defender: DefenderId::new(0)
            }]
        );

        // Wrong lane, behind the shooter, or on cooldown: hold fire.
        assert!(decide(
            vec![defender(0, DefenderArchetype::Gunner, 2, 1)],
            vec![hostile(0, 2, 600.0, 100.0)],
        )
        .is_empty());
        assert!(decide(
            vec![defender(0, DefenderArchetype::Gunner, 2, 1)],
            vec![hostile(0, 1, 100.0, 100.0)],
        )
        .is_empty());
        let mut cooling = defender(0, DefenderArchetype::Gunner, 2, 1);
        cooling.ready_in = Duration::from_millis(700);
        assert!(decide(vec![cooling], vec![hostile(0, 1, 600.0, 100.0)]).is_empty());
    }

    #[test]
    fn lancer_fires_the_piercing_wave() {
        let commands = decide(
            vec![defender(0, DefenderArchetype::Lancer, 2, 1)],
            vec![hostile(0, 1, 600.0, 100.0)],
        );
        assert_eq!(
            commands,
            vec![Command::FirePiercingWave {
                defender: DefenderId::new(0)
            }]
        );
    }

    #[test]
    fn mortar_anchors_on_the_healthiest_hostile() {
        let commands = decide(
            vec![defender(0, DefenderArchetype::Mortar, 2, 1)],
            vec![hostile(0, 0, 600.0, 90.0), hostile(1, 3, 500.0, 150.0)],
        );
        assert_eq!(
            commands,
            vec![Command::DetonateBurst {
                defender: DefenderId::new(0),
                center: FieldPoint::new(500.0, 280.0),
            }]
        );
    }

    #[test]
    fn mender_heals_the_lowest_health_fraction_ally_in_radius() {
        let healer = defender(0, DefenderArchetype::Mender, 2, 1);
        let mut bruised = defender(1, DefenderArchetype::Gunner, 3, 1);
        bruised.health = 80.0;
        let mut critical = defender(2, DefenderArchetype::Harvester, 1, 1);
        critical.health = 20.0;
        // Producers are eligible heal targets; park this one on cooldown so
        // the only command in the batch is the heal.
        critical.ready_in = Duration::from_millis(500);
        let mut distant = defender(3, DefenderArchetype::Gunner, 8, 1);
        distant.health = 5.0;

        let commands = decide(vec![healer, bruised, critical, distant], Vec::new());
        assert_eq!(
            commands,
            vec![Command::HealAlly {
                healer: DefenderId::new(0),
                ally: DefenderId::new(2),
            }]
        );
    }

    #[test]
    fn charger_seeks_the_nearest_hostile_and_detonates_on_contact() {
        let rusher = defender(0, DefenderArchetype::Charger, 2, 1);
        let commands = decide(
            vec![rusher.clone()],
            vec![hostile(0, 1, 600.0, 100.0), hostile(1, 1, 400.0, 100.0)],
        );
        assert_eq!(
            commands,
            vec![Command::SetChargerObjective {
                defender: DefenderId::new(0),
                hostile: HostileId::new(1),
            }]
        );

        let mut touching = hostile(1, 1, rusher.position.x + 10.0, 100.0);
        touching.position.y = rusher.position.y;
        let commands = decide(vec![rusher], vec![touching]);
        assert_eq!(
            commands,
            vec![Command::DetonateCharger {
                defender: DefenderId::new(0)
            }]
        );
    }

    #[test]
    fn an_eaten_defender_takes_no_action() {
        let mut eaten = defender(0, DefenderArchetype::Gunner, 2, 1);
        eaten.being_eaten = true;
        assert!(decide(vec![eaten], vec![hostile(0, 1, 600.0, 100.0)]).is_empty());
    }
}
