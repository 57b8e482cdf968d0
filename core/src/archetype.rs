//! Static archetype stat tables for defenders, hostiles, and calamities.
//!
//! Stats are compile-time templates; the world resolves an effective table at
//! battle construction after applying roster upgrades.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SlowPayload;

/// Melee damage a demoted speciality hostile falls back to.
pub const LOOTER_FALLBACK_DAMAGE: f32 = 8.0;

/// Named defender kinds with fixed stat templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefenderArchetype {
    /// Line shooter firing ballistic projectiles down its lane.
    Gunner,
    /// Line shooter whose projectiles carry a slow payload.
    Chiller,
    /// Area-burst unit anchoring on the healthiest hostile.
    Mortar,
    /// Piercing-line unit whose wave crosses the whole lane.
    Lancer,
    /// Resource producer emitting collectible tokens.
    Harvester,
    /// Passive aura source raising allied damage within its radius.
    Herald,
    /// Healer carrying a finite heal pool.
    Mender,
    /// Melee rusher that detonates on contact with a hostile.
    Charger,
}

impl DefenderArchetype {
    /// Every defender archetype, in canonical order.
    pub const ALL: [Self; 8] = [
        Self::Gunner,
        Self::Chiller,
        Self::Mortar,
        Self::Lancer,
        Self::Harvester,
        Self::Herald,
        Self::Mender,
        Self::Charger,
    ];

    /// Returns the archetype's base stat template.
    #[must_use]
    pub const fn stats(self) -> DefenderStats {
        match self {
            Self::Gunner => DefenderStats {
                cost: 100,
                health: 120.0,
                damage: 25.0,
                cooldown: Duration::from_millis(1500),
                radius: 0.0,
                production: 0,
                buff_factor: 1.0,
                heal_pool: 0.0,
                heal_amount: 0.0,
                projectile_speed: 320.0,
                move_speed: 0.0,
                slow: None,
            },
            Self::Chiller => DefenderStats {
                cost: 150,
                health: 120.0,
                damage: 20.0,
                cooldown: Duration::from_millis(1500),
                radius: 0.0,
                production: 0,
                buff_factor: 1.0,
                heal_pool: 0.0,
                heal_amount: 0.0,
                projectile_speed: 320.0,
                move_speed: 0.0,
                slow: Some(SlowPayload {
                    factor: 0.5,
                    duration: Duration::from_millis(3000),
                }),
            },
            Self::Mortar => DefenderStats {
                cost: 200,
                health: 100.0,
                damage: 60.0,
                cooldown: Duration::from_millis(4000),
                radius: 120.0,
                production: 0,
                buff_factor: 1.0,
                heal_pool: 0.0,
                heal_amount: 0.0,
                projectile_speed: 0.0,
                move_speed: 0.0,
                slow: None,
            },
            Self::Lancer => DefenderStats {
                cost: 175,
                health: 110.0,
                damage: 30.0,
                cooldown: Duration::from_millis(3500),
                radius: 0.0,
                production: 0,
                buff_factor: 1.0,
                heal_pool: 0.0,
                heal_amount: 0.0,
                projectile_speed: 260.0,
                move_speed: 0.0,
                slow: None,
            },
            Self::Harvester => DefenderStats {
                cost: 50,
                health: 90.0,
                damage: 0.0,
                cooldown: Duration::from_millis(7000),
                radius: 0.0,
                production: 25,
                buff_factor: 1.0,
                heal_pool: 0.0,
                heal_amount: 0.0,
                projectile_speed: 0.0,
                move_speed: 0.0,
                slow: None,
            },
            Self::Herald => DefenderStats {
                cost: 125,
                health: 100.0,
                damage: 0.0,
                cooldown: Duration::from_millis(0),
                radius: 140.0,
                production: 0,
                buff_factor: 1.25,
                heal_pool: 0.0,
                heal_amount: 0.0,
                projectile_speed: 0.0,
                move_speed: 0.0,
                slow: None,
            },
            Self::Mender => DefenderStats {
                cost: 150,
                health: 80.0,
                damage: 0.0,
                cooldown: Duration::from_millis(2000),
                radius: 160.0,
                production: 0,
                buff_factor: 1.0,
                heal_pool: 150.0,
                heal_amount: 15.0,
                projectile_speed: 0.0,
                move_speed: 0.0,
                slow: None,
            },
            Self::Charger => DefenderStats {
                cost: 75,
                health: 100.0,
                damage: 90.0,
                cooldown: Duration::from_millis(0),
                radius: 100.0,
                production: 0,
                buff_factor: 1.0,
                heal_pool: 0.0,
                heal_amount: 0.0,
                projectile_speed: 0.0,
                move_speed: 120.0,
                slow: None,
            },
        }
    }

    /// Reports whether the archetype occupies a producer slot.
    #[must_use]
    pub const fn is_producer(self) -> bool {
        matches!(self, Self::Harvester)
    }
}

/// Stat template resolved for a defender archetype.
///
/// Fields an archetype does not use are zeroed; the world and systems only
/// read the fields their routines define.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderStats {
    /// Resource cost deducted at placement.
    pub cost: u32,
    /// Health the defender is placed with.
    pub health: f32,
    /// Base per-use damage before aura and calamity factors.
    pub damage: f32,
    /// Cadence of the defender's cooldown-gated action.
    pub cooldown: Duration,
    /// Radius of the archetype's area effect (aura, heal, or burst).
    pub radius: f32,
    /// Token value emitted per production cycle.
    pub production: u32,
    /// Buff value an aura source applies to allies within radius.
    pub buff_factor: f32,
    /// Finite heal pool a healer starts with.
    pub heal_pool: f32,
    /// Fixed amount transferred from the pool per heal.
    pub heal_amount: f32,
    /// Speed of fired projectiles in world units per second.
    pub projectile_speed: f32,
    /// Movement speed for archetypes that leave their cell.
    pub move_speed: f32,
    /// Slow payload carried by fired projectiles, if any.
    pub slow: Option<SlowPayload>,
}

/// Named hostile kinds with fixed stat templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HostileArchetype {
    /// Default melee walker.
    Walker,
    /// Stationary ranged shooter that halts behind the first defender.
    Spitter,
    /// Vaults the first defender it meets, then walks at half speed.
    Leaper,
    /// Abducts the highest-damage defender and carries it off the field.
    Snatcher,
    /// Destroys resource producers one by one, then escapes.
    Looter,
}

impl HostileArchetype {
    /// Returns the archetype's base stat template.
    #[must_use]
    pub const fn stats(self) -> HostileStats {
        match self {
            Self::Walker => HostileStats {
                health: 100.0,
                speed: 22.0,
                damage: 12.0,
                cooldown: Duration::from_millis(900),
                escape_speed: 0.0,
            },
            Self::Spitter => HostileStats {
                health: 120.0,
                speed: 20.0,
                damage: 10.0,
                cooldown: Duration::from_millis(2200),
                escape_speed: 0.0,
            },
            Self::Leaper => HostileStats {
                health: 140.0,
                speed: 30.0,
                damage: 12.0,
                cooldown: Duration::from_millis(900),
                escape_speed: 0.0,
            },
            Self::Snatcher => HostileStats {
                health: 160.0,
                speed: 26.0,
                damage: 10.0,
                cooldown: Duration::from_millis(900),
                escape_speed: 40.0,
            },
            Self::Looter => HostileStats {
                health: 130.0,
                speed: 34.0,
                damage: 10.0,
                cooldown: Duration::from_millis(900),
                escape_speed: 48.0,
            },
        }
    }
}

/// Stat template resolved for a hostile archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostileStats {
    /// Health the hostile spawns with.
    pub health: f32,
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Damage per melee strike or fired bolt.
    pub damage: f32,
    /// Cadence between successive strikes or bolts.
    pub cooldown: Duration,
    /// Escape speed for archetypes that exit the right edge.
    pub escape_speed: f32,
}

/// Randomized, level-scoped global events perturbing entity stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CalamityKind {
    /// Hostiles strike half again as hard for the effect duration.
    Frenzy,
    /// Hostiles move faster for the effect duration.
    Stampede,
    /// Defender damage is halved for the effect duration.
    Miasma,
    /// One-shot: a random share of non-producer defenders is removed.
    Tremor,
}

impl CalamityKind {
    /// Global perturbation the calamity applies while active.
    #[must_use]
    pub const fn effect(self) -> CalamityEffect {
        match self {
            Self::Frenzy => CalamityEffect::HostileDamage(1.5),
            Self::Stampede => CalamityEffect::HostileSpeed(1.4),
            Self::Miasma => CalamityEffect::DefenderDamage(0.5),
            Self::Tremor => CalamityEffect::CullShare(1.0 / 3.0),
        }
    }

    /// Reports whether the calamity performs an immediate non-reverting
    /// action instead of a timed effect.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self.effect(), CalamityEffect::CullShare(_))
    }

    /// Short display name for the on-screen notification.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Frenzy => "Frenzy",
            Self::Stampede => "Stampede",
            Self::Miasma => "Miasma",
            Self::Tremor => "Tremor",
        }
    }

    /// One-line description for the on-screen notification.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Frenzy => "Hostiles strike harder.",
            Self::Stampede => "Hostiles surge forward.",
            Self::Miasma => "Defender attacks weaken.",
            Self::Tremor => "The ground swallows defenders.",
        }
    }
}

/// Resolved effect of a calamity kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CalamityEffect {
    /// Multiplies hostile damage while active.
    HostileDamage(f32),
    /// Multiplies hostile speed while active.
    HostileSpeed(f32),
    /// Multiplies defender damage while active.
    DefenderDamage(f32),
    /// Immediately removes this share of non-producer defenders.
    CullShare(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gunner_template_matches_balance_sheet() {
        let stats = DefenderArchetype::Gunner.stats();
        assert!((stats.damage - 25.0).abs() < f32::EPSILON);
        assert_eq!(stats.cooldown, Duration::from_millis(1500));
    }

    #[test]
    fn walker_health_survives_three_gunner_shots() {
        let walker = HostileArchetype::Walker.stats();
        let gunner = DefenderArchetype::Gunner.stats();
        assert!(walker.health - 3.0 * gunner.damage > 0.0);
        assert!(walker.health - 4.0 * gunner.damage <= 0.0);
    }

    #[test]
    fn only_the_harvester_occupies_producer_slots() {
        for archetype in DefenderArchetype::ALL {
            assert_eq!(
                archetype.is_producer(),
                archetype == DefenderArchetype::Harvester
            );
        }
    }

    #[test]
    fn tremor_is_the_only_one_shot_calamity() {
        assert!(CalamityKind::Tremor.is_one_shot());
        assert!(!CalamityKind::Frenzy.is_one_shot());
        assert!(!CalamityKind::Stampede.is_one_shot());
        assert!(!CalamityKind::Miasma.is_one_shot());
    }

    #[test]
    fn escape_capable_archetypes_carry_an_escape_speed() {
        assert!(HostileArchetype::Snatcher.stats().escape_speed > 0.0);
        assert!(HostileArchetype::Looter.stats().escape_speed > 0.0);
        assert_eq!(HostileArchetype::Walker.stats().escape_speed, 0.0);
    }
}
