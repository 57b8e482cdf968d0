//! Authoritative entity state and the resolved archetype stat table.

use std::time::Duration;

use lane_defence_core::{
    ConfigError, DefenderArchetype, DefenderId, DefenderStats, EffectId, EffectKind,
    EffectParent, FieldPoint, GridCell, HostileArchetype, HostileId, HostilePhase, HostileStats,
    Lane, ProjectileId, ProjectileKind, ProjectileSeeker, SlowPayload, StatKey, StatUpgrade,
    TokenId, LOOTER_FALLBACK_DAMAGE,
};

/// Living defender stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Defender {
    pub(crate) id: DefenderId,
    pub(crate) archetype: DefenderArchetype,
    pub(crate) cell: GridCell,
    pub(crate) position: FieldPoint,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) buff_multiplier: f32,
    pub(crate) calamity_factor: f32,
    pub(crate) ready_at: Duration,
    pub(crate) heal_pool: f32,
    pub(crate) eaten_by: Option<HostileId>,
    pub(crate) objective: Option<HostileId>,
    pub(crate) alive: bool,
}

impl Defender {
    /// Per-use damage after aura and calamity factors.
    pub(crate) fn effective_damage(&self, base: f32) -> f32 {
        base * self.buff_multiplier * self.calamity_factor
    }
}

/// In-flight leap trajectory of a vaulting hostile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Leap {
    pub(crate) start_x: f32,
    pub(crate) end_x: f32,
    pub(crate) elapsed: Duration,
}

/// Active reversible slow on a hostile; expiry restores `original_speed`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SlowEffect {
    pub(crate) until: Duration,
}

/// Living hostile stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Hostile {
    pub(crate) id: HostileId,
    pub(crate) archetype: HostileArchetype,
    pub(crate) position: FieldPoint,
    pub(crate) lane: Lane,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) original_speed: f32,
    pub(crate) calamity_damage_factor: f32,
    pub(crate) calamity_speed_factor: f32,
    pub(crate) phase: HostilePhase,
    pub(crate) leap: Option<Leap>,
    pub(crate) slow: Option<SlowEffect>,
    pub(crate) ready_at: Duration,
    pub(crate) leapt: bool,
    pub(crate) melee_fallback: bool,
    pub(crate) alive: bool,
}

impl Hostile {
    /// Per-strike damage after the melee-fallback rule and calamity factor.
    pub(crate) fn effective_damage(&self, base: f32) -> f32 {
        let base = if self.melee_fallback {
            LOOTER_FALLBACK_DAMAGE
        } else {
            base
        };
        base * self.calamity_damage_factor
    }

    /// Walking speed after slow and calamity factors.
    pub(crate) fn effective_speed(&self) -> f32 {
        self.speed * self.calamity_speed_factor
    }
}

/// Live projectile stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) seeker: ProjectileSeeker,
    pub(crate) kind: ProjectileKind,
    pub(crate) lane: Lane,
    pub(crate) x: f32,
    pub(crate) velocity: f32,
    pub(crate) damage: f32,
    pub(crate) slow: Option<SlowPayload>,
    pub(crate) struck: Vec<HostileId>,
    pub(crate) alive: bool,
}

/// Uncollected resource token stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Token {
    pub(crate) id: TokenId,
    pub(crate) position: FieldPoint,
    pub(crate) value: u32,
    pub(crate) alive: bool,
}

/// Attachment bound to a parent entity's lifetime.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SupportEffect {
    pub(crate) id: EffectId,
    pub(crate) kind: EffectKind,
    pub(crate) parent: EffectParent,
    pub(crate) radius: f32,
    pub(crate) alive: bool,
}

/// Defender stat table resolved once at battle construction.
///
/// Base templates come from the archetype definitions; permanent roster
/// upgrades are folded in here so the rest of the engine only ever reads
/// effective stats.
#[derive(Clone, Debug)]
pub(crate) struct ArchetypeTable {
    defenders: [DefenderStats; DefenderArchetype::ALL.len()],
    upgraded: [bool; DefenderArchetype::ALL.len()],
}

impl ArchetypeTable {
    /// Resolves the effective table, failing on stats the engine cannot run
    /// with.
    pub(crate) fn resolve(upgrades: &[StatUpgrade]) -> Result<Self, ConfigError> {
        let mut defenders = [DefenderArchetype::Gunner.stats(); DefenderArchetype::ALL.len()];
        let mut upgraded = [false; DefenderArchetype::ALL.len()];
        for archetype in DefenderArchetype::ALL {
            defenders[archetype as usize] = archetype.stats();
        }

        for upgrade in upgrades {
            let slot = &mut defenders[upgrade.archetype as usize];
            match upgrade.stat {
                StatKey::Damage => slot.damage += upgrade.delta,
                StatKey::Cooldown => {
                    let millis = slot.cooldown.as_millis() as f32 + upgrade.delta;
                    if millis < 0.0 {
                        return Err(ConfigError::InvalidStat {
                            archetype: upgrade.archetype,
                            stat: StatKey::Cooldown,
                        });
                    }
                    slot.cooldown = Duration::from_millis(millis as u64);
                }
                StatKey::Health => slot.health += upgrade.delta,
                StatKey::Radius => slot.radius += upgrade.delta,
                StatKey::Production => {
                    let value = slot.production as f32 + upgrade.delta;
                    if value < 0.0 {
                        return Err(ConfigError::InvalidStat {
                            archetype: upgrade.archetype,
                            stat: StatKey::Production,
                        });
                    }
                    slot.production = value as u32;
                }
                StatKey::BuffFactor => slot.buff_factor += upgrade.delta,
                StatKey::HealPool => slot.heal_pool += upgrade.delta,
            }
            upgraded[upgrade.archetype as usize] = true;
        }

        for archetype in DefenderArchetype::ALL {
            let slot = &defenders[archetype as usize];
            if slot.health <= 0.0 {
                return Err(ConfigError::InvalidStat {
                    archetype,
                    stat: StatKey::Health,
                });
            }
            if slot.damage < 0.0 {
                return Err(ConfigError::InvalidStat {
                    archetype,
                    stat: StatKey::Damage,
                });
            }
        }

        Ok(Self {
            defenders,
            upgraded,
        })
    }

    /// Effective stats for the provided defender archetype.
    pub(crate) fn defender(&self, archetype: DefenderArchetype) -> &DefenderStats {
        &self.defenders[archetype as usize]
    }

    /// Reports whether a permanent upgrade touched the archetype.
    pub(crate) fn upgraded(&self, archetype: DefenderArchetype) -> bool {
        self.upgraded[archetype as usize]
    }

    /// Stats for the provided hostile archetype; hostiles take no upgrades.
    pub(crate) fn hostile(archetype: HostileArchetype) -> HostileStats {
        archetype.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_damage_and_cooldown_deltas() {
        let table = ArchetypeTable::resolve(&[
            StatUpgrade {
                archetype: DefenderArchetype::Gunner,
                stat: StatKey::Damage,
                delta: 5.0,
            },
            StatUpgrade {
                archetype: DefenderArchetype::Gunner,
                stat: StatKey::Cooldown,
                delta: -500.0,
            },
        ])
        .expect("upgrades resolve");

        let stats = table.defender(DefenderArchetype::Gunner);
        assert!((stats.damage - 30.0).abs() < f32::EPSILON);
        assert_eq!(stats.cooldown, Duration::from_millis(1000));
        assert!(table.upgraded(DefenderArchetype::Gunner));
        assert!(!table.upgraded(DefenderArchetype::Chiller));
    }

    #[test]
    fn resolve_rejects_negative_cooldowns() {
        let result = ArchetypeTable::resolve(&[StatUpgrade {
            archetype: DefenderArchetype::Mender,
            stat: StatKey::Cooldown,
            delta: -10_000.0,
        }]);
        assert_eq!(
            result.err(),
            Some(ConfigError::InvalidStat {
                archetype: DefenderArchetype::Mender,
                stat: StatKey::Cooldown,
            })
        );
    }

    #[test]
    fn resolve_rejects_non_positive_health() {
        let result = ArchetypeTable::resolve(&[StatUpgrade {
            archetype: DefenderArchetype::Charger,
            stat: StatKey::Health,
            delta: -500.0,
        }]);
        assert_eq!(
            result.err(),
            Some(ConfigError::InvalidStat {
                archetype: DefenderArchetype::Charger,
                stat: StatKey::Health,
            })
        );
    }

    #[test]
    fn melee_fallback_replaces_base_damage() {
        let hostile = Hostile {
            id: HostileId::new(0),
            archetype: HostileArchetype::Looter,
            position: FieldPoint::new(100.0, 40.0),
            lane: Lane::new(0),
            health: 130.0,
            max_health: 130.0,
            speed: 34.0,
            original_speed: 34.0,
            calamity_damage_factor: 1.0,
            calamity_speed_factor: 1.0,
            phase: HostilePhase::Advancing,
            leap: None,
            slow: None,
            ready_at: Duration::ZERO,
            leapt: false,
            melee_fallback: true,
            alive: true,
        };
        assert!((hostile.effective_damage(10.0) - LOOTER_FALLBACK_DAMAGE).abs() < f32::EPSILON);
    }
}
