//! Battle configuration consumed from the preparation/meta layer.
//!
//! A malformed configuration is a fatal error distinct from the silent
//! runtime no-ops: the level cannot start, so construction fails with a
//! [`ConfigError`] before any simulation state exists.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archetype::{CalamityKind, DefenderArchetype, HostileArchetype};
use crate::{Lane, FIELD_LANES};

/// Single entry of a level's spawn manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Hostile archetype to spawn.
    pub archetype: HostileArchetype,
    /// Lane the hostile spawns into.
    pub lane: Lane,
}

/// Stat dimension a permanent roster upgrade applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKey {
    /// Base per-use damage.
    Damage,
    /// Cooldown of the archetype's gated action, delta in milliseconds.
    Cooldown,
    /// Placement health.
    Health,
    /// Area-effect radius.
    Radius,
    /// Token value per production cycle.
    Production,
    /// Aura buff value.
    BuffFactor,
    /// Healer pool size.
    HealPool,
}

impl FromStr for StatKey {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "damage" => Ok(Self::Damage),
            "cooldown" => Ok(Self::Cooldown),
            "health" => Ok(Self::Health),
            "radius" => Ok(Self::Radius),
            "production" => Ok(Self::Production),
            "buff_factor" => Ok(Self::BuffFactor),
            "heal_pool" => Ok(Self::HealPool),
            other => Err(ConfigError::UnknownStat {
                name: other.to_owned(),
            }),
        }
    }
}

/// Permanent stat delta granted by the pre-match economy screen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatUpgrade {
    /// Defender archetype the upgrade applies to.
    pub archetype: DefenderArchetype,
    /// Stat dimension being adjusted.
    pub stat: StatKey,
    /// Signed delta added to the base stat.
    pub delta: f32,
}

/// Complete description of a battle consumed from the meta layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Ordered spawn manifest; the scheduler shuffles it once at start.
    pub manifest: Vec<WaveEntry>,
    /// Pool of calamity kinds eligible for this level.
    pub calamities: Vec<CalamityKind>,
    /// Resource balance the battle starts with.
    pub starting_resources: u32,
    /// Maximum number of simultaneously living producers.
    pub producer_slots: u32,
    /// Defender archetypes the player brought into the battle.
    pub roster: Vec<DefenderArchetype>,
    /// Permanent upgrades applied to the archetype stat table.
    pub upgrades: Vec<StatUpgrade>,
    /// Lanes guarded by a pre-placed sweeper counter unit.
    pub sweepers: Vec<Lane>,
}

impl BattleConfig {
    /// Validates structural constraints that do not depend on stat lookups.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.is_empty() {
            return Err(ConfigError::EmptyManifest);
        }
        for entry in &self.manifest {
            if entry.lane.get() >= FIELD_LANES {
                return Err(ConfigError::LaneOutOfRange {
                    lane: entry.lane.get(),
                });
            }
        }
        for lane in &self.sweepers {
            if lane.get() >= FIELD_LANES {
                return Err(ConfigError::LaneOutOfRange { lane: lane.get() });
            }
        }
        Ok(())
    }
}

/// Fatal configuration errors preventing a battle from starting.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The spawn manifest contained no entries.
    #[error("level manifest is empty")]
    EmptyManifest,
    /// A manifest or sweeper entry referenced a lane outside the field.
    #[error("lane {lane} is outside the configured field")]
    LaneOutOfRange {
        /// Offending lane index.
        lane: u32,
    },
    /// An upgrade referenced a stat name this engine does not define.
    #[error("unknown stat name '{name}'")]
    UnknownStat {
        /// Offending stat name.
        name: String,
    },
    /// An archetype name could not be resolved.
    #[error("unknown archetype name '{name}'")]
    UnknownArchetype {
        /// Offending archetype name.
        name: String,
    },
    /// A calamity name could not be resolved.
    #[error("unknown calamity name '{name}'")]
    UnknownCalamity {
        /// Offending calamity name.
        name: String,
    },
    /// Applying upgrades produced a stat the engine cannot run with.
    #[error("upgrades left {archetype:?} with a non-positive {stat:?}")]
    InvalidStat {
        /// Archetype whose resolved stats are unusable.
        archetype: DefenderArchetype,
        /// Stat dimension that became non-positive.
        stat: StatKey,
    },
}

impl FromStr for DefenderArchetype {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gunner" => Ok(Self::Gunner),
            "chiller" => Ok(Self::Chiller),
            "mortar" => Ok(Self::Mortar),
            "lancer" => Ok(Self::Lancer),
            "harvester" => Ok(Self::Harvester),
            "herald" => Ok(Self::Herald),
            "mender" => Ok(Self::Mender),
            "charger" => Ok(Self::Charger),
            other => Err(ConfigError::UnknownArchetype {
                name: other.to_owned(),
            }),
        }
    }
}

impl FromStr for HostileArchetype {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "walker" => Ok(Self::Walker),
            "spitter" => Ok(Self::Spitter),
            "leaper" => Ok(Self::Leaper),
            "snatcher" => Ok(Self::Snatcher),
            "looter" => Ok(Self::Looter),
            other => Err(ConfigError::UnknownArchetype {
                name: other.to_owned(),
            }),
        }
    }
}

impl FromStr for CalamityKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "frenzy" => Ok(Self::Frenzy),
            "stampede" => Ok(Self::Stampede),
            "miasma" => Ok(Self::Miasma),
            "tremor" => Ok(Self::Tremor),
            other => Err(ConfigError::UnknownCalamity {
                name: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> BattleConfig {
        BattleConfig {
            manifest: vec![WaveEntry {
                archetype: HostileArchetype::Walker,
                lane: Lane::new(0),
            }],
            calamities: Vec::new(),
            starting_resources: 100,
            producer_slots: 2,
            roster: vec![DefenderArchetype::Gunner],
            upgrades: Vec::new(),
            sweepers: Vec::new(),
        }
    }

    #[test]
    fn minimal_config_validates() {
        assert_eq!(minimal_config().validate(), Ok(()));
    }

    #[test]
    fn empty_manifest_is_fatal() {
        let mut config = minimal_config();
        config.manifest.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyManifest));
    }

    #[test]
    fn out_of_range_lane_is_fatal() {
        let mut config = minimal_config();
        config.manifest[0].lane = Lane::new(9);
        assert_eq!(
            config.validate(),
            Err(ConfigError::LaneOutOfRange { lane: 9 })
        );
    }

    #[test]
    fn stat_keys_parse_from_canonical_names() {
        assert_eq!("damage".parse::<StatKey>(), Ok(StatKey::Damage));
        assert_eq!("heal_pool".parse::<StatKey>(), Ok(StatKey::HealPool));
        assert_eq!(
            "armour".parse::<StatKey>(),
            Err(ConfigError::UnknownStat {
                name: "armour".to_owned()
            })
        );
    }

    #[test]
    fn archetype_names_parse_from_canonical_names() {
        assert_eq!(
            "gunner".parse::<DefenderArchetype>(),
            Ok(DefenderArchetype::Gunner)
        );
        assert_eq!(
            "snatcher".parse::<HostileArchetype>(),
            Ok(HostileArchetype::Snatcher)
        );
        assert_eq!("tremor".parse::<CalamityKind>(), Ok(CalamityKind::Tremor));
        assert!("ghoul".parse::<HostileArchetype>().is_err());
    }
}
