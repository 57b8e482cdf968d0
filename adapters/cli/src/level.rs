//! Level files: TOML parsing into a validated battle configuration, plus
//! the built-in demo level used when no file is given.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lane_defence_core::{
    BattleConfig, DefenderArchetype, GridCell, Lane, StatUpgrade, WaveEntry,
};
use serde::Deserialize;

/// Defender placement scheduled for the first tick of the battle.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Placement {
    /// Archetype to place.
    pub(crate) archetype: DefenderArchetype,
    /// Cell to place it on.
    pub(crate) cell: GridCell,
}

/// Parsed level: the battle configuration plus scripted placements.
#[derive(Clone, Debug)]
pub(crate) struct Level {
    /// Configuration handed to the battle runner.
    pub(crate) config: BattleConfig,
    /// Placements submitted before the first tick.
    pub(crate) placements: Vec<Placement>,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    starting_resources: u32,
    producer_slots: u32,
    #[serde(default)]
    calamities: Vec<String>,
    roster: Vec<String>,
    #[serde(default)]
    upgrades: Vec<RawUpgrade>,
    #[serde(default)]
    sweepers: Vec<u32>,
    manifest: Vec<RawWave>,
    #[serde(default)]
    placements: Vec<RawPlacement>,
}

#[derive(Debug, Deserialize)]
struct RawWave {
    archetype: String,
    lane: u32,
}

#[derive(Debug, Deserialize)]
struct RawUpgrade {
    archetype: String,
    stat: String,
    delta: f32,
}

#[derive(Debug, Deserialize)]
struct RawPlacement {
    archetype: String,
    column: u32,
    lane: u32,
}

/// Reads and validates a level file.
pub(crate) fn load_level(path: &Path) -> Result<Level> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: RawLevel = toml::from_str(&text).context("parsing level TOML")?;
    level_from_raw(raw)
}

fn level_from_raw(raw: RawLevel) -> Result<Level> {
    let mut manifest = Vec::with_capacity(raw.manifest.len());
    for wave in &raw.manifest {
        manifest.push(WaveEntry {
            archetype: wave.archetype.parse()?,
            lane: Lane::new(wave.lane),
        });
    }

    let mut calamities = Vec::with_capacity(raw.calamities.len());
    for name in &raw.calamities {
        calamities.push(name.parse()?);
    }

    let mut roster = Vec::with_capacity(raw.roster.len());
    for name in &raw.roster {
        roster.push(name.parse()?);
    }

    let mut upgrades = Vec::with_capacity(raw.upgrades.len());
    for upgrade in &raw.upgrades {
        upgrades.push(StatUpgrade {
            archetype: upgrade.archetype.parse()?,
            stat: upgrade.stat.parse()?,
            delta: upgrade.delta,
        });
    }

    let mut placements = Vec::with_capacity(raw.placements.len());
    for placement in &raw.placements {
        placements.push(Placement {
            archetype: placement.archetype.parse()?,
            cell: GridCell::new(placement.column, Lane::new(placement.lane)),
        });
    }

    let config = BattleConfig {
        manifest,
        calamities,
        starting_resources: raw.starting_resources,
        producer_slots: raw.producer_slots,
        roster,
        upgrades,
        sweepers: raw.sweepers.iter().copied().map(Lane::new).collect(),
    };
    config.validate()?;

    Ok(Level { config, placements })
}

/// Built-in level used when no level file is given on the command line.
pub(crate) fn demo_level() -> Result<Level> {
    let raw = RawLevel {
        starting_resources: 600,
        producer_slots: 2,
        calamities: vec![
            "frenzy".into(),
            "stampede".into(),
            "miasma".into(),
            "tremor".into(),
        ],
        roster: vec![
            "gunner".into(),
            "chiller".into(),
            "mortar".into(),
            "lancer".into(),
            "harvester".into(),
            "herald".into(),
            "mender".into(),
            "charger".into(),
        ],
        upgrades: Vec::new(),
        sweepers: vec![2],
        manifest: vec![
            RawWave { archetype: "walker".into(), lane: 0 },
            RawWave { archetype: "walker".into(), lane: 1 },
            RawWave { archetype: "walker".into(), lane: 2 },
            RawWave { archetype: "walker".into(), lane: 3 },
            RawWave { archetype: "walker".into(), lane: 4 },
            RawWave { archetype: "spitter".into(), lane: 1 },
            RawWave { archetype: "leaper".into(), lane: 3 },
            RawWave { archetype: "snatcher".into(), lane: 2 },
            RawWave { archetype: "looter".into(), lane: 0 },
            RawWave { archetype: "walker".into(), lane: 2 },
        ],
        placements: vec![
            RawPlacement { archetype: "harvester".into(), column: 0, lane: 2 },
            RawPlacement { archetype: "gunner".into(), column: 1, lane: 0 },
            RawPlacement { archetype: "gunner".into(), column: 1, lane: 1 },
            RawPlacement { archetype: "gunner".into(), column: 1, lane: 2 },
            RawPlacement { archetype: "gunner".into(), column: 1, lane: 3 },
            RawPlacement { archetype: "gunner".into(), column: 1, lane: 4 },
        ],
    };
    level_from_raw(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{CalamityKind, HostileArchetype, StatKey, FIELD_COLUMNS, FIELD_LANES};

    #[test]
    fn a_full_level_file_parses() {
        let text = r#"
            starting_resources = 300
            producer_slots = 1
            calamities = ["frenzy", "tremor"]
            roster = ["gunner", "harvester"]
            sweepers = [4]

            [[upgrades]]
            archetype = "gunner"
            stat = "damage"
            delta = 5.0

            [[manifest]]
            archetype = "walker"
            lane = 0

            [[manifest]]
            archetype = "looter"
            lane = 4

            [[placements]]
            archetype = "gunner"
            column = 1
            lane = 0
        "#;
        let raw: RawLevel = toml::from_str(text).expect("toml");
        let level = level_from_raw(raw).expect("level");

        assert_eq!(level.config.starting_resources, 300);
        assert_eq!(
            level.config.calamities,
            vec![CalamityKind::Frenzy, CalamityKind::Tremor]
        );
        assert_eq!(level.config.manifest[1].archetype, HostileArchetype::Looter);
        assert_eq!(level.config.upgrades[0].stat, StatKey::Damage);
        assert_eq!(level.placements.len(), 1);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let raw = RawLevel {
            starting_resources: 100,
            producer_slots: 1,
            calamities: Vec::new(),
            roster: vec!["ballista".into()],
            upgrades: Vec::new(),
            sweepers: Vec::new(),
            manifest: vec![RawWave { archetype: "walker".into(), lane: 0 }],
            placements: Vec::new(),
        };
        assert!(level_from_raw(raw).is_err());
    }

    #[test]
    fn the_demo_level_is_well_formed() {
        let level = demo_level().expect("demo level");
        assert!(level.config.validate().is_ok());
        for placement in &level.placements {
            assert!(placement.cell.column() < FIELD_COLUMNS);
            assert!(placement.cell.lane().get() < FIELD_LANES);
        }
    }
}
