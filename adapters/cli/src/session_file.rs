use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use unitfall_core::{DifficultyTier, Health, MeasurementFamily, PuzzleKind, SessionConfig};

/// Session file schema revision this build understands.
const SUPPORTED_SESSION_VERSION: u32 = 1;

/// Optional session parameters loaded from a TOML file.
///
/// Every field is optional; unset fields keep whatever value the base
/// configuration already carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SessionOverrides {
    pub seed: Option<u64>,
    pub family: Option<MeasurementFamily>,
    pub difficulty: Option<DifficultyTier>,
    pub slot_count: Option<usize>,
    pub puzzle: Option<PuzzleKind>,
    pub randomize_order: Option<bool>,
    pub swap_interval: Option<Duration>,
    pub conveyor_spawn_interval: Option<Duration>,
    pub conveyor_speed: Option<f32>,
    pub target_lifetime: Option<Duration>,
    pub starting_health: Option<Health>,
    pub reward_points: Option<u32>,
    pub miss_penalty: Option<u32>,
}

impl SessionOverrides {
    /// Writes the overrides that are present onto `config`.
    pub(crate) fn apply_to(&self, config: &mut SessionConfig) {
        if let Some(family) = self.family {
            config.family = family;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(slot_count) = self.slot_count {
            config.slot_count = slot_count;
        }
        if let Some(puzzle) = self.puzzle {
            config.puzzle = puzzle;
        }
        if let Some(randomize_order) = self.randomize_order {
            config.randomize_order = randomize_order;
        }
        if let Some(swap_interval) = self.swap_interval {
            config.swap_interval = swap_interval;
        }
        if let Some(conveyor_spawn_interval) = self.conveyor_spawn_interval {
            config.conveyor_spawn_interval = conveyor_spawn_interval;
        }
        if let Some(conveyor_speed) = self.conveyor_speed {
            config.conveyor_speed = conveyor_speed;
        }
        if let Some(target_lifetime) = self.target_lifetime {
            config.target_lifetime = target_lifetime;
        }
        if let Some(starting_health) = self.starting_health {
            config.starting_health = starting_health;
        }
        if let Some(reward_points) = self.reward_points {
            config.reward_points = reward_points;
        }
        if let Some(miss_penalty) = self.miss_penalty {
            config.miss_penalty = miss_penalty;
        }
    }
}

/// Loads session overrides from the TOML file at `path`.
pub(crate) fn load_session(path: impl AsRef<Path>) -> Result<SessionOverrides> {
    let session_path = path.as_ref();
    let contents = fs::read_to_string(session_path)
        .with_context(|| format!("failed to read session file at {}", session_path.display()))?;
    parse_session(&contents)
}

/// Resolves a measurement family from its session-file name.
pub(crate) fn parse_family(name: &str) -> Result<MeasurementFamily> {
    match name {
        "length" => Ok(MeasurementFamily::Length),
        "weight" => Ok(MeasurementFamily::Weight),
        "time" => Ok(MeasurementFamily::Time),
        "capacity" => Ok(MeasurementFamily::Capacity),
        _ => bail!("unknown measurement family `{name}`"),
    }
}

/// Resolves a puzzle kind from its session-file name.
pub(crate) fn parse_puzzle(name: &str) -> Result<PuzzleKind> {
    match name {
        "none" => Ok(PuzzleKind::None),
        "swap" => Ok(PuzzleKind::Swap),
        "conveyor" => Ok(PuzzleKind::Conveyor),
        _ => bail!("unknown puzzle kind `{name}`"),
    }
}

#[derive(Debug, Deserialize)]
struct SessionManifest {
    version: u32,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    session: SessionTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionTable {
    family: Option<String>,
    difficulty: Option<u32>,
    slots: Option<usize>,
    puzzle: Option<String>,
    randomize: Option<bool>,
    swap_interval_ms: Option<u64>,
    conveyor_spawn_interval_ms: Option<u64>,
    conveyor_speed: Option<f32>,
    target_lifetime_ms: Option<u64>,
    starting_health: Option<u32>,
    reward_points: Option<u32>,
    miss_penalty: Option<u32>,
}

fn parse_session(contents: &str) -> Result<SessionOverrides> {
    let manifest: SessionManifest =
        toml::from_str(contents).context("failed to parse session file toml contents")?;
    if manifest.version != SUPPORTED_SESSION_VERSION {
        bail!(
            "unsupported session file version {}; expected {}",
            manifest.version,
            SUPPORTED_SESSION_VERSION
        );
    }

    let table = manifest.session;
    let family = match table.family {
        Some(name) => Some(
            parse_family(&name).with_context(|| format!("bad family `{name}` in session file"))?,
        ),
        None => None,
    };
    let puzzle = match table.puzzle {
        Some(name) => Some(
            parse_puzzle(&name).with_context(|| format!("bad puzzle `{name}` in session file"))?,
        ),
        None => None,
    };

    Ok(SessionOverrides {
        seed: manifest.seed,
        family,
        difficulty: table.difficulty.map(DifficultyTier::new),
        slot_count: table.slots,
        puzzle,
        randomize_order: table.randomize,
        swap_interval: table.swap_interval_ms.map(Duration::from_millis),
        conveyor_spawn_interval: table.conveyor_spawn_interval_ms.map(Duration::from_millis),
        conveyor_speed: table.conveyor_speed,
        target_lifetime: table.target_lifetime_ms.map(Duration::from_millis),
        starting_health: table.starting_health.map(Health::new),
        reward_points: table.reward_points,
        miss_penalty: table.miss_penalty,
    })
}
