use crate::{
    error::{GameError, GameResult},
    types::{Millis, TaskId, TASK_DAILY_LOGIN, TASK_ENERGY_MASTER, TASK_RECRUIT, TASK_TAP_CHAMPION},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The three independent upgrade tracks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BoosterTrack {
    EnergyCapacity,
    EnergyRegen,
    CoinsPerTap,
}

impl BoosterTrack {
    pub const ALL: [BoosterTrack; 3] = [
        BoosterTrack::EnergyCapacity,
        BoosterTrack::EnergyRegen,
        BoosterTrack::CoinsPerTap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnergyCapacity => "energyCapacity",
            Self::EnergyRegen    => "energyRegen",
            Self::CoinsPerTap    => "coinsPerTap",
        }
    }
}

impl std::fmt::Display for BoosterTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BoosterTrack {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoosterTrack::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GameError::Other(anyhow::anyhow!("unknown booster track '{s}'")))
    }
}

/// Price of the (i+1)-th purchase on each track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoosterCosts {
    pub energy_capacity: Vec<u64>,
    pub energy_regen:    Vec<u64>,
    pub coins_per_tap:   Vec<u64>,
}

impl BoosterCosts {
    pub fn for_track(&self, track: BoosterTrack) -> &[u64] {
        match track {
            BoosterTrack::EnergyCapacity => &self.energy_capacity,
            BoosterTrack::EnergyRegen    => &self.energy_regen,
            BoosterTrack::CoinsPerTap    => &self.coins_per_tap,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDef {
    pub target: u64,
    pub reward: u64,
    /// Progress a fresh profile starts with.
    #[serde(default)]
    pub initial_progress: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub initial_energy:        u32,
    pub max_energy_levels:     Vec<u32>,
    /// Milliseconds per regenerated energy point, per tier.
    pub regen_rate_levels_ms:  Vec<Millis>,
    pub coins_per_tap_levels:  Vec<u64>,
    pub booster_costs:         BoosterCosts,
    pub tasks:                 BTreeMap<TaskId, TaskDef>,
    #[serde(default = "default_referral_bonus")]
    pub referral_bonus:        u64,
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms:  Millis,
}

fn default_referral_bonus() -> u64 { 500 }
fn default_autosave_interval_ms() -> Millis { 5_000 }

impl GameConfig {
    /// The shipped balance tables.
    pub fn standard() -> Self {
        let tasks = [
            (TASK_DAILY_LOGIN,   TaskDef { target: 1,    reward: 100,  initial_progress: 0 }),
            (TASK_TAP_CHAMPION,  TaskDef { target: 1000, reward: 500,  initial_progress: 0 }),
            (TASK_RECRUIT,       TaskDef { target: 1,    reward: 1000, initial_progress: 0 }),
            (TASK_ENERGY_MASTER, TaskDef { target: 500,  reward: 2000, initial_progress: 100 }),
        ]
        .into_iter()
        .map(|(id, def)| (id.to_string(), def))
        .collect();

        Self {
            initial_energy:       100,
            max_energy_levels:    vec![100, 150, 200, 300, 500],
            regen_rate_levels_ms: vec![1_800_000, 1_500_000, 1_200_000, 900_000, 600_000],
            coins_per_tap_levels: vec![1, 2, 3, 5, 10],
            booster_costs: BoosterCosts {
                energy_capacity: vec![100, 250, 500, 1000],
                energy_regen:    vec![150, 300, 600, 1200],
                coins_per_tap:   vec![200, 400, 800, 1600],
            },
            tasks,
            referral_bonus:       default_referral_bonus(),
            autosave_interval_ms: default_autosave_interval_ms(),
        }
    }

    /// Load and validate a config file (JSON).
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GameResult<()> {
        let invalid = |reason: String| Err(GameError::InvalidConfig { reason });

        if self.max_energy_levels.is_empty()
            || self.regen_rate_levels_ms.is_empty()
            || self.coins_per_tap_levels.is_empty()
        {
            return invalid("tier lists must not be empty".into());
        }
        if self.regen_rate_levels_ms.contains(&0) {
            return invalid("regen rates must be positive".into());
        }
        if self.initial_energy > self.max_energy_levels[0] {
            return invalid(format!(
                "initial energy {} exceeds base capacity {}",
                self.initial_energy, self.max_energy_levels[0]
            ));
        }
        for track in BoosterTrack::ALL {
            let tiers = self.tier_count(track);
            let costs = self.booster_costs.for_track(track).len();
            if costs + 1 != tiers {
                return invalid(format!(
                    "{track}: {costs} costs for {tiers} tiers (expected {})",
                    tiers.saturating_sub(1)
                ));
            }
        }
        for (id, task) in &self.tasks {
            if task.target == 0 {
                return invalid(format!("task '{id}' has a zero target"));
            }
        }
        Ok(())
    }

    fn tier_count(&self, track: BoosterTrack) -> usize {
        match track {
            BoosterTrack::EnergyCapacity => self.max_energy_levels.len(),
            BoosterTrack::EnergyRegen    => self.regen_rate_levels_ms.len(),
            BoosterTrack::CoinsPerTap    => self.coins_per_tap_levels.len(),
        }
    }

    /// Highest purchasable level on a track.
    pub fn max_level(&self, track: BoosterTrack) -> u32 {
        self.booster_costs.for_track(track).len() as u32
    }

    /// Cost of the next purchase from `level`, or None at max level.
    pub fn cost_at(&self, track: BoosterTrack, level: u32) -> Option<u64> {
        self.booster_costs.for_track(track).get(level as usize).copied()
    }

    // Levels are clamped so a hand-edited save can never index past a table.

    pub fn max_energy_at(&self, level: u32) -> u32 {
        tier(&self.max_energy_levels, level)
    }

    pub fn regen_rate_at(&self, level: u32) -> Millis {
        tier(&self.regen_rate_levels_ms, level)
    }

    pub fn coins_per_tap_at(&self, level: u32) -> u64 {
        tier(&self.coins_per_tap_levels, level)
    }
}

impl Default for GameConfig {
    fn default() -> Self { Self::standard() }
}

fn tier<T: Copy + Default>(levels: &[T], level: u32) -> T {
    let idx = (level as usize).min(levels.len().saturating_sub(1));
    levels.get(idx).copied().unwrap_or_default()
}
