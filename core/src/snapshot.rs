//! Snapshot — the complete persisted state of one player.
//!
//! Restoring is forward compatible: the stored JSON is merged over the
//! defaults for the current config, so keys written by newer builds are
//! ignored and keys missing from older saves fall back to defaults.

use crate::{
    config::{BoosterTrack, GameConfig},
    error::{GameError, GameResult},
    types::{Millis, TaskId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys written by the first save format, mapped to their current names.
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("lastSave",        "lastSaveTimestamp"),
    ("lastDailyLogin",  "lastDailyLoginTimestamp"),
    ("energyRegenRate", "energyRegenRateMs"),
    ("boosters",        "boosterLevels"),
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BoosterLevels {
    pub energy_capacity: u32,
    pub energy_regen:    u32,
    pub coins_per_tap:   u32,
}

impl BoosterLevels {
    pub fn get(&self, track: BoosterTrack) -> u32 {
        match track {
            BoosterTrack::EnergyCapacity => self.energy_capacity,
            BoosterTrack::EnergyRegen    => self.energy_regen,
            BoosterTrack::CoinsPerTap    => self.coins_per_tap,
        }
    }

    pub fn get_mut(&mut self, track: BoosterTrack) -> &mut u32 {
        match track {
            BoosterTrack::EnergyCapacity => &mut self.energy_capacity,
            BoosterTrack::EnergyRegen    => &mut self.energy_regen,
            BoosterTrack::CoinsPerTap    => &mut self.coins_per_tap,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskState {
    pub target:    u64,
    pub reward:    u64,
    pub progress:  u64,
    pub completed: bool,
}

impl Default for TaskState {
    fn default() -> Self {
        Self { target: 1, reward: 0, progress: 0, completed: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub coins:        u64,
    pub energy:       u32,
    pub max_energy:   u32,
    pub coins_per_tap: u64,
    pub energy_regen_rate_ms: Millis,
    pub total_earned: u64,
    pub total_taps:   u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_save_timestamp: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_daily_login_timestamp: DateTime<Utc>,
    pub streak_count: u32,
    pub booster_levels: BoosterLevels,
    pub tasks:        BTreeMap<TaskId, TaskState>,
    pub friends:      u32,
    pub first_time:   bool,
    pub staking_notified: bool,
}

impl Snapshot {
    /// A brand-new profile. The daily login has never been claimed.
    pub fn defaults(config: &GameConfig, now: DateTime<Utc>) -> Self {
        let tasks = config
            .tasks
            .iter()
            .map(|(id, def)| {
                let state = TaskState {
                    target:    def.target,
                    reward:    def.reward,
                    progress:  def.initial_progress,
                    completed: false,
                };
                (id.clone(), state)
            })
            .collect();

        Self {
            coins:                0,
            energy:               config.initial_energy,
            max_energy:           config.max_energy_at(0),
            coins_per_tap:        config.coins_per_tap_at(0),
            energy_regen_rate_ms: config.regen_rate_at(0),
            total_earned:         0,
            total_taps:           0,
            last_save_timestamp:  now,
            last_daily_login_timestamp: DateTime::<Utc>::default(),
            streak_count:         1,
            booster_levels:       BoosterLevels::default(),
            tasks,
            friends:              0,
            first_time:           true,
            staking_notified:     false,
        }
    }

    /// Rebuild a snapshot from stored JSON, merged over current defaults.
    pub fn restore(json: &str, config: &GameConfig, now: DateTime<Utc>) -> GameResult<Self> {
        let mut stored: Value = serde_json::from_str(json)?;
        let Some(fields) = stored.as_object_mut() else {
            return Err(GameError::MalformedSnapshot {
                reason: "top-level value is not an object".into(),
            });
        };
        for (old, new) in LEGACY_KEYS {
            if let Some(value) = fields.remove(*old) {
                fields.entry(new.to_string()).or_insert(value);
            }
        }

        let mut merged = serde_json::to_value(Self::defaults(config, now))?;
        if let Value::Object(fields) = stored {
            overlay_fields(&mut merged, "", fields);
        }

        let mut snapshot: Snapshot = serde_json::from_value(merged)?;
        snapshot.normalize(config);
        Ok(snapshot)
    }

    /// Re-derive tier effects from booster levels and repair any invariant
    /// a stored payload may violate.
    pub fn normalize(&mut self, config: &GameConfig) {
        for track in BoosterTrack::ALL {
            let max = config.max_level(track);
            let level = self.booster_levels.get_mut(track);
            if *level > max {
                log::warn!("{track} level {} above max {max}, clamping", *level);
                *level = max;
            }
        }

        self.max_energy = config.max_energy_at(self.booster_levels.energy_capacity);
        self.energy_regen_rate_ms = config.regen_rate_at(self.booster_levels.energy_regen);
        self.coins_per_tap = config.coins_per_tap_at(self.booster_levels.coins_per_tap);

        if self.energy > self.max_energy {
            log::warn!("stored energy {} above max {}, clamping", self.energy, self.max_energy);
            self.energy = self.max_energy;
        }
        self.streak_count = self.streak_count.max(1);

        for task in self.tasks.values_mut() {
            task.target = task.target.max(1);
            task.progress = task.progress.min(task.target);
        }
    }

    pub fn level(&self, track: BoosterTrack) -> u32 {
        self.booster_levels.get(track)
    }

    pub fn task(&self, id: &str) -> Option<&TaskState> {
        self.tasks.get(id)
    }

    pub fn energy_is_full(&self) -> bool {
        self.energy >= self.max_energy
    }
}

/// Overlay stored fields onto the defaults one key at a time. A field whose
/// value no longer decodes keeps its default; objects are retried key by key
/// so one bad entry only costs that entry.
fn overlay_fields(base: &mut Value, pointer: &str, stored: Map<String, Value>) {
    for (key, value) in stored {
        let field = format!("{pointer}/{}", key.replace('~', "~0").replace('/', "~1"));

        let mut candidate = base.clone();
        if let Some(Value::Object(parent)) = candidate.pointer_mut(pointer) {
            match parent.get_mut(&key) {
                Some(slot) => merge_json(slot, value.clone()),
                None => {
                    parent.insert(key.clone(), value.clone());
                }
            }
        }
        if serde_json::from_value::<Snapshot>(candidate.clone()).is_ok() {
            *base = candidate;
            continue;
        }

        match value {
            Value::Object(inner) if matches!(base.pointer(&field), Some(Value::Object(_))) => {
                overlay_fields(base, &field, inner);
            }
            _ => log::warn!("stored field {field} is unreadable, keeping the default"),
        }
    }
}

/// Overlay `overlay` onto `base`: objects merge key by key, nulls are
/// treated as absent, anything else replaces.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
