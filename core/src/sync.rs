//! Remote-sync record: the fields a progress server stores per player.
//!
//! Field names follow the server's snake_case columns. `boosters` travels
//! as a mapping of the three track levels; the SQL column holds it as a
//! JSON string.

use crate::{
    config::GameConfig,
    error::GameResult,
    snapshot::{BoosterLevels, Snapshot},
    types::Millis,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub coins:             u64,
    pub energy:            u32,
    pub max_energy:        u32,
    pub coins_per_tap:     u64,
    pub energy_regen_rate: Millis,
    pub total_earned:      u64,
    pub total_taps:        u64,
    pub boosters:          BoosterLevels,
}

impl ProgressRecord {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            coins:             snapshot.coins,
            energy:            snapshot.energy,
            max_energy:        snapshot.max_energy,
            coins_per_tap:     snapshot.coins_per_tap,
            energy_regen_rate: snapshot.energy_regen_rate_ms,
            total_earned:      snapshot.total_earned,
            total_taps:        snapshot.total_taps,
            boosters:          snapshot.booster_levels,
        }
    }

    /// Copy the synced fields onto `snapshot`, then re-derive tier values
    /// from the booster levels so a stale server row cannot break the
    /// energy cap.
    pub fn apply_to(&self, snapshot: &mut Snapshot, config: &GameConfig) {
        snapshot.coins = self.coins;
        snapshot.energy = self.energy;
        snapshot.max_energy = self.max_energy;
        snapshot.coins_per_tap = self.coins_per_tap;
        snapshot.energy_regen_rate_ms = self.energy_regen_rate;
        snapshot.total_earned = self.total_earned;
        snapshot.total_taps = self.total_taps;
        snapshot.booster_levels = self.boosters;
        snapshot.normalize(config);
    }

    pub fn boosters_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(&self.boosters)?)
    }

    /// Parse a stored boosters column. A malformed column reads as all
    /// levels zero.
    pub fn parse_boosters(json: &str) -> BoosterLevels {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("unreadable boosters column ({e}), using base levels");
            BoosterLevels::default()
        })
    }
}
