//! Tiered permanent upgrades on three booster tracks.
//!
//! A purchase debits the coins, bumps the level and applies the new tier's
//! effect in one call on `&mut Snapshot`; nothing else can observe the
//! state halfway through. Rescheduling the regen ticker after an
//! `EnergyRegen` purchase is the controller's half of the same step.

use crate::{
    config::{BoosterTrack, GameConfig},
    snapshot::Snapshot,
    task_tracker::{self, TaskCompleted},
    types::TASK_ENERGY_MASTER,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PurchaseRejected {
    MaxLevel { level: u32 },
    InsufficientCoins { cost: u64, coins: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoosterEffect {
    MaxEnergy { old: u32, new: u32, energy: u32 },
    RegenRate { old_ms: u64, new_ms: u64 },
    CoinsPerTap { old: u64, new: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoosterPurchase {
    pub track:     BoosterTrack,
    pub level:     u32,
    pub cost:      u64,
    pub effect:    BoosterEffect,
    pub completed: Option<TaskCompleted>,
}

/// What the shop shows for one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoosterQuote {
    pub track:      BoosterTrack,
    pub level:      u32,
    pub current:    u64,
    pub next:       Option<u64>,
    pub cost:       Option<u64>,
    pub at_max:     bool,
    pub affordable: bool,
}

pub fn check_purchase(config: &GameConfig, snapshot: &Snapshot, track: BoosterTrack) -> Result<u64, PurchaseRejected> {
    let level = snapshot.level(track);
    let Some(cost) = config.cost_at(track, level) else {
        return Err(PurchaseRejected::MaxLevel { level });
    };
    if snapshot.coins < cost {
        return Err(PurchaseRejected::InsufficientCoins { cost, coins: snapshot.coins });
    }
    Ok(cost)
}

pub fn can_purchase(config: &GameConfig, snapshot: &Snapshot, track: BoosterTrack) -> bool {
    check_purchase(config, snapshot, track).is_ok()
}

pub fn purchase(
    config:   &GameConfig,
    snapshot: &mut Snapshot,
    track:    BoosterTrack,
) -> Result<BoosterPurchase, PurchaseRejected> {
    let cost = check_purchase(config, snapshot, track)?;

    snapshot.coins -= cost;
    let level = {
        let level = snapshot.booster_levels.get_mut(track);
        *level += 1;
        *level
    };

    let mut completed = None;
    let effect = match track {
        BoosterTrack::EnergyCapacity => {
            let old = snapshot.max_energy;
            let new = config.max_energy_at(level);
            snapshot.max_energy = new;
            if snapshot.energy == old {
                snapshot.energy = new;
            }
            completed = task_tracker::update_progress(snapshot, TASK_ENERGY_MASTER, new as u64);
            BoosterEffect::MaxEnergy { old, new, energy: snapshot.energy }
        }
        BoosterTrack::EnergyRegen => {
            let old_ms = snapshot.energy_regen_rate_ms;
            let new_ms = config.regen_rate_at(level);
            snapshot.energy_regen_rate_ms = new_ms;
            BoosterEffect::RegenRate { old_ms, new_ms }
        }
        BoosterTrack::CoinsPerTap => {
            let old = snapshot.coins_per_tap;
            let new = config.coins_per_tap_at(level);
            snapshot.coins_per_tap = new;
            BoosterEffect::CoinsPerTap { old, new }
        }
    };

    log::debug!("{track} -> level {level} for {cost} coins ({effect:?})");
    Ok(BoosterPurchase { track, level, cost, effect, completed })
}

pub fn quote(config: &GameConfig, snapshot: &Snapshot, track: BoosterTrack) -> BoosterQuote {
    let level = snapshot.level(track);
    let value_at = |lvl: u32| -> u64 {
        match track {
            BoosterTrack::EnergyCapacity => config.max_energy_at(lvl) as u64,
            BoosterTrack::EnergyRegen    => config.regen_rate_at(lvl),
            BoosterTrack::CoinsPerTap    => config.coins_per_tap_at(lvl),
        }
    };
    let cost = config.cost_at(track, level);

    BoosterQuote {
        track,
        level,
        current:    value_at(level),
        next:       cost.map(|_| value_at(level + 1)),
        cost,
        at_max:     cost.is_none(),
        affordable: can_purchase(config, snapshot, track),
    }
}
