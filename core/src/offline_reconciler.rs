//! One-shot energy catch-up at load time.
//!
//! Runs before any ticker starts. Whole regen periods elapsed since the
//! last save are converted to energy; the partial period is dropped.

use crate::{clock::elapsed_ms, snapshot::Snapshot, types::Millis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineGain {
    pub elapsed_ms: Millis,
    pub gained:     u32,
}

pub fn reconcile(snapshot: &mut Snapshot, now: DateTime<Utc>) -> Option<OfflineGain> {
    if snapshot.energy_is_full() || snapshot.energy_regen_rate_ms == 0 {
        return None;
    }

    let elapsed = elapsed_ms(snapshot.last_save_timestamp, now);
    let periods = elapsed / snapshot.energy_regen_rate_ms;
    if periods == 0 {
        return None;
    }

    let room = snapshot.max_energy - snapshot.energy;
    let gained = periods.min(room as u64) as u32;
    snapshot.energy += gained;

    log::info!(
        "offline for {}s: +{gained} energy ({}/{})",
        elapsed / 1000,
        snapshot.energy,
        snapshot.max_energy
    );
    Some(OfflineGain { elapsed_ms: elapsed, gained })
}
