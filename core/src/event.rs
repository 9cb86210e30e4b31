//! Events the controller hands to the display layer.
//!
//! The controller appends to an outbox as it mutates the snapshot; the
//! host drains it after each call or pump and redraws what changed.

use crate::{
    booster_economy::BoosterEffect,
    config::BoosterTrack,
    types::{Millis, TaskId},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Session ────────────────────────────────────
    SessionStarted {
        returning: bool,
    },
    OfflineEnergyRestored {
        elapsed_ms: Millis,
        gained:     u32,
    },
    DailyLoginClaimed {
        date:   NaiveDate,
        streak: u32,
    },
    SessionEnded,

    // ── Economy ────────────────────────────────────
    Tapped {
        earned:     u64,
        energy:     u32,
        total_taps: u64,
    },
    TapRejected,
    EnergyRegenerated {
        energy:     u32,
        max_energy: u32,
    },
    BoosterPurchased {
        track:  BoosterTrack,
        level:  u32,
        cost:   u64,
        effect: BoosterEffect,
    },
    RegenRescheduled {
        period_ms: Millis,
    },

    // ── Tasks & social ─────────────────────────────
    TaskCompleted {
        task_id: TaskId,
        reward:  u64,
    },
    ReferralRecorded {
        friends: u32,
        bonus:   u64,
    },
    StakingNotificationToggled {
        enabled: bool,
    },
    TutorialDismissed,

    // ── Persistence ────────────────────────────────
    SnapshotSaved {
        at: DateTime<Utc>,
    },
    SaveFailed,
}

/// Stable name of an event variant, used in log lines.
pub fn event_type_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::SessionStarted { .. }             => "session_started",
        GameEvent::OfflineEnergyRestored { .. }      => "offline_energy_restored",
        GameEvent::DailyLoginClaimed { .. }          => "daily_login_claimed",
        GameEvent::SessionEnded                      => "session_ended",
        GameEvent::Tapped { .. }                     => "tapped",
        GameEvent::TapRejected                       => "tap_rejected",
        GameEvent::EnergyRegenerated { .. }          => "energy_regenerated",
        GameEvent::BoosterPurchased { .. }           => "booster_purchased",
        GameEvent::RegenRescheduled { .. }           => "regen_rescheduled",
        GameEvent::TaskCompleted { .. }              => "task_completed",
        GameEvent::ReferralRecorded { .. }           => "referral_recorded",
        GameEvent::StakingNotificationToggled { .. } => "staking_notification_toggled",
        GameEvent::TutorialDismissed                 => "tutorial_dismissed",
        GameEvent::SnapshotSaved { .. }              => "snapshot_saved",
        GameEvent::SaveFailed                        => "save_failed",
    }
}
