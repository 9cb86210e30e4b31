//! Daily login — one reward per local calendar day.
//!
//! A day is either Pending (the last claim fell on an earlier date) or
//! Claimed. Dates are compared in the player's local zone, so the reward
//! comes back right after midnight no matter how few hours have passed.

use crate::{
    clock::{to_millis, Clock},
    snapshot::Snapshot,
    task_tracker::{self, TaskCompleted},
    types::TASK_DAILY_LOGIN,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyLoginState {
    Pending,
    Claimed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLoginClaim {
    pub date:      NaiveDate,
    pub streak:    u32,
    pub completed: Option<TaskCompleted>,
}

pub fn state(snapshot: &Snapshot, clock: &dyn Clock) -> DailyLoginState {
    let last = clock.local_date(snapshot.last_daily_login_timestamp);
    if last == clock.today() {
        DailyLoginState::Claimed
    } else {
        DailyLoginState::Pending
    }
}

/// Claim today's reward if it is still pending.
pub fn evaluate(snapshot: &mut Snapshot, clock: &dyn Clock) -> Option<DailyLoginClaim> {
    let now = clock.now();
    let today = clock.local_date(now);
    let last = clock.local_date(snapshot.last_daily_login_timestamp);
    if last == today {
        return None;
    }

    snapshot.streak_count = if today.pred_opt() == Some(last) {
        snapshot.streak_count.saturating_add(1)
    } else {
        1
    };

    task_tracker::reset_task(snapshot, TASK_DAILY_LOGIN);
    snapshot.last_daily_login_timestamp = to_millis(now);
    let completed = task_tracker::complete_task(snapshot, TASK_DAILY_LOGIN);

    log::info!("daily login for {today}, streak {}", snapshot.streak_count);
    Some(DailyLoginClaim {
        date: today,
        streak: snapshot.streak_count,
        completed,
    })
}
