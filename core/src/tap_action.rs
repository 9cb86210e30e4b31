use crate::{
    snapshot::Snapshot,
    task_tracker::{self, TaskCompleted},
    types::TASK_TAP_CHAMPION,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapOutcome {
    pub earned:      u64,
    pub energy_left: u32,
    pub total_taps:  u64,
    pub completed:   Option<TaskCompleted>,
}

/// Spend one energy for `coins_per_tap` coins. Returns None, touching
/// nothing, when the bar is empty.
pub fn tap(snapshot: &mut Snapshot) -> Option<TapOutcome> {
    if snapshot.energy == 0 {
        return None;
    }

    let earned = snapshot.coins_per_tap;
    snapshot.energy -= 1;
    snapshot.coins += earned;
    snapshot.total_earned += earned;
    snapshot.total_taps += 1;

    let total_taps = snapshot.total_taps;
    let completed = task_tracker::update_progress(snapshot, TASK_TAP_CHAMPION, total_taps);

    Some(TapOutcome {
        earned,
        energy_left: snapshot.energy,
        total_taps,
        completed,
    })
}
