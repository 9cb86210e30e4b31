//! Task progress and one-time rewards for achievements.
//!
//! Progress is pushed by callers (tap count, max energy, friends); the
//! tracker never polls. Completion is the only place a task reward is
//! credited, so a reward can only ever land once.

use crate::{snapshot::Snapshot, types::TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub task_id: TaskId,
    pub reward:  u64,
}

/// Record progress towards a task and complete it once the target is hit.
///
/// Unknown or already-completed tasks are left alone. Progress is clamped
/// to the target before the completion check.
pub fn update_progress(snapshot: &mut Snapshot, task_id: &str, value: u64) -> Option<TaskCompleted> {
    let task = snapshot.tasks.get_mut(task_id)?;
    if task.completed {
        return None;
    }
    task.progress = value.min(task.target);
    if task.progress >= task.target {
        complete_task(snapshot, task_id)
    } else {
        None
    }
}

/// Mark a task completed and credit its reward. Returns None when the
/// task is unknown or was already completed.
pub fn complete_task(snapshot: &mut Snapshot, task_id: &str) -> Option<TaskCompleted> {
    let task = snapshot.tasks.get_mut(task_id)?;
    if task.completed {
        return None;
    }
    task.completed = true;
    let reward = task.reward;

    snapshot.coins += reward;
    snapshot.total_earned += reward;
    log::debug!("task {task_id} completed, +{reward} coins");

    Some(TaskCompleted { task_id: task_id.to_string(), reward })
}

/// Reopen a task so it can be earned again (daily tasks).
pub fn reset_task(snapshot: &mut Snapshot, task_id: &str) {
    if let Some(task) = snapshot.tasks.get_mut(task_id) {
        task.completed = false;
    }
}

/// Tasks whose progress reached the target but are not yet completed.
pub fn claimable(snapshot: &Snapshot) -> Vec<&str> {
    snapshot
        .tasks
        .iter()
        .filter(|(_, t)| !t.completed && t.progress >= t.target)
        .map(|(id, _)| id.as_str())
        .collect()
}
