//! Shared primitive types used across the engine.

/// A duration or period in wall-clock milliseconds.
pub type Millis = u64;

/// Stable identifier of a task definition, e.g. `"tapChampion"`.
pub type TaskId = String;

/// Identifier of a player row in a shared store.
pub type PlayerId = String;

pub const TASK_DAILY_LOGIN: &str = "dailyLogin";
pub const TASK_TAP_CHAMPION: &str = "tapChampion";
pub const TASK_RECRUIT: &str = "recruit";
pub const TASK_ENERGY_MASTER: &str = "energyMaster";
