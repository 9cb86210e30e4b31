use crate::{config::BoosterTrack, types::TaskId};
use serde::{Deserialize, Serialize};

/// Everything a player (or the host on their behalf) can ask for.
/// Variants are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    Tap,
    PurchaseBooster { track: BoosterTrack },
    UpdateTaskProgress { task_id: TaskId, value: u64 },
    ToggleStakingNotification,
    RecordReferral,
    DismissTutorial,
    /// Opportunistic save: session end, tab hidden, app backgrounded.
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub accepted: bool,
}

impl From<bool> for CommandOutcome {
    fn from(accepted: bool) -> Self {
        Self { accepted }
    }
}
