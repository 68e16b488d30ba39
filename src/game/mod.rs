//! Game simulation modules

pub mod catalog;
pub mod combat;
pub mod events;
pub mod fighter;
pub mod r#match;
pub mod overlap;
pub mod physics;
pub mod roster;
pub mod snapshot;

pub use catalog::{AttackCatalog, AttackId, AttackSpec};
pub use events::{GameEvent, RoundEndReason, RoundOutcome};
pub use fighter::{Facing, Fighter, FighterMetrics, Pose};
pub use r#match::{MatchEngine, MatchError, MatchPhase, MatchState};
pub use roster::{FighterProfile, Roster, SessionContext};

use serde::{Deserialize, Serialize};

/// One of the two local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    #[serde(rename = "p1")]
    One,
    #[serde(rename = "p2")]
    Two,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// Held input state of one player for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    /// Triggered attacks; order does not matter
    pub attacks: Vec<AttackId>,
}

impl FighterInput {
    pub fn wants_attack(&self, id: AttackId) -> bool {
        self.attacks.contains(&id)
    }

    /// Horizontal intent: -1, 0 or 1
    pub fn direction(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}
