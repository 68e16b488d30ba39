//! Host protocol message definitions
//! JSON-lines wire types between the simulation and its front end

use serde::{Deserialize, Serialize};

use crate::game::snapshot::FrameSnapshot;
use crate::game::{FighterInput, FighterMetrics, MatchError, PlayerSlot};

/// Commands read from the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    /// Held input for one player, latched until the next input for that player
    Input {
        player: PlayerSlot,
        #[serde(flatten)]
        input: FighterInput,
    },

    /// Quick start (menu) or rematch (result screen)
    StartMatch,

    OpenOptions,

    OpenCharacterSelect,

    SelectFighter {
        player: PlayerSlot,
        fighter: String,
    },

    ConfirmSelection,

    /// Sprite measurements for a roster entry
    SetMetrics {
        fighter: String,
        metrics: FighterMetrics,
    },

    Pause,

    Resume,

    RestartRound,

    BackToMenu,

    /// End the session
    Quit,
}

/// Messages written to the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMsg {
    /// World state for rendering
    Frame(FrameSnapshot),

    /// A command was rejected
    Error { code: String, message: String },
}

impl From<&MatchError> for HostMsg {
    fn from(err: &MatchError) -> Self {
        let code = match err {
            MatchError::InvalidTransition { .. } => "invalid_transition",
            MatchError::UnknownFighter(_) => "unknown_fighter",
            MatchError::InvalidMetrics { .. } => "invalid_metrics",
        };
        Self::Error {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}
