//! Discrete simulation events consumed by the audio/VFX/menu layers

use serde::{Deserialize, Serialize};

use super::catalog::AttackId;
use super::PlayerSlot;

/// Result of a finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "winner", rename_all = "snake_case")]
pub enum RoundOutcome {
    Winner(PlayerSlot),
    Draw,
}

impl RoundOutcome {
    pub fn winner(self) -> Option<PlayerSlot> {
        match self {
            Self::Winner(slot) => Some(slot),
            Self::Draw => None,
        }
    }
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    /// A fighter's health reached zero
    Knockout,
    /// Both fighters reached zero on the same tick
    DoubleKnockout,
    /// The round timer ran out
    Timeout,
}

/// Game events emitted by a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// An attack was activated
    AttackStarted {
        fighter: PlayerSlot,
        attack: AttackId,
        effect: Option<String>,
    },

    /// Hit registered
    HitLanded {
        attacker: PlayerSlot,
        defender: PlayerSlot,
        attack: AttackId,
        damage: u32,
        defender_health: u32,
        effect: Option<String>,
    },

    /// Fighter health reached zero
    KnockOut {
        fighter: PlayerSlot,
    },

    RoundStarted {
        round: u32,
    },

    RoundEnded {
        round: u32,
        outcome: RoundOutcome,
        reason: RoundEndReason,
        round_wins: [u32; 2],
    },

    MatchEnded {
        winner: PlayerSlot,
        round_wins: [u32; 2],
    },

    Paused,

    Resumed,
}
