//! Frame snapshots handed to the renderer

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::fighter::{Facing, Fighter, Pose};
use super::r#match::{MatchPhase, MatchState};
use super::PlayerSlot;

/// Fighter state visible to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub slot: PlayerSlot,
    pub fighter_id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub facing: Facing,
    pub health: u32,
    pub max_health: u32,
    pub pose: Pose,
    pub jump_count: u8,
    pub invincible: bool,
    /// Seconds left on the HUD hit flash
    pub hit_flash: f32,
}

impl From<&Fighter> for FighterSnapshot {
    fn from(f: &Fighter) -> Self {
        Self {
            slot: f.slot,
            fighter_id: f.profile_id.clone(),
            name: f.display_name.clone(),
            x: f.x,
            y: f.y,
            vel_x: f.vel_x,
            vel_y: f.vel_y,
            facing: f.facing,
            health: f.health,
            max_health: f.max_health,
            pose: f.pose(),
            jump_count: f.jump_count,
            invincible: f.is_invincible(),
            hit_flash: f.hit_flash_remaining,
        }
    }
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub phase: MatchPhase,
    pub round: u32,
    pub round_wins: [u32; 2],
    pub round_time_remaining: f32,
    pub winner: Option<PlayerSlot>,
    /// Empty outside of a match
    pub fighters: Vec<FighterSnapshot>,
    /// Events raised since the previous snapshot
    pub events: Vec<GameEvent>,
}

/// Decides when to emit snapshots and assembles them
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
    /// Events held back until the next snapshot
    buffered: Vec<GameEvent>,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
            buffered: Vec::new(),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for important events)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Keep events from a tick that did not produce a snapshot
    pub fn buffer(&mut self, events: Vec<GameEvent>) {
        self.buffered.extend(events);
    }

    pub fn build(&mut self, state: &MatchState, events: Vec<GameEvent>) -> FrameSnapshot {
        let mut all_events = std::mem::take(&mut self.buffered);
        all_events.extend(events);

        FrameSnapshot {
            tick: state.tick,
            phase: state.phase,
            round: state.round,
            round_wins: state.round_wins,
            round_time_remaining: state.round_time_remaining,
            winner: state.winner,
            fighters: state
                .fighters
                .iter()
                .flatten()
                .map(FighterSnapshot::from)
                .collect(),
            events: all_events,
        }
    }
}
