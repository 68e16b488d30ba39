//! Match state and the authoritative per-frame step

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::util::time::count_down;

use super::combat::CombatSystem;
use super::events::{GameEvent, RoundEndReason, RoundOutcome};
use super::fighter::{Fighter, FighterMetrics};
use super::overlap::OverlapResolver;
use super::physics::PhysicsSystem;
use super::roster::SessionContext;
use super::{FighterInput, PlayerSlot};

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Title menu, nothing simulated
    Menu,
    Options,
    CharacterSelect,
    /// Round in progress
    Playing,
    /// Between rounds
    RoundOver,
    /// Result screen
    MatchOver,
    Paused,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Menu => "menu",
            Self::Options => "options",
            Self::CharacterSelect => "character_select",
            Self::Playing => "playing",
            Self::RoundOver => "round_over",
            Self::MatchOver => "match_over",
            Self::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Rejected match operations; a rejected operation changes nothing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("Cannot {action} while in {from}")]
    InvalidTransition {
        from: MatchPhase,
        action: &'static str,
    },

    #[error("Unknown fighter: {0}")]
    UnknownFighter(String),

    #[error("Invalid metrics for {fighter}: {reason}")]
    InvalidMetrics { fighter: String, reason: String },
}

/// Match state (owned by the engine)
#[derive(Debug, Clone)]
pub struct MatchState {
    pub phase: MatchPhase,
    /// Phase to return to on resume
    pub paused_from: Option<MatchPhase>,
    /// Simulated frames; frozen while paused
    pub tick: u64,
    /// Current round, starting at 1
    pub round: u32,
    pub round_wins: [u32; 2],
    pub round_time_remaining: f32,
    /// Countdown for RoundOver and MatchOver
    pub transition_timer: f32,
    pub fighters: Option<[Fighter; 2]>,
    pub last_outcome: Option<RoundOutcome>,
    pub winner: Option<PlayerSlot>,
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::Menu,
            paused_from: None,
            tick: 0,
            round: 0,
            round_wins: [0; 2],
            round_time_remaining: 0.0,
            transition_timer: 0.0,
            fighters: None,
            last_outcome: None,
            winner: None,
        }
    }

    pub fn fighter(&self, slot: PlayerSlot) -> Option<&Fighter> {
        self.fighters.as_ref().map(|f| &f[slot.index()])
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// The authoritative two-player match
///
/// Every tick runs physics, overlap separation, combat and then round
/// resolution in that order. Menu operations return `MatchError` on an
/// invalid transition; events they raise are delivered by the next `step`.
pub struct MatchEngine {
    config: Arc<GameConfig>,
    session: SessionContext,
    state: MatchState,
    pending: Vec<GameEvent>,
}

impl MatchEngine {
    pub fn new(config: Arc<GameConfig>, session: SessionContext) -> Self {
        Self {
            config,
            session,
            state: MatchState::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    fn reject(&self, action: &'static str) -> MatchError {
        MatchError::InvalidTransition {
            from: self.state.phase,
            action,
        }
    }

    pub fn open_options(&mut self) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::Menu {
            return Err(self.reject("open options"));
        }
        self.transition(MatchPhase::Options);
        Ok(())
    }

    pub fn open_character_select(&mut self) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::Menu {
            return Err(self.reject("open character select"));
        }
        self.transition(MatchPhase::CharacterSelect);
        Ok(())
    }

    pub fn select_fighter(&mut self, slot: PlayerSlot, id: &str) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::CharacterSelect {
            return Err(self.reject("select a fighter"));
        }
        self.session.select(slot, id)?;
        debug!(slot = ?slot, fighter = id, "Fighter selected");
        Ok(())
    }

    /// Override sprite metrics for a roster entry; applies from the next spawn
    pub fn set_metrics(&mut self, id: &str, metrics: FighterMetrics) -> Result<(), MatchError> {
        self.session.set_metrics(id, metrics)
    }

    pub fn confirm_selection(&mut self) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::CharacterSelect {
            return Err(self.reject("confirm selection"));
        }
        self.begin_match();
        Ok(())
    }

    /// Quick start from the menu, or a rematch from the result screen
    pub fn start_match(&mut self) -> Result<(), MatchError> {
        if !matches!(self.state.phase, MatchPhase::Menu | MatchPhase::MatchOver) {
            return Err(self.reject("start a match"));
        }
        self.begin_match();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), MatchError> {
        match self.state.phase {
            MatchPhase::Paused => Ok(()),
            phase @ (MatchPhase::Playing | MatchPhase::RoundOver | MatchPhase::MatchOver) => {
                self.state.paused_from = Some(phase);
                self.transition(MatchPhase::Paused);
                self.pending.push(GameEvent::Paused);
                Ok(())
            }
            _ => Err(self.reject("pause")),
        }
    }

    pub fn resume(&mut self) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::Paused {
            return Ok(());
        }
        let previous = self.state.paused_from.take().unwrap_or(MatchPhase::Playing);
        self.transition(previous);
        self.pending.push(GameEvent::Resumed);
        Ok(())
    }

    /// Replay the current round with scores kept
    pub fn restart_round(&mut self) -> Result<(), MatchError> {
        let allowed = match self.state.phase {
            MatchPhase::RoundOver => true,
            MatchPhase::Paused => matches!(
                self.state.paused_from,
                Some(MatchPhase::Playing | MatchPhase::RoundOver)
            ),
            _ => false,
        };
        if !allowed || self.state.fighters.is_none() {
            return Err(self.reject("restart the round"));
        }

        if self.state.phase == MatchPhase::Paused {
            self.state.paused_from = None;
            self.pending.push(GameEvent::Resumed);
        }
        info!(round = self.state.round, "Round restarted");
        self.start_round();
        Ok(())
    }

    pub fn back_to_menu(&mut self) -> Result<(), MatchError> {
        if self.state.phase == MatchPhase::Menu {
            return Err(self.reject("return to the menu"));
        }
        self.reset_to_menu();
        Ok(())
    }

    /// Advance the match by one frame
    pub fn step(&mut self, inputs: &[FighterInput; 2], dt: f32) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.pending);
        if self.state.phase == MatchPhase::Paused {
            return events;
        }
        self.state.tick += 1;

        match self.state.phase {
            MatchPhase::Playing => self.step_playing(inputs, dt, &mut events),
            MatchPhase::RoundOver => {
                self.state.transition_timer = count_down(self.state.transition_timer, dt);
                if self.state.transition_timer <= 0.0 {
                    self.state.round += 1;
                    self.start_round();
                    events.append(&mut self.pending);
                }
            }
            MatchPhase::MatchOver => {
                self.state.transition_timer = count_down(self.state.transition_timer, dt);
                if self.state.transition_timer <= 0.0 {
                    self.reset_to_menu();
                }
            }
            MatchPhase::Menu
            | MatchPhase::Options
            | MatchPhase::CharacterSelect
            | MatchPhase::Paused => {}
        }

        events
    }

    fn step_playing(&mut self, inputs: &[FighterInput; 2], dt: f32, events: &mut Vec<GameEvent>) {
        let config = &self.config;
        let Some(fighters) = self.state.fighters.as_mut() else {
            return;
        };

        let opponent_x = [fighters[1].x, fighters[0].x];
        for (i, fighter) in fighters.iter_mut().enumerate() {
            PhysicsSystem::update_fighter(fighter, &inputs[i], opponent_x[i], config, dt);
        }
        OverlapResolver::resolve(fighters, config);
        events.extend(CombatSystem::resolve_tick(fighters, inputs, config, dt));

        let ended = match (fighters[0].is_dead(), fighters[1].is_dead()) {
            (true, true) => Some((RoundOutcome::Draw, RoundEndReason::DoubleKnockout)),
            (true, false) => Some((
                RoundOutcome::Winner(PlayerSlot::Two),
                RoundEndReason::Knockout,
            )),
            (false, true) => Some((
                RoundOutcome::Winner(PlayerSlot::One),
                RoundEndReason::Knockout,
            )),
            (false, false) => {
                self.state.round_time_remaining = count_down(self.state.round_time_remaining, dt);
                if self.state.round_time_remaining <= 0.0 {
                    let outcome = match fighters[0].health.cmp(&fighters[1].health) {
                        std::cmp::Ordering::Greater => RoundOutcome::Winner(PlayerSlot::One),
                        std::cmp::Ordering::Less => RoundOutcome::Winner(PlayerSlot::Two),
                        std::cmp::Ordering::Equal => RoundOutcome::Draw,
                    };
                    Some((outcome, RoundEndReason::Timeout))
                } else {
                    None
                }
            }
        };

        if let Some((outcome, reason)) = ended {
            self.finish_round(outcome, reason, events);
        }
    }

    fn finish_round(
        &mut self,
        outcome: RoundOutcome,
        reason: RoundEndReason,
        events: &mut Vec<GameEvent>,
    ) {
        if let Some(winner) = outcome.winner() {
            self.state.round_wins[winner.index()] += 1;
        }
        self.state.last_outcome = Some(outcome);

        info!(
            round = self.state.round,
            outcome = ?outcome,
            reason = ?reason,
            p1_wins = self.state.round_wins[0],
            p2_wins = self.state.round_wins[1],
            "Round ended"
        );
        events.push(GameEvent::RoundEnded {
            round: self.state.round,
            outcome,
            reason,
            round_wins: self.state.round_wins,
        });

        let wins_to_match = self.config.wins_to_match;
        let champion = PlayerSlot::BOTH
            .into_iter()
            .find(|slot| self.state.round_wins[slot.index()] >= wins_to_match);

        match champion {
            Some(winner) => {
                self.state.winner = Some(winner);
                self.state.transition_timer = self.config.match_over_delay;
                self.transition(MatchPhase::MatchOver);
                info!(winner = ?winner, round_wins = ?self.state.round_wins, "Match ended");
                events.push(GameEvent::MatchEnded {
                    winner,
                    round_wins: self.state.round_wins,
                });
            }
            None => {
                self.state.transition_timer = self.config.round_over_delay;
                self.transition(MatchPhase::RoundOver);
            }
        }
    }

    fn begin_match(&mut self) {
        self.state.round = 1;
        self.state.round_wins = [0; 2];
        self.state.last_outcome = None;
        self.state.winner = None;
        self.state.paused_from = None;
        info!(
            p1 = self.session.selection(PlayerSlot::One),
            p2 = self.session.selection(PlayerSlot::Two),
            "Match started"
        );
        self.start_round();
    }

    /// Respawn both fighters and reset the round clock
    fn start_round(&mut self) {
        self.state.fighters = Some(self.session.spawn_fighters(&self.config));
        self.state.round_time_remaining = self.config.round_time_limit;
        self.state.transition_timer = 0.0;
        self.transition(MatchPhase::Playing);
        info!(round = self.state.round, "Round started");
        self.pending.push(GameEvent::RoundStarted {
            round: self.state.round,
        });
    }

    fn reset_to_menu(&mut self) {
        let tick = self.state.tick;
        self.state = MatchState {
            tick,
            ..MatchState::new()
        };
        self.pending.clear();
        debug!("Returned to menu");
    }

    fn transition(&mut self, to: MatchPhase) {
        debug!(from = %self.state.phase, to = %to, "Phase transition");
        self.state.phase = to;
    }
}
