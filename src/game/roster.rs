//! Fighter roster and the per-session selection context

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ConfigError, GameConfig};

use super::catalog::{AttackId, AttackOverride};
use super::fighter::{Fighter, FighterMetrics};
use super::r#match::MatchError;
use super::PlayerSlot;

/// A selectable fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub metrics: FighterMetrics,
    /// Per-fighter tweaks merged over the configured attack catalog
    #[serde(default)]
    pub attack_overrides: Vec<(AttackId, AttackOverride)>,
}

impl FighterProfile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            metrics: FighterMetrics::default(),
            attack_overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, id: AttackId, patch: AttackOverride) -> Self {
        self.attack_overrides.push((id, patch));
        self
    }

    /// Fresh fighter for a round, with full health at the slot's spawn
    pub fn spawn(&self, slot: PlayerSlot, config: &GameConfig) -> Fighter {
        Fighter::new(
            slot,
            self.id.clone(),
            self.display_name.clone(),
            self.metrics,
            config.attacks.merged(&self.attack_overrides),
            config,
        )
    }
}

/// The selectable fighters, never empty
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    profiles: Vec<FighterProfile>,
}

impl Roster {
    pub fn new(profiles: Vec<FighterProfile>) -> Result<Self, ConfigError> {
        if profiles.is_empty() {
            return Err(ConfigError::invalid("roster", "must contain at least one fighter"));
        }
        Ok(Self { profiles })
    }

    /// The fighters shipped with the game
    pub fn standard() -> Self {
        let profiles = vec![
            FighterProfile::new("tutankhamun", "Tutankhamun"),
            FighterProfile::new("charlemagne", "Charlemagne"),
            FighterProfile::new("knight_2", "Knight II"),
            FighterProfile::new("knight_3", "Knight III"),
            FighterProfile::new("samurai", "Samurai"),
            FighterProfile::new("samurai_archer", "Samurai Archer").with_override(
                AttackId::Special,
                AttackOverride {
                    effect: Some("arrow".to_string()),
                    ..Default::default()
                },
            ),
            FighterProfile::new("samurai_commander", "Samurai Commander"),
        ];
        Self { profiles }
    }

    pub fn get(&self, id: &str) -> Option<&FighterProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut FighterProfile> {
        self.profiles.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn first(&self) -> &FighterProfile {
        &self.profiles[0]
    }

    pub fn profiles(&self) -> &[FighterProfile] {
        &self.profiles
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::standard()
    }
}

/// Session-level choices handed to the match engine
///
/// Holds the roster and the two chosen fighter ids; the selection always
/// names a roster entry.
#[derive(Debug, Clone)]
pub struct SessionContext {
    roster: Roster,
    selection: [String; 2],
}

impl SessionContext {
    /// Unknown ids fall back to the first roster entry
    pub fn new(roster: Roster, selection: [String; 2]) -> Self {
        let selection = selection.map(|id| {
            if roster.contains(&id) {
                id
            } else {
                let fallback = roster.first().id.clone();
                warn!(requested = %id, fallback = %fallback, "Unknown fighter, using fallback");
                fallback
            }
        });
        Self { roster, selection }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn selection(&self, slot: PlayerSlot) -> &str {
        &self.selection[slot.index()]
    }

    pub fn select(&mut self, slot: PlayerSlot, id: &str) -> Result<(), MatchError> {
        if !self.roster.contains(id) {
            return Err(MatchError::UnknownFighter(id.to_string()));
        }
        self.selection[slot.index()] = id.to_string();
        Ok(())
    }

    /// Replace the sprite metrics measured by the asset layer
    pub fn set_metrics(&mut self, id: &str, metrics: FighterMetrics) -> Result<(), MatchError> {
        metrics
            .validate()
            .map_err(|e| MatchError::InvalidMetrics {
                fighter: id.to_string(),
                reason: e.to_string(),
            })?;
        let profile = self
            .roster
            .get_mut(id)
            .ok_or_else(|| MatchError::UnknownFighter(id.to_string()))?;
        profile.metrics = metrics;
        Ok(())
    }

    pub fn profile(&self, slot: PlayerSlot) -> &FighterProfile {
        self.roster
            .get(self.selection(slot))
            .unwrap_or_else(|| self.roster.first())
    }

    /// Two fresh fighters for the current selection
    pub fn spawn_fighters(&self, config: &GameConfig) -> [Fighter; 2] {
        PlayerSlot::BOTH.map(|slot| self.profile(slot).spawn(slot, config))
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(
            Roster::standard(),
            ["tutankhamun".to_string(), "charlemagne".to_string()],
        )
    }
}
