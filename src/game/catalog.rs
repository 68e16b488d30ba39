//! Attack catalog - immutable attack definitions keyed by attack id

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Attack ids, in activation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackId {
    /// Fast, light hit
    Punch,
    /// Medium hit with longer reach animation
    Kick,
    /// Slow, heavy hit that may carry an effect
    Special,
}

impl AttackId {
    /// All attack ids, highest priority first
    pub const ALL: [AttackId; 3] = [AttackId::Punch, AttackId::Kick, AttackId::Special];

    pub const COUNT: usize = Self::ALL.len();

    pub const fn index(self) -> usize {
        match self {
            Self::Punch => 0,
            Self::Kick => 1,
            Self::Special => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Punch => "punch",
            Self::Kick => "kick",
            Self::Special => "special",
        }
    }
}

/// A single attack definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub name: String,
    /// Damage dealt on hit
    pub damage: u32,
    /// Seconds before the attack can be used again
    pub cooldown: f32,
    /// Seconds the attack animation runs
    pub animation_duration: f32,
    /// Fraction of the animation at which the hit becomes active
    pub hit_frame_ratio: f32,
    /// Opaque tag for the VFX/audio layer
    #[serde(default)]
    pub effect: Option<String>,
}

impl AttackSpec {
    /// Attack whose animation runs for its whole cooldown
    pub fn new(id: AttackId, damage: u32, cooldown: f32, hit_frame_ratio: f32) -> Self {
        Self {
            name: id.as_str().to_string(),
            damage,
            cooldown,
            animation_duration: cooldown,
            hit_frame_ratio,
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    pub fn with_animation_duration(mut self, duration: f32) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Seconds after activation at which the hit check fires
    pub fn hit_time(&self) -> f32 {
        self.hit_frame_ratio * self.animation_duration
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.damage == 0 {
            return Err(ConfigError::invalid(field, "damage must be positive"));
        }
        if !(self.cooldown > 0.0) {
            return Err(ConfigError::invalid(field, "cooldown must be positive"));
        }
        if !(self.animation_duration > 0.0) {
            return Err(ConfigError::invalid(
                field,
                "animation duration must be positive",
            ));
        }
        if !(self.hit_frame_ratio > 0.0 && self.hit_frame_ratio <= 1.0) {
            return Err(ConfigError::invalid(
                field,
                "hit frame ratio must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Partial attack definition merged over a base spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackOverride {
    pub damage: Option<u32>,
    pub cooldown: Option<f32>,
    pub animation_duration: Option<f32>,
    pub hit_frame_ratio: Option<f32>,
    pub effect: Option<String>,
}

impl AttackOverride {
    fn apply(&self, mut spec: AttackSpec) -> AttackSpec {
        if let Some(damage) = self.damage {
            spec.damage = damage;
        }
        if let Some(cooldown) = self.cooldown {
            spec.cooldown = cooldown;
            // Animation stays stretched over the cooldown unless set explicitly
            if self.animation_duration.is_none() {
                spec.animation_duration = cooldown;
            }
        }
        if let Some(duration) = self.animation_duration {
            spec.animation_duration = duration;
        }
        if let Some(ratio) = self.hit_frame_ratio {
            spec.hit_frame_ratio = ratio;
        }
        if let Some(effect) = &self.effect {
            spec.effect = Some(effect.clone());
        }
        spec
    }
}

/// Lookup table from attack id to spec
///
/// A missing entry means the fighter cannot perform that attack; inputs for it
/// are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackCatalog {
    pub punch: Option<AttackSpec>,
    pub kick: Option<AttackSpec>,
    pub special: Option<AttackSpec>,
}

impl AttackCatalog {
    pub fn empty() -> Self {
        Self {
            punch: None,
            kick: None,
            special: None,
        }
    }

    /// The base profiles every fighter starts from
    pub fn standard() -> Self {
        Self {
            punch: Some(AttackSpec::new(AttackId::Punch, 8, 0.45, 0.5)),
            kick: Some(AttackSpec::new(AttackId::Kick, 12, 0.7, 0.55)),
            special: Some(AttackSpec::new(AttackId::Special, 20, 1.2, 0.6)),
        }
    }

    pub fn get(&self, id: AttackId) -> Option<&AttackSpec> {
        self.slot(id).as_ref()
    }

    pub fn insert(&mut self, id: AttackId, spec: AttackSpec) {
        *self.slot_mut(id) = Some(spec);
    }

    pub fn remove(&mut self, id: AttackId) -> Option<AttackSpec> {
        self.slot_mut(id).take()
    }

    /// Iterate defined attacks in priority order
    pub fn iter(&self) -> impl Iterator<Item = (AttackId, &AttackSpec)> {
        AttackId::ALL
            .into_iter()
            .filter_map(move |id| self.get(id).map(|spec| (id, spec)))
    }

    /// Merge per-fighter overrides over this catalog
    ///
    /// An override for an attack absent from the base creates nothing; a
    /// fighter only gains an attack the base catalog defines.
    pub fn merged(&self, overrides: &[(AttackId, AttackOverride)]) -> Self {
        let mut merged = self.clone();
        for (id, patch) in overrides {
            if let Some(base) = merged.remove(*id) {
                merged.insert(*id, patch.apply(base));
            }
        }
        merged
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, spec) in self.iter() {
            let field = match id {
                AttackId::Punch => "attacks.punch",
                AttackId::Kick => "attacks.kick",
                AttackId::Special => "attacks.special",
            };
            spec.validate(field)?;
        }
        Ok(())
    }

    fn slot(&self, id: AttackId) -> &Option<AttackSpec> {
        match id {
            AttackId::Punch => &self.punch,
            AttackId::Kick => &self.kick,
            AttackId::Special => &self.special,
        }
    }

    fn slot_mut(&mut self, id: AttackId) -> &mut Option<AttackSpec> {
        match id {
            AttackId::Punch => &mut self.punch,
            AttackId::Kick => &mut self.kick,
            AttackId::Special => &mut self.special,
        }
    }
}

impl Default for AttackCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
