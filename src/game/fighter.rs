//! Per-player physical and combat state

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, GameConfig};

use super::catalog::{AttackCatalog, AttackId};
use super::PlayerSlot;

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Facing from `x` toward `target_x`; equal positions face right
    pub fn toward(x: f32, target_x: f32) -> Self {
        if x <= target_x {
            Self::Right
        } else {
            Self::Left
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Sprite-derived measurements, produced by the asset layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FighterMetrics {
    /// Half the drawn sprite width; bounds the sprite centre on screen
    pub half_width: f32,
    /// Half the visible body width used for separation
    pub collision_half_width: f32,
    /// Drawn sprite height
    pub height: f32,
}

impl Default for FighterMetrics {
    fn default() -> Self {
        Self {
            half_width: 100.0,
            collision_half_width: 45.0,
            height: 300.0,
        }
    }
}

impl FighterMetrics {
    /// Reject measurements that would put the sprite centre off screen
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.half_width.is_finite() && self.half_width > 0.0) {
            return Err(ConfigError::invalid("metrics.half_width", "must be positive"));
        }
        if !(self.collision_half_width.is_finite() && self.collision_half_width >= 0.0) {
            return Err(ConfigError::invalid(
                "metrics.collision_half_width",
                "must not be negative",
            ));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ConfigError::invalid("metrics.height", "must be positive"));
        }
        Ok(())
    }
}

/// An attack in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveAttack {
    pub id: AttackId,
    /// Seconds since activation
    pub elapsed: f32,
    /// Whether this activation already ran its hit check
    pub hit_resolved: bool,
}

/// Presentation pose consumed by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pose", content = "attack", rename_all = "snake_case")]
pub enum Pose {
    Idle,
    Run,
    Jump,
    Fall,
    Attack(AttackId),
    TakeHit,
    Death,
}

/// Authoritative fighter state
#[derive(Debug, Clone)]
pub struct Fighter {
    pub slot: PlayerSlot,
    pub profile_id: String,
    pub display_name: String,
    pub metrics: FighterMetrics,
    pub attacks: AttackCatalog,
    pub spawn_x: f32,

    // Position and movement
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub facing: Facing,
    pub on_ground: bool,
    pub jump_count: u8,
    pub jump_held: bool,

    // Combat
    pub health: u32,
    pub max_health: u32,
    pub active_attack: Option<ActiveAttack>,
    pub cooldowns: [f32; AttackId::COUNT],
    pub invincible_remaining: f32,
    pub hit_flash_remaining: f32,
}

impl Fighter {
    pub fn new(
        slot: PlayerSlot,
        profile_id: impl Into<String>,
        display_name: impl Into<String>,
        metrics: FighterMetrics,
        attacks: AttackCatalog,
        config: &GameConfig,
    ) -> Self {
        let spawn_x = config.spawn_x[slot.index()];
        let mut fighter = Self {
            slot,
            profile_id: profile_id.into(),
            display_name: display_name.into(),
            metrics,
            attacks,
            spawn_x,
            x: spawn_x,
            y: config.ground_y,
            vel_x: 0.0,
            vel_y: 0.0,
            facing: Facing::Right,
            on_ground: true,
            jump_count: 0,
            jump_held: false,
            health: config.max_health,
            max_health: config.max_health,
            active_attack: None,
            cooldowns: [0.0; AttackId::COUNT],
            invincible_remaining: 0.0,
            hit_flash_remaining: 0.0,
        };
        fighter.reset(config);
        fighter
    }

    /// Back to spawn with full health, grounded and idle
    pub fn reset(&mut self, config: &GameConfig) {
        self.x = self.spawn_x;
        self.y = config.ground_y;
        self.vel_x = 0.0;
        self.vel_y = 0.0;
        self.facing = if self.spawn_x < config.screen_width / 2.0 {
            Facing::Right
        } else {
            Facing::Left
        };
        self.on_ground = true;
        self.jump_count = 0;
        self.jump_held = false;
        self.health = self.max_health;
        self.active_attack = None;
        self.cooldowns = [0.0; AttackId::COUNT];
        self.invincible_remaining = 0.0;
        self.hit_flash_remaining = 0.0;
        self.clamp_to_screen(config.screen_width);
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn is_attacking(&self) -> bool {
        self.active_attack.is_some()
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_remaining > 0.0
    }

    pub fn cooldown(&self, id: AttackId) -> f32 {
        self.cooldowns[id.index()]
    }

    pub fn cancel_attack(&mut self) {
        self.active_attack = None;
    }

    /// Lowest and highest x the sprite centre may occupy
    pub fn x_bounds(&self, screen_width: f32) -> (f32, f32) {
        let half = self.metrics.half_width;
        // A sprite wider than the arena is centred
        if half * 2.0 >= screen_width {
            let mid = screen_width / 2.0;
            return (mid, mid);
        }
        (half, screen_width - half)
    }

    pub fn clamp_to_screen(&mut self, screen_width: f32) {
        let (min_x, max_x) = self.x_bounds(screen_width);
        self.x = self.x.clamp(min_x, max_x);
    }

    pub fn pose(&self) -> Pose {
        if self.is_dead() {
            Pose::Death
        } else if let Some(attack) = &self.active_attack {
            Pose::Attack(attack.id)
        } else if self.hit_flash_remaining > 0.0 {
            Pose::TakeHit
        } else if !self.on_ground {
            if self.vel_y > 0.0 {
                Pose::Jump
            } else {
                Pose::Fall
            }
        } else if self.vel_x != 0.0 {
            Pose::Run
        } else {
            Pose::Idle
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fighter(slot: PlayerSlot, config: &GameConfig) -> Fighter {
        Fighter::new(
            slot,
            "test",
            "Test Fighter",
            FighterMetrics::default(),
            config.attacks.clone(),
            config,
        )
    }

    #[test]
    fn new_fighter_spawns_grounded_with_full_health() {
        let config = GameConfig::default();
        let p1 = fighter(PlayerSlot::One, &config);
        let p2 = fighter(PlayerSlot::Two, &config);

        assert_eq!(p1.x, 400.0);
        assert_eq!(p2.x, 900.0);
        assert_eq!(p1.y, config.ground_y);
        assert_eq!(p1.health, config.max_health);
        assert_eq!(p1.jump_count, 0);
        assert_eq!(p1.facing, Facing::Right);
        assert_eq!(p2.facing, Facing::Left);
        assert_eq!(p1.pose(), Pose::Idle);
    }

    #[test]
    fn reset_clears_combat_state() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);
        p1.x = 1000.0;
        p1.health = 0;
        p1.cooldowns = [1.0; AttackId::COUNT];
        p1.invincible_remaining = 0.2;
        p1.active_attack = Some(ActiveAttack {
            id: AttackId::Kick,
            elapsed: 0.1,
            hit_resolved: false,
        });

        p1.reset(&config);

        assert_eq!(p1.x, 400.0);
        assert_eq!(p1.health, config.max_health);
        assert!(p1.active_attack.is_none());
        assert_eq!(p1.cooldowns, [0.0; AttackId::COUNT]);
        assert!(!p1.is_invincible());
    }

    #[test]
    fn clamp_keeps_sprite_on_screen() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        p1.x = -50.0;
        p1.clamp_to_screen(config.screen_width);
        assert_eq!(p1.x, 100.0);

        p1.x = 5000.0;
        p1.clamp_to_screen(config.screen_width);
        assert_eq!(p1.x, config.screen_width - 100.0);
    }

    #[test]
    fn metrics_must_be_positive_and_finite() {
        FighterMetrics::default().validate().unwrap();

        for metrics in [
            FighterMetrics {
                half_width: 0.0,
                ..Default::default()
            },
            FighterMetrics {
                half_width: -40.0,
                ..Default::default()
            },
            FighterMetrics {
                half_width: f32::NAN,
                ..Default::default()
            },
            FighterMetrics {
                collision_half_width: -1.0,
                ..Default::default()
            },
            FighterMetrics {
                height: f32::INFINITY,
                ..Default::default()
            },
        ] {
            assert!(metrics.validate().is_err(), "accepted {metrics:?}");
        }
    }

    #[test]
    fn pose_follows_state() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        p1.vel_x = 360.0;
        assert_eq!(p1.pose(), Pose::Run);

        p1.on_ground = false;
        p1.vel_y = 100.0;
        assert_eq!(p1.pose(), Pose::Jump);
        p1.vel_y = -100.0;
        assert_eq!(p1.pose(), Pose::Fall);

        p1.active_attack = Some(ActiveAttack {
            id: AttackId::Punch,
            elapsed: 0.0,
            hit_resolved: false,
        });
        assert_eq!(p1.pose(), Pose::Attack(AttackId::Punch));

        p1.health = 0;
        assert_eq!(p1.pose(), Pose::Death);
    }
}
