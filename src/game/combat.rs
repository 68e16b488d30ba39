//! Combat system - attack activation, hit frames, damage, invincibility

use tracing::debug;

use crate::config::GameConfig;
use crate::util::time::count_down;

use super::catalog::AttackId;
use super::events::GameEvent;
use super::fighter::{ActiveAttack, Fighter};
use super::overlap::OverlapResolver;
use super::{FighterInput, PlayerSlot};

/// Raised once per activation when an attack reaches its hit frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitCheck {
    pub attacker: PlayerSlot,
    pub attack: AttackId,
}

/// Hit result from combat resolution
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub attacker: PlayerSlot,
    pub defender: PlayerSlot,
    pub attack: AttackId,
    pub damage: u32,
    pub effect: Option<String>,
}

/// Combat system for managing attacks and damage
pub struct CombatSystem;

impl CombatSystem {
    /// Count cooldowns, invincibility and hit flash down by one tick
    pub fn update_timers(fighter: &mut Fighter, dt: f32) {
        for cooldown in fighter.cooldowns.iter_mut() {
            *cooldown = count_down(*cooldown, dt);
        }
        fighter.invincible_remaining = count_down(fighter.invincible_remaining, dt);
        fighter.hit_flash_remaining = count_down(fighter.hit_flash_remaining, dt);
    }

    /// Activate the highest-priority requested attack that is ready
    ///
    /// Requests while attacking, on cooldown, or for attacks the fighter does
    /// not have are dropped without queuing.
    pub fn try_start_attack(fighter: &mut Fighter, input: &FighterInput) -> Option<AttackId> {
        if fighter.is_dead() || fighter.is_attacking() {
            return None;
        }

        for id in AttackId::ALL {
            if !input.wants_attack(id) || fighter.cooldown(id) > 0.0 {
                continue;
            }
            let Some(cooldown) = fighter.attacks.get(id).map(|spec| spec.cooldown) else {
                continue;
            };

            fighter.active_attack = Some(ActiveAttack {
                id,
                elapsed: 0.0,
                hit_resolved: false,
            });
            fighter.cooldowns[id.index()] = cooldown;
            return Some(id);
        }
        None
    }

    /// Advance the active attack, returning its hit check on the hit frame
    pub fn advance_attack(fighter: &mut Fighter, dt: f32) -> Option<HitCheck> {
        let active = fighter.active_attack?;
        let Some(spec) = fighter.attacks.get(active.id) else {
            fighter.cancel_attack();
            return None;
        };

        let elapsed = active.elapsed + dt;
        let mut hit_resolved = active.hit_resolved;
        let mut check = None;
        if !hit_resolved && elapsed >= spec.hit_time() {
            hit_resolved = true;
            check = Some(HitCheck {
                attacker: fighter.slot,
                attack: active.id,
            });
        }

        fighter.active_attack = if elapsed > spec.animation_duration {
            None
        } else {
            Some(ActiveAttack {
                id: active.id,
                elapsed,
                hit_resolved,
            })
        };
        check
    }

    /// Whether an attack released now by `attacker` lands on `defender`
    pub fn connects(attacker: &Fighter, defender: &Fighter, config: &GameConfig) -> bool {
        (attacker.x - defender.x).abs() <= config.attack_range
            && !defender.is_dead()
            && !defender.is_invincible()
            && OverlapResolver::co_planar(attacker, defender, config)
    }

    /// Apply damage to health, returns (new_health, is_dead)
    pub fn apply_damage(current_health: u32, damage: u32) -> (u32, bool) {
        let new_health = current_health.saturating_sub(damage);
        (new_health, new_health == 0)
    }

    /// Land a hit on the defender, returns true on knockout
    pub fn apply_hit(defender: &mut Fighter, damage: u32, config: &GameConfig) -> bool {
        let (new_health, killed) = Self::apply_damage(defender.health, damage);
        defender.health = new_health;
        defender.invincible_remaining = config.invincibility_duration;
        defender.hit_flash_remaining = config.hit_flash_duration;
        defender.cancel_attack();
        if killed {
            defender.vel_x = 0.0;
        }
        killed
    }

    /// Run one combat tick for both fighters
    ///
    /// Hit checks from both fighters are evaluated against the same positions
    /// before any damage is applied, so trades land for both sides.
    pub fn resolve_tick(
        fighters: &mut [Fighter; 2],
        inputs: &[FighterInput; 2],
        config: &GameConfig,
        dt: f32,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for fighter in fighters.iter_mut() {
            Self::update_timers(fighter, dt);
        }

        let mut checks: Vec<HitCheck> = Vec::new();
        for (fighter, input) in fighters.iter_mut().zip(inputs.iter()) {
            if fighter.is_dead() {
                continue;
            }
            if fighter.is_attacking() {
                if let Some(check) = Self::advance_attack(fighter, dt) {
                    checks.push(check);
                }
            } else if let Some(attack) = Self::try_start_attack(fighter, input) {
                events.push(GameEvent::AttackStarted {
                    fighter: fighter.slot,
                    attack,
                    effect: fighter.attacks.get(attack).and_then(|spec| spec.effect.clone()),
                });
            }
        }

        let hits: Vec<HitResult> = checks
            .into_iter()
            .filter_map(|check| {
                let attacker = &fighters[check.attacker.index()];
                let defender = &fighters[check.attacker.opponent().index()];
                if !Self::connects(attacker, defender, config) {
                    debug!(attacker = ?check.attacker, attack = ?check.attack, "Attack whiffed");
                    return None;
                }
                let spec = attacker.attacks.get(check.attack)?;
                Some(HitResult {
                    attacker: check.attacker,
                    defender: defender.slot,
                    attack: check.attack,
                    damage: spec.damage,
                    effect: spec.effect.clone(),
                })
            })
            .collect();

        for hit in hits {
            let defender = &mut fighters[hit.defender.index()];
            let knocked_out = Self::apply_hit(defender, hit.damage, config);
            debug!(
                attacker = ?hit.attacker,
                defender = ?hit.defender,
                attack = ?hit.attack,
                damage = hit.damage,
                health = defender.health,
                "Hit landed"
            );

            events.push(GameEvent::HitLanded {
                attacker: hit.attacker,
                defender: hit.defender,
                attack: hit.attack,
                damage: hit.damage,
                defender_health: defender.health,
                effect: hit.effect,
            });
            if knocked_out {
                events.push(GameEvent::KnockOut {
                    fighter: hit.defender,
                });
            }
        }

        events
    }
}
