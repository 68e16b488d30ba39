//! Fighter movement, gravity and ground contact

use crate::config::GameConfig;

use super::fighter::{Facing, Fighter};
use super::FighterInput;

/// Jumps available before touching the ground again
pub const MAX_JUMPS: u8 = 2;

/// Physics system for updating fighter positions and velocities
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Integrate one tick of input and gravity
    ///
    /// `opponent_x` is the opponent's position before this tick so both
    /// fighters see the same frame regardless of update order.
    pub fn update_fighter(
        fighter: &mut Fighter,
        input: &FighterInput,
        opponent_x: f32,
        config: &GameConfig,
        dt: f32,
    ) {
        let was_airborne = !fighter.on_ground;

        if fighter.is_dead() {
            fighter.vel_x = 0.0;
        } else {
            fighter.vel_x = input.direction() * config.player_speed;
        }
        fighter.x += fighter.vel_x * dt;

        if !fighter.is_dead() {
            if !fighter.is_attacking() {
                fighter.facing = Facing::toward(fighter.x, opponent_x);
            }

            // Only the press edge jumps; holding the button does nothing
            let jump_pressed = input.jump && !fighter.jump_held;
            if jump_pressed && fighter.jump_count < MAX_JUMPS {
                fighter.vel_y = config.jump_speed;
                fighter.on_ground = false;
                fighter.jump_count += 1;
            }
            fighter.jump_held = input.jump;
        }

        let landed = Self::apply_gravity(fighter, config, dt);
        if landed && was_airborne {
            fighter.cancel_attack();
        }

        fighter.clamp_to_screen(config.screen_width);
    }

    /// Accelerate downward and resolve ground contact, returns true on contact
    pub fn apply_gravity(fighter: &mut Fighter, config: &GameConfig, dt: f32) -> bool {
        fighter.vel_y -= config.gravity * dt;
        fighter.y += fighter.vel_y * dt;

        if fighter.y <= config.ground_y {
            fighter.y = config.ground_y;
            fighter.vel_y = 0.0;
            fighter.on_ground = true;
            fighter.jump_count = 0;
            true
        } else {
            fighter.on_ground = false;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::AttackId;
    use crate::game::fighter::tests::fighter;
    use crate::game::fighter::ActiveAttack;
    use crate::game::PlayerSlot;

    const DT: f32 = 1.0 / 60.0;

    fn held(move_left: bool, move_right: bool, jump: bool) -> FighterInput {
        FighterInput {
            move_left,
            move_right,
            jump,
            attacks: Vec::new(),
        }
    }

    #[test]
    fn horizontal_speed_is_set_directly() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        PhysicsSystem::update_fighter(&mut p1, &held(false, true, false), 900.0, &config, DT);
        assert_eq!(p1.vel_x, config.player_speed);
        assert!((p1.x - (400.0 + config.player_speed * DT)).abs() < 1e-3);

        PhysicsSystem::update_fighter(&mut p1, &held(false, false, false), 900.0, &config, DT);
        assert_eq!(p1.vel_x, 0.0);
    }

    #[test]
    fn opposite_directions_cancel() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        PhysicsSystem::update_fighter(&mut p1, &held(true, true, false), 900.0, &config, DT);
        assert_eq!(p1.x, 400.0);
    }

    #[test]
    fn faces_opponent_unless_attacking() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        PhysicsSystem::update_fighter(&mut p1, &FighterInput::default(), 100.0, &config, DT);
        assert_eq!(p1.facing, Facing::Left);

        p1.active_attack = Some(ActiveAttack {
            id: AttackId::Punch,
            elapsed: 0.0,
            hit_resolved: false,
        });
        PhysicsSystem::update_fighter(&mut p1, &FighterInput::default(), 900.0, &config, DT);
        assert_eq!(p1.facing, Facing::Left);
    }

    #[test]
    fn double_jump_then_no_more() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        PhysicsSystem::update_fighter(&mut p1, &held(false, false, true), 900.0, &config, DT);
        assert_eq!(p1.jump_count, 1);
        assert!(!p1.on_ground);

        PhysicsSystem::update_fighter(&mut p1, &held(false, false, false), 900.0, &config, DT);
        PhysicsSystem::update_fighter(&mut p1, &held(false, false, true), 900.0, &config, DT);
        assert_eq!(p1.jump_count, 2);
        let vel_after_second = p1.vel_y;

        PhysicsSystem::update_fighter(&mut p1, &held(false, false, false), 900.0, &config, DT);
        PhysicsSystem::update_fighter(&mut p1, &held(false, false, true), 900.0, &config, DT);
        assert_eq!(p1.jump_count, 2);
        assert!(p1.vel_y < vel_after_second);
    }

    #[test]
    fn holding_jump_does_not_retrigger() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        for _ in 0..10 {
            PhysicsSystem::update_fighter(&mut p1, &held(false, false, true), 900.0, &config, DT);
        }
        assert_eq!(p1.jump_count, 1);
    }

    #[test]
    fn landing_resets_jumps_and_clamps_to_ground() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        PhysicsSystem::update_fighter(&mut p1, &held(false, false, true), 900.0, &config, DT);
        let mut ticks = 0;
        while !p1.on_ground {
            PhysicsSystem::update_fighter(&mut p1, &FighterInput::default(), 900.0, &config, DT);
            ticks += 1;
            assert!(ticks < 600, "fighter never landed");
        }

        assert_eq!(p1.y, config.ground_y);
        assert_eq!(p1.vel_y, 0.0);
        assert_eq!(p1.jump_count, 0);
    }

    #[test]
    fn landing_cancels_air_attack() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);
        p1.y = config.ground_y + 1.0;
        p1.vel_y = -300.0;
        p1.on_ground = false;
        p1.active_attack = Some(ActiveAttack {
            id: AttackId::Kick,
            elapsed: 0.1,
            hit_resolved: false,
        });

        PhysicsSystem::update_fighter(&mut p1, &FighterInput::default(), 900.0, &config, DT);
        assert!(p1.on_ground);
        assert!(p1.active_attack.is_none());
    }

    #[test]
    fn grounded_attack_survives_standing_still() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);
        p1.active_attack = Some(ActiveAttack {
            id: AttackId::Kick,
            elapsed: 0.1,
            hit_resolved: false,
        });

        PhysicsSystem::update_fighter(&mut p1, &FighterInput::default(), 900.0, &config, DT);
        assert!(p1.active_attack.is_some());
    }

    #[test]
    fn dead_fighter_ignores_input_but_falls() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);
        p1.health = 0;
        p1.y = config.ground_y + 200.0;
        p1.on_ground = false;

        PhysicsSystem::update_fighter(&mut p1, &held(false, true, true), 900.0, &config, DT);
        assert_eq!(p1.x, 400.0);
        assert_eq!(p1.jump_count, 0);
        assert!(p1.y < config.ground_y + 200.0);

        for _ in 0..120 {
            PhysicsSystem::update_fighter(&mut p1, &held(false, true, true), 900.0, &config, DT);
        }
        assert_eq!(p1.y, config.ground_y);
        assert!(p1.on_ground);
    }

    #[test]
    fn walking_stops_at_screen_edge() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        for _ in 0..300 {
            PhysicsSystem::update_fighter(&mut p1, &held(true, false, false), 900.0, &config, DT);
        }
        assert_eq!(p1.x, p1.metrics.half_width);
    }

    #[test]
    fn jump_count_stays_in_range() {
        let config = GameConfig::default();
        let mut p1 = fighter(PlayerSlot::One, &config);

        for tick in 0..1200u32 {
            let input = held(tick % 7 == 0, tick % 5 == 0, tick % 3 == 0);
            PhysicsSystem::update_fighter(&mut p1, &input, 900.0, &config, DT);
            assert!(p1.jump_count <= MAX_JUMPS);
            assert!(p1.y >= config.ground_y);
        }
    }
}
