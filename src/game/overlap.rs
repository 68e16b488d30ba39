//! Horizontal separation between the two fighters

use tracing::trace;

use crate::config::GameConfig;

use super::fighter::Fighter;
use super::PlayerSlot;

/// Outcome of one separation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Fighter that ended up on the left
    pub left: PlayerSlot,
    pub left_shift: f32,
    pub right_shift: f32,
    /// Overlap left over because both fighters are against the screen edges
    pub residual: f32,
}

/// Keeps fighter sprites from interpenetrating
///
/// Single pass: propose an even split of the overlap, clamp each half to the
/// room before its screen edge, then hand any unused share to the other side.
/// Residual contact up to `touch_tolerance` is accepted.
pub struct OverlapResolver;

impl OverlapResolver {
    /// Minimum centre distance for a pair of fighters
    pub fn min_distance(a: &Fighter, b: &Fighter, config: &GameConfig) -> f32 {
        config
            .min_fighter_distance
            .max(a.metrics.collision_half_width + b.metrics.collision_half_width)
    }

    /// Whether the fighters share a vertical band
    pub fn co_planar(a: &Fighter, b: &Fighter, config: &GameConfig) -> bool {
        (a.y - b.y).abs() <= config.vertical_separation_threshold
    }

    /// Push the fighters apart if they are closer than allowed
    pub fn resolve(fighters: &mut [Fighter; 2], config: &GameConfig) -> Option<Separation> {
        let [first, second] = fighters;
        if first.is_dead() || second.is_dead() {
            return None;
        }
        if !Self::co_planar(first, second, config) {
            return None;
        }

        let width = config.screen_width;
        first.clamp_to_screen(width);
        second.clamp_to_screen(width);

        let (left, right) = if first.x <= second.x {
            (first, second)
        } else {
            (second, first)
        };

        let min_distance = Self::min_distance(left, right, config);
        let current_distance = right.x - left.x;
        if current_distance >= min_distance - config.touch_tolerance {
            return None;
        }

        let overlap = min_distance - current_distance;
        let (left_min, _) = left.x_bounds(width);
        let (_, right_max) = right.x_bounds(width);
        let left_available = (left.x - left_min).max(0.0);
        let right_available = (right_max - right.x).max(0.0);

        let half_overlap = overlap / 2.0;
        let mut left_shift = half_overlap.min(left_available);
        let mut right_shift = half_overlap.min(right_available);
        let mut remaining = overlap - (left_shift + right_shift);

        if remaining > 0.0 && left_available > left_shift {
            let extra = remaining.min(left_available - left_shift);
            left_shift += extra;
            remaining -= extra;
        }
        if remaining > 0.0 && right_available > right_shift {
            let extra = remaining.min(right_available - right_shift);
            right_shift += extra;
            remaining -= extra;
        }

        left.x -= left_shift;
        right.x += right_shift;
        left.clamp_to_screen(width);
        right.clamp_to_screen(width);

        let separation = Separation {
            left: left.slot,
            left_shift,
            right_shift,
            residual: remaining.max(0.0),
        };
        trace!(
            left = ?separation.left,
            left_shift,
            right_shift,
            residual = separation.residual,
            "Separated fighters"
        );
        Some(separation)
    }
}
