//! Autopilot steering for demo sessions and long-running tests
//!
//! Reads the state like a player would and produces the same `PlayerIntent`
//! a device would. Aims for the gap of the next obstacle, detouring for
//! collectibles that sit before it.

use glam::Vec2;

use crate::input::PlayerIntent;
use crate::sim::SimulationState;

/// Vertical error (in units) below which the autopilot stops correcting
const SETTLE_DISTANCE: f32 = 4.0;
/// Boost when the gap is this close and the player is still off-line
const BOOST_LOOKAHEAD: f32 = 180.0;

/// Steer the player in `slot`
pub fn steer(state: &SimulationState, slot: usize) -> PlayerIntent {
    let Some(player) = state.players.get(slot).filter(|p| p.active) else {
        return PlayerIntent::default();
    };
    let config = state.config();
    let width = config.obstacles.width;
    let home_x = config.field.width / 3.0;

    // Nearest obstacle the player has not fully cleared
    let next = state
        .obstacles
        .iter()
        .filter(|o| o.right(width) + player.radius >= player.pos.x)
        .min_by(|a, b| a.x.total_cmp(&b.x));

    let Some(obstacle) = next else {
        let dir = Vec2::new(home_x - player.pos.x, 0.0);
        return PlayerIntent {
            move_dir: steer_axis(dir),
            boost: false,
        };
    };

    let gap_margin = player.radius + 2.0;
    let safe_top = obstacle.gap_start + gap_margin;
    let safe_bottom = (obstacle.gap_end - gap_margin).max(safe_top);
    let gap_center = (safe_top + safe_bottom) * 0.5;

    // Detour for a pickup that sits before the obstacle and inside reach
    let distance = obstacle.x - player.pos.x;
    let reach = distance.max(0.0) / state.scroll_speed.max(0.1) * player.speed;
    let pickup_y = state
        .collectibles
        .iter()
        .filter(|c| c.active && c.pos.x > player.pos.x && c.pos.x < obstacle.x)
        .filter(|c| (c.pos.y - player.pos.y).abs() + (c.pos.y - gap_center).abs() < reach)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
        .map(|c| c.pos.y);

    let target_y = pickup_y.unwrap_or(gap_center);
    let error_y = target_y - player.pos.y;
    let in_lane = player.pos.y >= safe_top && player.pos.y <= safe_bottom;

    let dir = Vec2::new(
        (home_x - player.pos.x) * 0.05,
        if error_y.abs() < SETTLE_DISTANCE { 0.0 } else { error_y },
    );
    let boost = !in_lane && distance < BOOST_LOOKAHEAD && player.can_boost;

    PlayerIntent {
        move_dir: steer_axis(dir),
        boost,
    }
}

/// Unit direction for large errors, proportional below one unit
fn steer_axis(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 1.0 { v / len } else { v }
}
