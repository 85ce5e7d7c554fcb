//! Collision tests between players, obstacles and collectibles
//!
//! Obstacles are axis-aligned bars spanning the play area with one open
//! band; players and collectibles are circles.

use glam::Vec2;

use super::state::Obstacle;

/// How a circle relates to an obstacle this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleContact {
    /// No horizontal overlap with the bar
    Clear,
    /// Overlapping the bar horizontally but fully inside the gap
    InGap,
    /// Touching the solid part of the bar
    Hit,
}

/// Classify a circle against an obstacle of the given bar width
pub fn obstacle_contact(pos: Vec2, radius: f32, obstacle: &Obstacle, width: f32) -> ObstacleContact {
    let overlaps_x = pos.x + radius > obstacle.x && pos.x - radius < obstacle.right(width);
    if !overlaps_x {
        return ObstacleContact::Clear;
    }

    let above_gap = pos.y - radius < obstacle.gap_start;
    let below_gap = pos.y + radius > obstacle.gap_end;
    if above_gap || below_gap {
        ObstacleContact::Hit
    } else {
        ObstacleContact::InGap
    }
}

/// The circle's center is past the bar's right edge
#[inline]
pub fn has_cleared(pos: Vec2, obstacle: &Obstacle, width: f32) -> bool {
    pos.x > obstacle.right(width)
}

/// Strict overlap of two circles
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}
