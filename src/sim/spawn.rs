//! Procedural obstacle and collectible generation
//!
//! Obstacles appear every `spawn_distance` units of scroll. Each new obstacle
//! may bring a collectible placed in the corridor behind it, outside both
//! neighbouring gap bands.

use glam::Vec2;
use rand::Rng;

use super::state::{Collectible, CollectibleKind, Obstacle, SimulationState};
use crate::consts::MAX_PLAYERS;
use crate::tuning::{FieldConfig, ObstacleConfig, PhaseWeights};

/// Pick a gap `[start, start + gap_size)` inside the play band minus margins.
///
/// An inverted range (gap too large for the field) collapses to its lower
/// bound instead of sampling a negative span.
pub fn place_gap<R: Rng>(
    rng: &mut R,
    field: &FieldConfig,
    obstacles: &ObstacleConfig,
    gap_size: f32,
) -> (f32, f32) {
    let min_start = field.play_top() + obstacles.edge_margin;
    let max_start = field.play_bottom() - gap_size - obstacles.edge_margin;
    let start = if max_start > min_start {
        rng.random_range(min_start..max_start)
    } else {
        log::warn!("Gap of {} does not fit the play band, pinning to {}", gap_size, min_start);
        min_start
    };
    (start, start + gap_size)
}

/// Rejection-sample a y in `[top, bottom)` that lies outside every obstacle's
/// gap band.
///
/// Returns `None` when every attempt lands inside a band or the range is
/// empty; callers skip the spawn rather than force a bad position.
pub fn place_outside_bands<R: Rng>(
    rng: &mut R,
    top: f32,
    bottom: f32,
    obstacles: &[&Obstacle],
    attempts: u32,
) -> Option<f32> {
    if bottom <= top {
        return None;
    }
    (0..attempts)
        .map(|_| rng.random_range(top..bottom))
        .find(|&y| !obstacles.iter().any(|o| o.gap_contains(y)))
}

/// Random x in the corridor between two obstacles, keeping `clearance` from
/// the left obstacle's right edge and the right obstacle's left edge.
pub fn corridor_x<R: Rng>(
    rng: &mut R,
    left_obstacle_x: f32,
    right_obstacle_x: f32,
    width: f32,
    clearance: f32,
) -> f32 {
    let lo = left_obstacle_x + width + clearance;
    let span = (right_obstacle_x - clearance - lo).max(0.0);
    lo + rng.random::<f32>() * span
}

/// Single uniform draw mapped through the phase distribution
pub fn pick_kind<R: Rng>(rng: &mut R, weights: &PhaseWeights) -> CollectibleKind {
    weights.pick(rng.random::<f32>())
}

impl SimulationState {
    /// Accumulate scroll distance and spawn at most one obstacle.
    ///
    /// The spawn distance is subtracted, not reset, so the sub-threshold
    /// remainder carries into the next obstacle.
    pub(crate) fn advance_spawner(&mut self, scale: f32) {
        self.spawn_accumulator += self.scroll_speed * scale;
        let spawn_distance = self.config.obstacles.spawn_distance;
        if self.spawn_accumulator >= spawn_distance {
            self.spawn_obstacle();
            self.spawn_accumulator -= spawn_distance;
        }
    }

    /// Emit one obstacle at the right edge of the play area
    pub fn spawn_obstacle(&mut self) {
        let id = self.next_entity_id();
        let (gap_start, gap_end) = place_gap(
            &mut self.rng,
            &self.config.field,
            &self.config.obstacles,
            self.gap_size,
        );

        self.obstacles.push(Obstacle {
            id,
            x: self.config.field.play_right(),
            gap_start,
            gap_end,
            passed: [false; MAX_PLAYERS],
        });

        if self.obstacles.len() > 1 {
            let n = self.obstacles.len();
            self.spawn_collectible_between(n - 2, n - 1);
        }
    }

    /// Maybe place a collectible between two obstacles (by index)
    fn spawn_collectible_between(&mut self, prev: usize, curr: usize) {
        let cfg = &self.config.collectibles;
        if self.rng.random::<f32>() >= cfg.spawn_rate {
            return;
        }

        let phase = cfg.phase_at(self.stats.time);
        let kind = pick_kind(&mut self.rng, cfg.weights(phase));
        let spec = cfg.spec(kind).clone();

        let height = self.config.field.height;
        let top = cfg.edge_buffer + spec.radius;
        let bottom = height - cfg.edge_buffer - spec.radius;
        let neighbours = [&self.obstacles[prev], &self.obstacles[curr]];
        let (left_x, right_x) = (neighbours[0].x, neighbours[1].x);
        let attempts = cfg.placement_attempts;
        let clearance = cfg.horizontal_clearance;

        let Some(y) = place_outside_bands(&mut self.rng, top, bottom, &neighbours, attempts) else {
            log::debug!("No collectible placement after {} attempts, skipping", attempts);
            return;
        };
        let width = self.config.obstacles.width;
        let x = corridor_x(&mut self.rng, left_x, right_x, width, clearance);

        let id = self.next_entity_id();
        self.collectibles.push(Collectible {
            id,
            kind,
            pos: Vec2::new(x, y),
            radius: spec.radius,
            points: spec.points,
            color: spec.color,
            collected: false,
            active: true,
            pulse: 0.0,
        });
    }
}
