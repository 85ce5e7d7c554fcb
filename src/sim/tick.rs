//! Per-frame simulation step
//!
//! Order within one step is fixed: session input, clock, movement, spawning
//! and scrolling, obstacle collisions and scoring, collectibles, popups,
//! time difficulty, high score. Later stages read what earlier ones wrote.

use super::collision::{ObstacleContact, circles_overlap, has_cleared, obstacle_contact};
use super::event::{DeathCause, DifficultySource, GameEvent};
use super::state::{ScorePopup, SimulationState};
use crate::consts::{COLLECTIBLE_PULSE_STEP, MAX_PLAYERS};
use crate::frame_scale;
use crate::input::FrameInput;

/// Advance the simulation to host time `now_ms`
pub fn tick(state: &mut SimulationState, input: &FrameInput, now_ms: f64) {
    state.events.clear();
    let scale = match state.last_frame_ms {
        Some(prev) => frame_scale(now_ms - prev),
        None => 1.0,
    };
    state.last_frame_ms = Some(now_ms);
    state.frame += 1;

    state.handle_session_input(input, now_ms);

    if state.stats.is_playing() {
        update_clock(state, now_ms);
        move_players(state, input, scale);
        state.advance_spawner(scale);
        scroll_obstacles(state, scale);
        resolve_obstacles(state);
        resolve_collectibles(state, scale);
        update_popups(state, scale);
        if state.stats.is_playing() {
            apply_time_difficulty(state);
        }
    }

    state.stats.high_score.observe(&state.players);
}

fn update_clock(state: &mut SimulationState, now_ms: f64) {
    let stats = &mut state.stats;
    stats.elapsed_ms = (now_ms - stats.start_ms).max(0.0);
    stats.time = (stats.elapsed_ms / 1000.0).floor() as u32;
}

fn move_players(state: &mut SimulationState, input: &FrameInput, scale: f32) {
    let config = &state.config;
    for (player, frame) in state.players.iter_mut().zip(input.players.iter()) {
        if !player.active {
            continue;
        }
        player.update_boost(frame.intent.boost, scale, &config.player);
        player.integrate(frame.intent.move_dir, scale, &config.field);
    }
}

fn scroll_obstacles(state: &mut SimulationState, scale: f32) {
    let dx = state.scroll_speed * scale;
    let width = state.config.obstacles.width;
    for obstacle in state.obstacles.iter_mut() {
        obstacle.x -= dx;
    }
    state.obstacles.retain(|o| o.right(width) >= 0.0);
}

/// Collisions first, then pass scoring, per player in slot order
fn resolve_obstacles(state: &mut SimulationState) {
    let width = state.config.obstacles.width;
    for slot in 0..MAX_PLAYERS {
        for index in 0..state.obstacles.len() {
            let player = &state.players[slot];
            if !player.active {
                break;
            }
            let (pos, radius) = (player.pos, player.radius);
            let obstacle = &state.obstacles[index];

            if obstacle_contact(pos, radius, obstacle, width) == ObstacleContact::Hit {
                state.kill_player(slot, DeathCause::Collision);
                break;
            }

            if !obstacle.passed[slot] && has_cleared(pos, obstacle, width) {
                state.obstacles[index].passed[slot] = true;
                state.players[slot].score += 1;
                let score = state.players[slot].score;
                state.emit(GameEvent::ObstaclePassed {
                    player: slot,
                    score,
                });
                let leading = state
                    .players
                    .iter()
                    .filter(|p| p.active)
                    .map(|p| p.score)
                    .max()
                    .unwrap_or(score);
                apply_score_difficulty(state, leading);
            }
        }
    }
}

/// Legacy thresholds, keyed on the leading active score, evaluated on every pass
fn apply_score_difficulty(state: &mut SimulationState, score: u32) {
    let rules = &state.config.difficulty.score_rules;
    if !rules.enabled || score == 0 {
        return;
    }

    let mut changed = false;
    if score % rules.speedup_interval == 0 && state.scroll_speed < rules.speed_cap {
        state.scroll_speed += rules.speedup_amount;
        changed = true;
    }
    if score % rules.gap_shrink_interval == 0 {
        let shrunk = (state.gap_size - rules.gap_shrink_rate)
            .max(state.config.obstacles.minimum_gap_size);
        if shrunk < state.gap_size {
            state.gap_size = shrunk;
            changed = true;
        }
    }

    if changed {
        log::info!(
            "Leading score {} difficulty: speed {:.2}, gap {:.1}",
            score,
            state.scroll_speed,
            state.gap_size
        );
        state.emit(GameEvent::DifficultyChanged {
            source: DifficultySource::Score,
            speed: state.scroll_speed,
            gap_size: state.gap_size,
        });
    }
}

/// Scroll, animate and claim collectibles. First player in slot order wins.
fn resolve_collectibles(state: &mut SimulationState, scale: f32) {
    let dx = state.scroll_speed * scale;
    for index in 0..state.collectibles.len() {
        let c = &mut state.collectibles[index];
        c.pos.x -= dx;
        c.pulse += COLLECTIBLE_PULSE_STEP * scale;
        if !c.active || c.collected {
            continue;
        }
        let (pos, radius) = (c.pos, c.radius);

        let claimant = state
            .players
            .iter()
            .position(|p| p.active && circles_overlap(p.pos, p.radius, pos, radius));
        let Some(slot) = claimant else {
            continue;
        };

        let c = &mut state.collectibles[index];
        c.collected = true;
        c.active = false;
        let (kind, points, color) = (c.kind, c.points, c.color);

        let player = &mut state.players[slot];
        player.score += points;
        let player_color = player.color;
        state.popups.push(ScorePopup::new(pos, points, player_color));
        state.emit(GameEvent::Collected {
            player: slot,
            kind,
            points,
            pos,
            color,
        });
    }

    state
        .collectibles
        .retain(|c| c.active && !c.collected && c.pos.x + c.radius >= 0.0);
}

fn update_popups(state: &mut SimulationState, scale: f32) {
    state.popups.retain_mut(|p| p.update(scale));
}

/// Once per distinct elapsed second divisible by the interval
fn apply_time_difficulty(state: &mut SimulationState) {
    let d = &state.config.difficulty;
    let time = state.stats.time;
    if time == 0 || time % d.time_interval != 0 || state.stats.last_difficulty_mark == time {
        return;
    }

    state.stats.last_difficulty_mark = time;
    state.scroll_speed += d.speed_increase;
    state.gap_size = (state.gap_size - d.gap_decrease).max(state.config.obstacles.minimum_gap_size);

    log::info!(
        "Difficulty increased at {}s: speed {:.2}, gap {:.1}",
        time,
        state.scroll_speed,
        state.gap_size
    );
    state.emit(GameEvent::DifficultyChanged {
        source: DifficultySource::Time,
        speed: state.scroll_speed,
        gap_size: state.gap_size,
    });
}
