//! Dot Dash - a two-player scrolling arcade dodger
//!
//! Core modules:
//! - `sim`: Simulation step, spawner, entity model and session state machine
//! - `input`: Device snapshots to normalized per-player intent
//! - `tuning`: Data-driven game balance
//! - `snapshot`: Read-only per-frame render feed
//! - `audio`: Sound cue mapping for the audio collaborator
//! - `highscores`: In-memory session high score
//! - `autopilot`: Steering helper for demos and tests

pub mod audio;
pub mod autopilot;
pub mod error;
pub mod highscores;
pub mod input;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::ConfigError;
pub use highscores::HighScore;
pub use tuning::GameConfig;

use glam::Vec2;

/// Game-wide constants that are not balance parameters
pub mod consts {
    /// Number of player slots
    pub const MAX_PLAYERS: usize = 2;

    /// Reference frame rate the per-frame rates are tuned for
    pub const TARGET_FPS: f64 = 60.0;
    /// Duration of one reference frame in milliseconds
    pub const TARGET_FRAME_MS: f64 = 1000.0 / TARGET_FPS;
    /// Upper bound on a single frame's scale (a 100 ms stall)
    pub const MAX_FRAME_SCALE: f32 = 6.0;

    /// Player colors (0xRRGGBB), red and blue
    pub const PLAYER_COLORS: [u32; MAX_PLAYERS] = [0xff3333, 0x3333ff];

    /// Score popup motion
    pub const POPUP_RISE_SPEED: f32 = -1.5;
    pub const POPUP_FADE_RATE: f32 = 0.02;

    /// Collectible pulse animation step per reference frame
    pub const COLLECTIBLE_PULSE_STEP: f32 = 0.1;
}

/// Convert a frame duration into a multiplier relative to a 60 Hz frame.
///
/// Negative or NaN durations (clock went backwards) yield 0; long stalls are
/// capped at [`consts::MAX_FRAME_SCALE`].
#[inline]
pub fn frame_scale(dt_ms: f64) -> f32 {
    let scale = (dt_ms / consts::TARGET_FRAME_MS) as f32;
    if scale.is_nan() {
        return 0.0;
    }
    scale.clamp(0.0, consts::MAX_FRAME_SCALE)
}

/// Scale a vector down to unit length if it is longer than 1.
#[inline]
pub fn clamp_to_unit(v: Vec2) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > 1.0 { v / len_sq.sqrt() } else { v }
}
