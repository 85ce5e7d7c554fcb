//! Read-only render feed
//!
//! An owned copy of everything presentation needs for one frame. Hosts hold
//! it across the JS boundary as JSON; it never aliases simulation state.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PLAYERS;
use crate::sim::{
    Collectible, GameEvent, Obstacle, Player, ScorePopup, SessionPhase, SessionStats,
    SimulationState,
};
use crate::tuning::FieldConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub phase: SessionPhase,
    pub players: Vec<Player>,
    /// Per-slot "meter recovering" flag for the HUD
    pub exhausted: [bool; MAX_PLAYERS],
    /// A living player sits on the session record
    pub high_score_held: bool,
    pub obstacles: Vec<Obstacle>,
    pub obstacle_width: f32,
    pub collectibles: Vec<Collectible>,
    pub popups: Vec<ScorePopup>,
    pub stats: SessionStats,
    pub scroll_speed: f32,
    pub gap_size: f32,
    pub field: FieldConfig,
    pub events: Vec<GameEvent>,
}

impl FrameSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl SimulationState {
    /// Freeze the current frame for presentation and audio
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            phase: self.stats.phase,
            players: self.players.to_vec(),
            exhausted: [self.players[0].is_exhausted(), self.players[1].is_exhausted()],
            high_score_held: self.stats.high_score.is_held(&self.players),
            obstacles: self.obstacles.clone(),
            obstacle_width: self.config().obstacles.width,
            collectibles: self.collectibles.clone(),
            popups: self.popups.clone(),
            stats: self.stats.clone(),
            scroll_speed: self.scroll_speed,
            gap_size: self.gap_size,
            field: self.config().field.clone(),
            events: self.events.clone(),
        }
    }
}
