//! Events emitted during a simulation step.
//!
//! The render and audio collaborators consume these instead of being called
//! from inside collision code. The list is cleared at the start of each step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::CollectibleKind;
use crate::consts::MAX_PLAYERS;
use crate::input::InputBinding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Collision,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultySource {
    /// Elapsed-time mark
    Time,
    /// Legacy score threshold
    Score,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Collected {
        player: usize,
        kind: CollectibleKind,
        points: u32,
        pos: Vec2,
        color: u32,
    },
    ObstaclePassed {
        player: usize,
        score: u32,
    },
    PlayerDied {
        player: usize,
        cause: DeathCause,
    },
    DifficultyChanged {
        source: DifficultySource,
        speed: f32,
        gap_size: f32,
    },
    DeviceBound {
        player: usize,
        binding: InputBinding,
    },
    RoundStarted {
        players: usize,
    },
    Paused {
        owner: usize,
    },
    Resumed,
    GameOver {
        final_time: u32,
        scores: [u32; MAX_PLAYERS],
    },
    ReturnedToMenu,
}
