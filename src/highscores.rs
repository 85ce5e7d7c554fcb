//! Session high score
//!
//! Lives only in memory for the lifetime of the simulation; survives
//! restarts and trips back to the menu, never written anywhere.

use serde::{Deserialize, Serialize};

use crate::sim::Player;

/// Best score seen this session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u32,
}

impl HighScore {
    /// Fold in the current scores. Returns true if the record moved.
    ///
    /// Inactive players count too, so a score banked on the frame a player
    /// dies is never lost.
    pub fn observe(&mut self, players: &[Player]) -> bool {
        let top = players.iter().map(|p| p.score).max().unwrap_or(0);
        if top > self.best {
            self.best = top;
            true
        } else {
            false
        }
    }

    /// An active player currently sits on the record (HUD highlight)
    pub fn is_held(&self, players: &[Player]) -> bool {
        self.best > 0 && players.iter().any(|p| p.active && p.score == self.best)
    }
}
