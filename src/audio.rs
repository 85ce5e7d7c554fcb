//! Sound cue mapping
//!
//! The simulation never plays sound. The host drains the step's events
//! through `AudioSettings::cues` and hands each cue name to its synthesizer.

use serde::{Deserialize, Serialize};

use crate::sim::{CollectibleKind, GameEvent};

/// Closed set of sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    /// Gem collected
    Gem,
    /// Orb collected
    Orb,
    /// Star collected
    Star,
    /// A player died
    Death,
}

impl AudioCue {
    pub fn name(&self) -> &'static str {
        match self {
            AudioCue::Gem => "gem",
            AudioCue::Orb => "orb",
            AudioCue::Star => "star",
            AudioCue::Death => "death",
        }
    }

    /// Cue for an event, if it makes a sound
    pub fn from_event(event: &GameEvent) -> Option<AudioCue> {
        match event {
            GameEvent::Collected { kind, .. } => Some(match kind {
                CollectibleKind::Gem => AudioCue::Gem,
                CollectibleKind::Orb => AudioCue::Orb,
                CollectibleKind::Star => AudioCue::Star,
            }),
            GameEvent::PlayerDied { .. } => Some(AudioCue::Death),
            _ => None,
        }
    }
}

/// Volume controls applied to every cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl AudioSettings {
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Cues to play for a step's events, with their gain. Empty when silent.
    pub fn cues(&self, events: &[GameEvent]) -> Vec<(AudioCue, f32)> {
        let gain = self.effective_volume();
        if gain <= 0.0 {
            return Vec::new();
        }
        events
            .iter()
            .filter_map(AudioCue::from_event)
            .map(|cue| (cue, gain))
            .collect()
    }
}
