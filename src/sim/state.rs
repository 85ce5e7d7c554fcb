//! Entity model and simulation state
//!
//! The simulation exclusively owns every entity collection. Nothing here is
//! shared outside a step; hosts read a `FrameSnapshot` instead.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use crate::clamp_to_unit;
use crate::consts::*;
use crate::error::ConfigError;
use crate::highscores::HighScore;
use crate::input::{InputBinding, InputContext};
use crate::tuning::{FieldConfig, GameConfig, PlayerConfig};

/// Full dash meter
pub const BOOST_METER_MAX: f32 = 100.0;

/// Menu sub-phase while players pick their devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuStage {
    /// Waiting for player 1 to press something
    AwaitingFirst,
    /// Player 1 bound; player 2 may bind or skip
    AwaitingSecond,
    /// Both slots resolved (transient: the round starts the same frame)
    Ready,
}

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    MenuSelectInput(MenuStage),
    Playing,
    /// Frozen; only `owner` (or the universal trigger) may resume
    Paused { owner: usize },
    GameOver,
}

/// Collectible kinds, cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Gem,
    Orb,
    Star,
}

impl CollectibleKind {
    pub const ALL: [CollectibleKind; 3] = [Self::Gem, Self::Orb, Self::Star];

    pub fn name(&self) -> &'static str {
        match self {
            CollectibleKind::Gem => "gem",
            CollectibleKind::Orb => "orb",
            CollectibleKind::Star => "star",
        }
    }
}

/// A player avatar. Created once per slot, deactivated and reactivated but
/// never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub slot: usize,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
    pub score: u32,
    /// Dash meter in [0, 100]
    pub boost_meter: f32,
    pub boosting: bool,
    /// Cleared when the meter hits 0, restored at the recharge threshold
    pub can_boost: bool,
    /// Current movement speed, derived from the boost state
    pub speed: f32,
    pub binding: InputBinding,
    /// 0xRRGGBB
    pub color: u32,
}

impl Player {
    pub fn new(slot: usize, config: &GameConfig) -> Self {
        Self {
            slot,
            pos: Self::spawn_position(slot, &config.field),
            radius: config.player.radius,
            active: false,
            score: 0,
            boost_meter: BOOST_METER_MAX,
            boosting: false,
            can_boost: true,
            speed: config.player.normal_speed,
            binding: InputBinding::None,
            color: PLAYER_COLORS[slot % MAX_PLAYERS],
        }
    }

    /// Start position: one third across, stacked by slot
    pub fn spawn_position(slot: usize, field: &FieldConfig) -> Vec2 {
        let y_frac = if slot == 0 { 1.0 / 3.0 } else { 2.0 / 3.0 };
        Vec2::new(field.width / 3.0, field.height * y_frac)
    }

    /// Put the player back at the start line with a full meter.
    /// Activation follows the binding.
    pub fn reset(&mut self, config: &GameConfig) {
        self.pos = Self::spawn_position(self.slot, &config.field);
        self.radius = config.player.radius;
        self.score = 0;
        self.boost_meter = BOOST_METER_MAX;
        self.boosting = false;
        self.can_boost = true;
        self.speed = config.player.normal_speed;
        self.active = self.binding != InputBinding::None;
    }

    /// Meter is recovering from a full depletion
    pub fn is_exhausted(&self) -> bool {
        !self.can_boost && self.boost_meter < BOOST_METER_MAX
    }

    /// Advance the dash state machine by one (scaled) frame and pick a speed.
    pub fn update_boost(&mut self, wants_boost: bool, scale: f32, cfg: &PlayerConfig) {
        if wants_boost && self.boost_meter > 0.0 && self.can_boost {
            self.boosting = true;
            self.speed = cfg.boost_speed;
            self.boost_meter -= cfg.boost_drain * scale;
            if self.boost_meter <= 0.0 {
                self.boost_meter = 0.0;
                self.can_boost = false;
            }
            return;
        }

        self.boosting = false;
        self.speed = if self.can_boost {
            cfg.normal_speed
        } else {
            cfg.exhausted_speed
        };

        if self.boost_meter < BOOST_METER_MAX {
            self.boost_meter = (self.boost_meter + cfg.boost_regen * scale).min(BOOST_METER_MAX);
            if !self.can_boost && self.boost_meter >= cfg.boost_recharge_threshold {
                self.can_boost = true;
                self.speed = cfg.normal_speed;
            }
        }
    }

    /// Move along `dir` (clamped to unit length) and clamp to the play area
    pub fn integrate(&mut self, dir: Vec2, scale: f32, field: &FieldConfig) {
        self.pos += clamp_to_unit(dir) * self.speed * scale;
        self.clamp_to_field(field);
    }

    pub fn clamp_to_field(&mut self, field: &FieldConfig) {
        let min_x = field.play_left() + self.radius;
        let max_x = (field.play_right() - self.radius).max(min_x);
        let min_y = field.play_top() + self.radius;
        let max_y = (field.play_bottom() - self.radius).max(min_y);
        self.pos.x = self.pos.x.clamp(min_x, max_x);
        self.pos.y = self.pos.y.clamp(min_y, max_y);
    }
}

/// A scrolling bar with a vertical gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    pub gap_start: f32,
    pub gap_end: f32,
    /// Per-slot "already scored" flag
    pub passed: [bool; MAX_PLAYERS],
}

impl Obstacle {
    pub fn gap_size(&self) -> f32 {
        self.gap_end - self.gap_start
    }

    pub fn right(&self, width: f32) -> f32 {
        self.x + width
    }

    /// Whether `y` lies inside the gap band (inclusive)
    pub fn gap_contains(&self, y: f32) -> bool {
        y >= self.gap_start && y <= self.gap_end
    }
}

/// A pickup floating between two obstacles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub pos: Vec2,
    pub radius: f32,
    pub points: u32,
    pub color: u32,
    pub collected: bool,
    pub active: bool,
    /// Pulse animation phase
    pub pulse: f32,
}

/// Floating "+N" indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub points: u32,
    pub color: u32,
    /// 1.0 fresh, removed at 0
    pub opacity: f32,
    /// Vertical velocity (negative rises)
    pub velocity: f32,
}

impl ScorePopup {
    pub fn new(pos: Vec2, points: u32, color: u32) -> Self {
        Self {
            pos,
            points,
            color,
            opacity: 1.0,
            velocity: POPUP_RISE_SPEED,
        }
    }

    /// Rise and fade; returns false once fully transparent
    pub fn update(&mut self, scale: f32) -> bool {
        self.pos.y += self.velocity * scale;
        self.opacity -= POPUP_FADE_RATE * scale;
        self.opacity > 0.0
    }
}

/// Session bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub phase: SessionPhase,
    /// Host timestamp the current elapsed time is measured from
    pub start_ms: f64,
    /// Accumulated play time; frozen while paused or after game over
    pub elapsed_ms: f64,
    /// Whole elapsed seconds
    pub time: u32,
    pub high_score: HighScore,
    pub active_players: usize,
    pub single_player: bool,
    /// Last elapsed second that triggered a difficulty increase
    pub last_difficulty_mark: u32,
    /// Elapsed seconds captured at game over
    pub final_time: Option<u32>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            phase: SessionPhase::MenuSelectInput(MenuStage::AwaitingFirst),
            start_ms: 0.0,
            elapsed_ms: 0.0,
            time: 0,
            high_score: HighScore::default(),
            active_players: 0,
            single_player: false,
            last_difficulty_mark: 0,
            final_time: None,
        }
    }
}

impl SessionStats {
    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    /// Some(player) iff paused
    pub fn pause_owner(&self) -> Option<usize> {
        match self.phase {
            SessionPhase::Paused { owner } => Some(owner),
            _ => None,
        }
    }

    pub fn menu_stage(&self) -> Option<MenuStage> {
        match self.phase {
            SessionPhase::MenuSelectInput(stage) => Some(stage),
            _ => None,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub(super) config: GameConfig,
    pub players: [Player; MAX_PLAYERS],
    /// Ordered left to right (spawn order)
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub popups: Vec<ScorePopup>,
    pub stats: SessionStats,
    /// Current obstacle scroll speed (units per reference frame)
    pub scroll_speed: f32,
    /// Gap size given to newly spawned obstacles
    pub gap_size: f32,
    /// Scroll distance since the last obstacle spawn
    pub spawn_accumulator: f32,
    /// Timestamp of the previous step
    pub last_frame_ms: Option<f64>,
    /// Steps taken since construction
    pub frame: u64,
    /// Events emitted by the most recent step
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl SimulationState {
    /// Validate `config` and build a fresh session sitting in the menu
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let players = [Player::new(0, &config), Player::new(1, &config)];
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            scroll_speed: config.obstacles.initial_speed,
            gap_size: config.obstacles.initial_gap_size,
            config,
            players,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            popups: Vec::new(),
            stats: SessionStats::default(),
            spawn_accumulator: 0.0,
            last_frame_ms: None,
            frame: 0,
            events: Vec::new(),
            next_id: 1,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn bindings(&self) -> [InputBinding; MAX_PLAYERS] {
        [self.players[0].binding, self.players[1].binding]
    }

    /// What the input layer needs to know to resolve this frame
    pub fn input_context(&self) -> InputContext {
        InputContext {
            bindings: self.bindings(),
            single_player: self.stats.single_player,
            menu_stage: self.stats.menu_stage(),
        }
    }

    pub fn scores(&self) -> [u32; MAX_PLAYERS] {
        [self.players[0].score, self.players[1].score]
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
