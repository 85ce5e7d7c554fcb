//! Data-driven game balance
//!
//! Every number the simulation reads lives here. A `GameConfig` is validated
//! once, moved into the simulation and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::CollectibleKind;

/// Tolerance for phase weight sums
const WEIGHT_EPSILON: f32 = 1e-3;

/// Complete balance configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub player: PlayerConfig,
    pub obstacles: ObstacleConfig,
    pub difficulty: DifficultyConfig,
    pub collectibles: CollectibleConfig,
}

/// Playfield geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Inset of the playable rectangle from every field edge
    pub padding: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            padding: 20.0,
        }
    }
}

impl FieldConfig {
    #[inline]
    pub fn play_left(&self) -> f32 {
        self.padding
    }

    #[inline]
    pub fn play_right(&self) -> f32 {
        self.width - self.padding
    }

    #[inline]
    pub fn play_top(&self) -> f32 {
        self.padding
    }

    #[inline]
    pub fn play_bottom(&self) -> f32 {
        self.height - self.padding
    }

    #[inline]
    pub fn playable_height(&self) -> f32 {
        self.play_bottom() - self.play_top()
    }
}

/// Player movement and dash meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub normal_speed: f32,
    pub boost_speed: f32,
    /// Speed while the meter recovers from a full depletion
    pub exhausted_speed: f32,
    /// Meter drained per reference frame while boosting
    pub boost_drain: f32,
    /// Meter regained per reference frame while not boosting
    pub boost_regen: f32,
    /// Meter level that re-enables boosting after depletion
    pub boost_recharge_threshold: f32,
    pub radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            normal_speed: 6.0,
            boost_speed: 10.0,
            exhausted_speed: 4.5,
            boost_drain: 0.7,
            boost_regen: 0.2,
            boost_recharge_threshold: 50.0,
            radius: 10.0,
        }
    }
}

/// Obstacle bars and their gaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Scroll speed at round start (units per reference frame)
    pub initial_speed: f32,
    pub width: f32,
    /// Scroll distance between consecutive obstacles
    pub spawn_distance: f32,
    pub initial_gap_size: f32,
    pub minimum_gap_size: f32,
    /// Minimum distance between a gap and the top/bottom of the play area
    pub edge_margin: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            initial_speed: 5.0,
            width: 30.0,
            spawn_distance: 300.0,
            initial_gap_size: 150.0,
            minimum_gap_size: 50.0,
            edge_margin: 40.0,
        }
    }
}

/// Difficulty progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Seconds between time-based difficulty increases
    pub time_interval: u32,
    pub speed_increase: f32,
    pub gap_decrease: f32,
    pub score_rules: ScoreDifficulty,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            time_interval: 15,
            speed_increase: 0.25,
            gap_decrease: 5.0,
            score_rules: ScoreDifficulty::default(),
        }
    }
}

/// Legacy score-driven difficulty, evaluated whenever an obstacle is passed.
///
/// With the default numbers the speed rule never fires (the scroll speed
/// starts above the cap); only the slow gap shrink is noticeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreDifficulty {
    pub enabled: bool,
    /// Speed up every N points of the leading score
    pub speedup_interval: u32,
    pub speedup_amount: f32,
    /// Speed-ups only apply below this scroll speed
    pub speed_cap: f32,
    /// Shrink the gap every N points of the leading score
    pub gap_shrink_interval: u32,
    pub gap_shrink_rate: f32,
}

impl Default for ScoreDifficulty {
    fn default() -> Self {
        Self {
            enabled: true,
            speedup_interval: 5,
            speedup_amount: 0.1,
            speed_cap: 3.5,
            gap_shrink_interval: 10,
            gap_shrink_rate: 1.0,
        }
    }
}

/// Point value, size and color of one collectible kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleSpec {
    pub points: u32,
    pub radius: f32,
    /// 0xRRGGBB
    pub color: u32,
}

/// Elapsed-time bracket selecting the collectible distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectiblePhase {
    Early,
    Mid,
    Late,
}

/// Discrete distribution over collectible kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeights {
    pub gem: f32,
    pub orb: f32,
    pub star: f32,
}

impl PhaseWeights {
    pub fn sum(&self) -> f32 {
        self.gem + self.orb + self.star
    }

    /// Inverse-CDF pick for a uniform draw `r` in [0, 1)
    pub fn pick(&self, r: f32) -> CollectibleKind {
        if r < self.gem {
            CollectibleKind::Gem
        } else if r < self.gem + self.orb {
            CollectibleKind::Orb
        } else {
            CollectibleKind::Star
        }
    }
}

/// Collectible spawning and kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleConfig {
    /// Probability of attempting a collectible for each new obstacle
    pub spawn_rate: f32,
    /// Vertical keep-out from the field's top and bottom edges
    pub edge_buffer: f32,
    /// Horizontal keep-out from each neighbouring obstacle's body
    pub horizontal_clearance: f32,
    /// Rejection-sampling attempts for a vertical position
    pub placement_attempts: u32,
    /// Last second (inclusive) of the early phase
    pub early_until_secs: u32,
    /// Last second (inclusive) of the mid phase
    pub mid_until_secs: u32,
    pub early: PhaseWeights,
    pub mid: PhaseWeights,
    pub late: PhaseWeights,
    pub gem: CollectibleSpec,
    pub orb: CollectibleSpec,
    pub star: CollectibleSpec,
}

impl Default for CollectibleConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 0.4,
            edge_buffer: 40.0,
            horizontal_clearance: 40.0,
            placement_attempts: 10,
            early_until_secs: 30,
            mid_until_secs: 90,
            early: PhaseWeights {
                gem: 0.95,
                orb: 0.05,
                star: 0.0,
            },
            mid: PhaseWeights {
                gem: 0.8,
                orb: 0.15,
                star: 0.05,
            },
            late: PhaseWeights {
                gem: 0.5,
                orb: 0.35,
                star: 0.15,
            },
            gem: CollectibleSpec {
                points: 1,
                radius: 10.0,
                color: 0x42f5a7,
            },
            orb: CollectibleSpec {
                points: 5,
                radius: 15.0,
                color: 0x8a2be2,
            },
            star: CollectibleSpec {
                points: 10,
                radius: 25.0,
                color: 0xffff00,
            },
        }
    }
}

impl CollectibleConfig {
    /// Phase for a whole number of elapsed seconds
    pub fn phase_at(&self, elapsed_secs: u32) -> CollectiblePhase {
        if elapsed_secs <= self.early_until_secs {
            CollectiblePhase::Early
        } else if elapsed_secs <= self.mid_until_secs {
            CollectiblePhase::Mid
        } else {
            CollectiblePhase::Late
        }
    }

    pub fn weights(&self, phase: CollectiblePhase) -> &PhaseWeights {
        match phase {
            CollectiblePhase::Early => &self.early,
            CollectiblePhase::Mid => &self.mid,
            CollectiblePhase::Late => &self.late,
        }
    }

    pub fn spec(&self, kind: CollectibleKind) -> &CollectibleSpec {
        match kind {
            CollectibleKind::Gem => &self.gem,
            CollectibleKind::Orb => &self.orb,
            CollectibleKind::Star => &self.star,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // Written so NaN fails too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn weights_valid(phase: &'static str, w: &PhaseWeights) -> Result<(), ConfigError> {
    in_range("collectibles.weights.gem", w.gem, 0.0, 1.0)?;
    in_range("collectibles.weights.orb", w.orb, 0.0, 1.0)?;
    in_range("collectibles.weights.star", w.star, 0.0, 1.0)?;
    let sum = w.sum();
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(ConfigError::PhaseWeights { phase, sum });
    }
    Ok(())
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make placement or physics degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.field;
        positive("field.width", f.width)?;
        positive("field.height", f.height)?;
        in_range("field.padding", f.padding, 0.0, f.width.min(f.height) / 2.0)?;

        let p = &self.player;
        positive("player.normal_speed", p.normal_speed)?;
        positive("player.boost_speed", p.boost_speed)?;
        positive("player.exhausted_speed", p.exhausted_speed)?;
        positive("player.boost_drain", p.boost_drain)?;
        positive("player.boost_regen", p.boost_regen)?;
        positive("player.radius", p.radius)?;
        in_range(
            "player.boost_recharge_threshold",
            p.boost_recharge_threshold,
            f32::MIN_POSITIVE,
            100.0,
        )?;

        let o = &self.obstacles;
        positive("obstacles.initial_speed", o.initial_speed)?;
        positive("obstacles.width", o.width)?;
        positive("obstacles.spawn_distance", o.spawn_distance)?;
        positive("obstacles.minimum_gap_size", o.minimum_gap_size)?;
        in_range("obstacles.edge_margin", o.edge_margin, 0.0, f32::MAX)?;
        if o.minimum_gap_size > o.initial_gap_size {
            return Err(ConfigError::MinimumGapAboveInitial {
                minimum: o.minimum_gap_size,
                initial: o.initial_gap_size,
            });
        }
        if o.initial_gap_size + 2.0 * o.edge_margin > f.playable_height() {
            return Err(ConfigError::GapTooLarge {
                gap: o.initial_gap_size,
                playable: f.playable_height(),
                margin: o.edge_margin,
            });
        }

        let d = &self.difficulty;
        positive("difficulty.time_interval", d.time_interval as f32)?;
        in_range("difficulty.speed_increase", d.speed_increase, 0.0, f32::MAX)?;
        in_range("difficulty.gap_decrease", d.gap_decrease, 0.0, f32::MAX)?;
        let s = &d.score_rules;
        if s.enabled {
            positive("difficulty.score_rules.speedup_interval", s.speedup_interval as f32)?;
            positive(
                "difficulty.score_rules.gap_shrink_interval",
                s.gap_shrink_interval as f32,
            )?;
            in_range("difficulty.score_rules.speedup_amount", s.speedup_amount, 0.0, f32::MAX)?;
            in_range("difficulty.score_rules.gap_shrink_rate", s.gap_shrink_rate, 0.0, f32::MAX)?;
        }

        let c = &self.collectibles;
        in_range("collectibles.spawn_rate", c.spawn_rate, 0.0, 1.0)?;
        in_range("collectibles.edge_buffer", c.edge_buffer, 0.0, f.height / 2.0)?;
        in_range("collectibles.horizontal_clearance", c.horizontal_clearance, 0.0, f32::MAX)?;
        if c.early_until_secs > c.mid_until_secs {
            return Err(ConfigError::PhaseOrder {
                early: c.early_until_secs,
                mid: c.mid_until_secs,
            });
        }
        weights_valid("early", &c.early)?;
        weights_valid("mid", &c.mid)?;
        weights_valid("late", &c.late)?;
        for kind in CollectibleKind::ALL {
            positive("collectibles.radius", c.spec(kind).radius)?;
        }

        Ok(())
    }
}
