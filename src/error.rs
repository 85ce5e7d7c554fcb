//! Configuration errors
//!
//! The simulation step itself never fails; everything that can go wrong is
//! caught when a `GameConfig` is validated.

/// Reasons a configuration is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("gap of {gap} does not fit a playable height of {playable} with {margin} edge margins")]
    GapTooLarge { gap: f32, playable: f32, margin: f32 },

    #[error("minimum gap {minimum} exceeds initial gap {initial}")]
    MinimumGapAboveInitial { minimum: f32, initial: f32 },

    #[error("{phase} phase weights sum to {sum}, expected 1")]
    PhaseWeights { phase: &'static str, sum: f32 },

    #[error("phase boundaries out of order: early ends at {early}s, mid ends at {mid}s")]
    PhaseOrder { early: u32, mid: u32 },

    #[error("invalid config JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}
