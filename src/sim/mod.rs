//! Simulation module
//!
//! All gameplay logic lives here. It must stay pure and replayable:
//! - Time enters only as the host timestamp handed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (player slot, then spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod event;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{ObstacleContact, circles_overlap, has_cleared, obstacle_contact};
pub use event::{DeathCause, DifficultySource, GameEvent};
pub use spawn::{corridor_x, pick_kind, place_gap, place_outside_bands};
pub use state::{
    BOOST_METER_MAX, Collectible, CollectibleKind, MenuStage, Obstacle, Player, ScorePopup,
    SessionPhase, SessionStats, SimulationState,
};
pub use tick::tick;
