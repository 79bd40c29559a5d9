//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, ids never reused)
//! - No rendering or platform dependencies

pub mod chest;
pub mod collision;
pub mod creature;
pub mod geometry;
pub mod harpoon;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use chest::{ChestEvent, ChestState, TreasureChest};
pub use collision::{CollisionHit, check_harpoon};
pub use creature::{Creature, CreatureIds};
pub use geometry::{point_in_circle, segment_circle_intersection};
pub use harpoon::{Harpoon, HarpoonState};
pub use score::{CatchRecord, CatchTally, ScoreManager, ScoreSummary};
pub use spawn::{SpawnEdge, SpawnManager};
pub use state::{PlayerInput, PlayerState, RoundState, RoundSummary, Winner};
pub use tick::tick;
