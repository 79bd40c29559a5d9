//! Abyss Harpoon - deep-sea harpoon arcade simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (harpoons, creatures, collisions, round state)
//! - `catalog`: Static creature and treasure data
//! - `tuning`: Data-driven game balance
//! - `feedback`: Audio/particle/toast cues derived from simulation events
//! - `driver`: Fixed timestep accumulator

pub mod catalog;
pub mod driver;
pub mod error;
pub mod feedback;
pub mod sim;
pub mod tuning;

pub use catalog::{BehaviorTag, Catalog, CreatureTypeDef, Rarity};
pub use driver::FixedStepDriver;
pub use error::ConfigError;
pub use feedback::{FeedbackSink, GameEvent, LogFeedback};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Longest real frame fed into the accumulator (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.05;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Design resolution; all positions are in these units
    pub const DESIGN_WIDTH: f32 = 1920.0;
    pub const DESIGN_HEIGHT: f32 = 1080.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to the unit interval
#[inline]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg.to_radians()
}

#[inline]
pub fn rad_to_deg(rad: f32) -> f32 {
    rad.to_degrees()
}

/// Unit direction for an aim angle measured from the vertical axis.
///
/// `vertical` is -1.0 for a launcher firing up the screen (screen y grows
/// downward) and 1.0 for one firing down.
#[inline]
pub fn aim_direction(angle: f32, vertical: f32) -> Vec2 {
    Vec2::new(angle.sin(), vertical * angle.cos())
}
