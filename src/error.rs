//! Startup configuration errors
//!
//! The simulation itself never fails at runtime; everything that can go wrong
//! is caught when tuning and catalog are loaded.

use thiserror::Error;

use crate::catalog::Rarity;

/// Errors raised while loading or validating tuning and catalog data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("player count must be 1 or 2, got {0}")]
    PlayerCount(usize),

    #[error("duplicate creature id `{0}`")]
    DuplicateCreature(String),

    #[error("unknown creature id `{0}`")]
    UnknownCreature(String),

    #[error("no creatures registered for rarity {0:?}")]
    EmptyRarityPool(Rarity),

    #[error("treasure table is empty")]
    NoTreasures,

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
