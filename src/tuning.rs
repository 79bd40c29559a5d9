//! Data-driven game balance
//!
//! One immutable `Tuning` value is handed to the round at session start.
//! Every section carries `#[serde(default)]` so a JSON file only needs the
//! fields it overrides.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Rarity};
use crate::consts::{DESIGN_HEIGHT, DESIGN_WIDTH};
use crate::error::ConfigError;

/// Play field extents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            width: DESIGN_WIDTH,
            height: DESIGN_HEIGHT,
        }
    }
}

/// Harpoon kinematics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarpoonTuning {
    /// Outbound speed (units/s)
    pub speed: f32,
    /// Rope length at which the harpoon turns back
    pub max_rope: f32,
    /// Inbound speed (units/s)
    pub retract_speed: f32,
    /// Aim limit either side of vertical (degrees)
    pub aim_limit_deg: f32,
    /// How far past the field edge the tip may go before retracting
    pub offscreen_margin: f32,
    /// Distance of each launcher from its field edge
    pub anchor_inset: f32,
    /// Collect every creature on the swept segment instead of the nearest
    pub pierce: bool,
}

impl Default for HarpoonTuning {
    fn default() -> Self {
        Self {
            speed: 1200.0,
            max_rope: 2250.0, // Diagonal of the design field, reaches all corners
            retract_speed: 900.0,
            aim_limit_deg: 80.0,
            offscreen_margin: 50.0,
            anchor_inset: 40.0,
            pierce: false,
        }
    }
}

/// Per-rarity selection weights
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    pub common: f32,
    pub uncommon: f32,
    pub rare: f32,
    pub epic: f32,
    pub legendary: f32,
}

impl RarityWeights {
    pub fn get(&self, rarity: Rarity) -> f32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }

    pub fn total(&self) -> f32 {
        Rarity::ALL.iter().map(|r| self.get(*r)).sum()
    }
}

/// One difficulty bracket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTier {
    pub name: String,
    pub rarity_weights: RarityWeights,
    pub speed_multiplier: f32,
    /// Seconds between regular spawns, re-rolled after each spawn
    pub spawn_interval: (f32, f32),
}

/// Spawner tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Delay before the first regular spawn
    pub first_spawn_delay: f32,
    /// Live creature cap; spawns are skipped while at the cap
    pub max_live_creatures: usize,
    /// Extra distance past the field edge (plus display size) before pruning
    pub despawn_margin: f32,
    /// How far outside the field new creatures enter
    pub edge_inset: f32,
    pub school_probability: f32,
    pub school_size: (u32, u32),
    /// Average harpoons at or above this use tier 0
    pub early_threshold: f32,
    /// Average harpoons at or above this use tier 1, below use tier 2
    pub mid_threshold: f32,
    /// early, mid, late
    pub tiers: [SpawnTier; 3],
    /// Ghost cadence in single-player rounds
    pub ghost_interval_solo: f32,
    /// Ghost cadence in two-player rounds
    pub ghost_interval_two_player: f32,
    /// Ghost cadence while some player has run out of harpoons
    pub ghost_interval_rubber_band: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            first_spawn_delay: 2.0,
            max_live_creatures: 20,
            despawn_margin: 100.0,
            edge_inset: 60.0,
            school_probability: 0.3,
            school_size: (3, 6),
            early_threshold: 7.0,
            mid_threshold: 4.0,
            tiers: [
                SpawnTier {
                    name: "early".to_string(),
                    rarity_weights: RarityWeights {
                        common: 70.0,
                        uncommon: 25.0,
                        rare: 5.0,
                        epic: 0.0,
                        legendary: 0.0,
                    },
                    speed_multiplier: 1.0,
                    spawn_interval: (1.5, 3.0),
                },
                SpawnTier {
                    name: "mid".to_string(),
                    rarity_weights: RarityWeights {
                        common: 40.0,
                        uncommon: 35.0,
                        rare: 20.0,
                        epic: 5.0,
                        legendary: 0.0,
                    },
                    speed_multiplier: 1.3,
                    spawn_interval: (1.0, 2.5),
                },
                SpawnTier {
                    name: "late".to_string(),
                    rarity_weights: RarityWeights {
                        common: 20.0,
                        uncommon: 25.0,
                        rare: 30.0,
                        epic: 20.0,
                        legendary: 5.0,
                    },
                    speed_multiplier: 1.6,
                    spawn_interval: (0.8, 2.0),
                },
            ],
            ghost_interval_solo: 45.0,
            ghost_interval_two_player: 30.0,
            ghost_interval_rubber_band: 15.0,
        }
    }
}

impl SpawnTuning {
    /// Pick the difficulty tier for an average harpoons-remaining value
    pub fn tier_for(&self, avg_harpoons: f32) -> &SpawnTier {
        if avg_harpoons >= self.early_threshold {
            &self.tiers[0]
        } else if avg_harpoons >= self.mid_threshold {
            &self.tiers[1]
        } else {
            &self.tiers[2]
        }
    }
}

/// Treasure chest timing and layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChestTuning {
    pub position: Vec2,
    /// Closed time before the next opening (seconds)
    pub open_delay: (f32, f32),
    /// Time the prize stays up once open (seconds)
    pub open_duration: (f32, f32),
    /// Lid opening/closing time
    pub transition_duration: f32,
    /// Time for an uncaught prize to sink back in
    pub retreat_duration: f32,
    pub escort_ring: bool,
    pub escort_type: String,
    pub escort_count: u32,
    pub escort_radius: f32,
    /// Ring angular speed (radians/s)
    pub escort_speed: f32,
    pub escort_hitbox: f32,
    pub escort_display_size: f32,
}

impl Default for ChestTuning {
    fn default() -> Self {
        Self {
            position: Vec2::new(960.0, 400.0),
            open_delay: (15.0, 30.0),
            open_duration: (3.0, 5.0),
            transition_duration: 0.5,
            retreat_duration: 1.0,
            escort_ring: true,
            escort_type: "tubeworm".to_string(),
            escort_count: 6,
            escort_radius: 90.0,
            escort_speed: 0.35,
            escort_hitbox: 30.0,
            escort_display_size: 86.0,
        }
    }
}

/// When an expired shot clock offers a buyback instead of ending the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuybackMode {
    Disabled,
    #[default]
    TwoPlayerOnly,
    Always,
}

impl BuybackMode {
    pub fn allows(self, player_count: usize) -> bool {
        match self {
            BuybackMode::Disabled => false,
            BuybackMode::TwoPlayerOnly => player_count == 2,
            BuybackMode::Always => true,
        }
    }
}

/// Round rules and economy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTuning {
    /// Round length (seconds)
    pub round_time: f32,
    pub starting_harpoons: i32,
    /// Time budget per shot once the first harpoon is fired
    pub shot_timer: f32,
    pub buyback_mode: BuybackMode,
    pub buyback_cost: u64,
    pub buyback_harpoons: i32,
    /// Pause between the decided end and the round reporting finished
    pub game_over_delay: f32,
}

impl Default for RoundTuning {
    fn default() -> Self {
        Self {
            round_time: 180.0,
            starting_harpoons: 10,
            shot_timer: 10.0,
            buyback_mode: BuybackMode::TwoPlayerOnly,
            buyback_cost: 500,
            buyback_harpoons: 1,
            game_over_delay: 1.0,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field: FieldTuning,
    pub harpoon: HarpoonTuning,
    pub spawn: SpawnTuning,
    pub chest: ChestTuning,
    pub round: RoundTuning,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be non-negative")))
    }
}

fn range(field: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    non_negative(field, min)?;
    non_negative(field, max)?;
    if min > max {
        return Err(ConfigError::invalid(field, format!("min {min} exceeds max {max}")));
    }
    Ok(())
}

impl Tuning {
    /// Parse tuning overrides from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Numeric sanity checks
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field.width", self.field.width)?;
        positive("field.height", self.field.height)?;

        let h = &self.harpoon;
        positive("harpoon.speed", h.speed)?;
        positive("harpoon.max_rope", h.max_rope)?;
        positive("harpoon.retract_speed", h.retract_speed)?;
        non_negative("harpoon.offscreen_margin", h.offscreen_margin)?;
        non_negative("harpoon.anchor_inset", h.anchor_inset)?;
        if !(h.aim_limit_deg.is_finite() && (0.0..90.0).contains(&h.aim_limit_deg)) {
            return Err(ConfigError::invalid(
                "harpoon.aim_limit_deg",
                format!("{} must be in [0, 90)", h.aim_limit_deg),
            ));
        }

        let s = &self.spawn;
        non_negative("spawn.first_spawn_delay", s.first_spawn_delay)?;
        non_negative("spawn.despawn_margin", s.despawn_margin)?;
        non_negative("spawn.edge_inset", s.edge_inset)?;
        if !(0.0..=1.0).contains(&s.school_probability) {
            return Err(ConfigError::invalid(
                "spawn.school_probability",
                format!("{} must be in [0, 1]", s.school_probability),
            ));
        }
        if s.school_size.0 == 0 || s.school_size.0 > s.school_size.1 {
            return Err(ConfigError::invalid(
                "spawn.school_size",
                format!("{:?} is not a valid size range", s.school_size),
            ));
        }
        if s.mid_threshold > s.early_threshold {
            return Err(ConfigError::invalid(
                "spawn.mid_threshold",
                "mid threshold exceeds early threshold",
            ));
        }
        for tier in &s.tiers {
            range("spawn.tiers.spawn_interval", tier.spawn_interval)?;
            positive("spawn.tiers.spawn_interval", tier.spawn_interval.1)?;
            non_negative("spawn.tiers.speed_multiplier", tier.speed_multiplier)?;
            for rarity in Rarity::ALL {
                non_negative("spawn.tiers.rarity_weights", tier.rarity_weights.get(rarity))?;
            }
            positive("spawn.tiers.rarity_weights", tier.rarity_weights.total())?;
        }
        positive("spawn.ghost_interval_solo", s.ghost_interval_solo)?;
        positive("spawn.ghost_interval_two_player", s.ghost_interval_two_player)?;
        positive("spawn.ghost_interval_rubber_band", s.ghost_interval_rubber_band)?;

        let c = &self.chest;
        range("chest.open_delay", c.open_delay)?;
        range("chest.open_duration", c.open_duration)?;
        positive("chest.transition_duration", c.transition_duration)?;
        positive("chest.retreat_duration", c.retreat_duration)?;
        if c.escort_ring {
            non_negative("chest.escort_radius", c.escort_radius)?;
            positive("chest.escort_hitbox", c.escort_hitbox)?;
        }

        let r = &self.round;
        positive("round.round_time", r.round_time)?;
        positive("round.shot_timer", r.shot_timer)?;
        non_negative("round.game_over_delay", r.game_over_delay)?;
        if r.starting_harpoons <= 0 {
            return Err(ConfigError::invalid(
                "round.starting_harpoons",
                "must start with at least one harpoon",
            ));
        }
        if r.buyback_harpoons < 0 {
            return Err(ConfigError::invalid("round.buyback_harpoons", "must be non-negative"));
        }
        Ok(())
    }

    /// Cross-checks between tuning and the catalog it will drive
    pub fn validate_catalog(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        catalog.validate()?;
        for tier in &self.spawn.tiers {
            for rarity in Rarity::ALL {
                if tier.rarity_weights.get(rarity) > 0.0 && catalog.pool_len(rarity) == 0 {
                    return Err(ConfigError::EmptyRarityPool(rarity));
                }
            }
        }
        if catalog.treasures.is_empty() {
            return Err(ConfigError::NoTreasures);
        }
        if self.chest.escort_ring && catalog.get(&self.chest.escort_type).is_none() {
            return Err(ConfigError::UnknownCreature(self.chest.escort_type.clone()));
        }
        Ok(())
    }
}
