//! Creature catalog
//!
//! Immutable data describing every sea creature, treasure item and the ghost.
//! Loaded once at startup (built-in table or JSON) and validated before a
//! round can be created.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// Hit-spark colour used by the particle layer
    pub fn color(&self) -> &'static str {
        match self {
            Rarity::Common => "#FFFFFF",
            Rarity::Uncommon => "#2ECC71",
            Rarity::Rare => "#3498DB",
            Rarity::Epic => "#9B59B6",
            Rarity::Legendary => "#F1C40F",
        }
    }

    /// Default swim speed for creatures of this rarity (units/s)
    pub fn base_speed(&self) -> f32 {
        match self {
            Rarity::Common => 100.0,
            Rarity::Uncommon => 150.0,
            Rarity::Rare => 200.0,
            Rarity::Epic => 250.0,
            Rarity::Legendary => 300.0,
        }
    }

    /// Epic and legendary catches get the big celebration
    pub fn is_showcase(&self) -> bool {
        matches!(self, Rarity::Epic | Rarity::Legendary)
    }
}

/// Behaviour variant of a creature record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorTag {
    /// Regular sea creature crossing the field
    #[default]
    Swimmer,
    /// Zero-point catch-up spawn
    Ghost,
    /// Prize raised by the treasure chest
    Treasure,
    /// Ring member orbiting a treasure item
    Escort,
}

/// Per-behaviour rules, looked up by tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorTraits {
    /// Integrates its own velocity each tick
    pub self_propelled: bool,
    /// Pruned once it leaves the field while still alive
    pub despawns_offscreen: bool,
    /// Occupies a slot under the spawner's live creature cap
    pub counts_toward_cap: bool,
}

const BEHAVIOR_TABLE: [(BehaviorTag, BehaviorTraits); 4] = [
    (
        BehaviorTag::Swimmer,
        BehaviorTraits {
            self_propelled: true,
            despawns_offscreen: true,
            counts_toward_cap: true,
        },
    ),
    (
        BehaviorTag::Ghost,
        BehaviorTraits {
            self_propelled: true,
            despawns_offscreen: true,
            counts_toward_cap: true,
        },
    ),
    (
        BehaviorTag::Treasure,
        BehaviorTraits {
            self_propelled: false,
            despawns_offscreen: false,
            counts_toward_cap: false,
        },
    ),
    (
        BehaviorTag::Escort,
        BehaviorTraits {
            self_propelled: false,
            despawns_offscreen: false,
            counts_toward_cap: false,
        },
    ),
];

impl BehaviorTag {
    pub fn traits(self) -> BehaviorTraits {
        BEHAVIOR_TABLE
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, traits)| *traits)
            .unwrap_or(BEHAVIOR_TABLE[0].1)
    }
}

/// Optional vertical sine motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveMotion {
    /// Peak vertical offset (units)
    pub amplitude: f32,
    /// Phase advance (radians/s)
    pub frequency: f32,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureTypeDef {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub points: u32,
    #[serde(default)]
    pub bonus_harpoons: u32,
    pub display_size: f32,
    pub hitbox_radius: f32,
    pub base_speed: f32,
    #[serde(default)]
    pub wave: Option<WaveMotion>,
    #[serde(default)]
    pub behavior: BehaviorTag,
}

impl CreatureTypeDef {
    fn swimmer(id: &str, name: &str, rarity: Rarity, points: u32, display_size: f32, hitbox: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            rarity,
            points,
            bonus_harpoons: 0,
            display_size,
            hitbox_radius: hitbox,
            base_speed: rarity.base_speed(),
            wave: None,
            behavior: BehaviorTag::Swimmer,
        }
    }

    fn with_bonus(mut self, bonus: u32) -> Self {
        self.bonus_harpoons = bonus;
        self
    }

    fn with_wave(mut self, amplitude: f32, frequency: f32) -> Self {
        self.wave = Some(WaveMotion {
            amplitude,
            frequency,
        });
        self
    }

    fn as_escort(mut self) -> Self {
        self.behavior = BehaviorTag::Escort;
        self
    }

    fn treasure(name: &str, points: u32, bonus: u32) -> Self {
        let id = format!("treasure_{}", name.to_lowercase().replace(' ', "_"));
        Self {
            id,
            name: name.to_string(),
            rarity: Rarity::Legendary,
            points,
            bonus_harpoons: bonus,
            display_size: 80.0,
            hitbox_radius: 30.0,
            base_speed: 0.0,
            wave: None,
            behavior: BehaviorTag::Treasure,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::invalid("creature.id", "empty id"));
        }
        if !(self.hitbox_radius.is_finite() && self.hitbox_radius > 0.0) {
            return Err(ConfigError::invalid(
                "creature.hitbox_radius",
                format!("`{}` has radius {}", self.id, self.hitbox_radius),
            ));
        }
        if !(self.display_size.is_finite() && self.display_size >= 0.0) {
            return Err(ConfigError::invalid(
                "creature.display_size",
                format!("`{}` has size {}", self.id, self.display_size),
            ));
        }
        if !(self.base_speed.is_finite() && self.base_speed >= 0.0) {
            return Err(ConfigError::invalid(
                "creature.base_speed",
                format!("`{}` has speed {}", self.id, self.base_speed),
            ));
        }
        if let Some(wave) = self.wave {
            if !(wave.amplitude.is_finite() && wave.frequency.is_finite()) {
                return Err(ConfigError::invalid(
                    "creature.wave",
                    format!("`{}` has non-finite wave motion", self.id),
                ));
            }
        }
        Ok(())
    }
}

/// The full creature catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Sea creatures; only swimmers enter the spawn pools
    pub creatures: Vec<CreatureTypeDef>,
    /// Items the treasure chest can raise
    pub treasures: Vec<CreatureTypeDef>,
    /// Catch-up special spawn
    pub ghost: CreatureTypeDef,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The shipped deep-sea roster
    pub fn builtin() -> Self {
        use Rarity::*;
        let creatures = vec![
            CreatureTypeDef::swimmer("anglerfish", "Anglerfish", Epic, 75, 112.0, 28.0),
            CreatureTypeDef::swimmer("barrelfish", "Barrelfish", Legendary, 100, 96.0, 24.0),
            CreatureTypeDef::swimmer("blobfish", "Blobfish", Rare, 50, 96.0, 24.0),
            CreatureTypeDef::swimmer("cookie_cutter_shark", "Cookie Cutter Shark", Uncommon, 30, 96.0, 24.0),
            CreatureTypeDef::swimmer("dumbo_octopus", "Dumbo Octopus", Rare, 50, 96.0, 24.0),
            CreatureTypeDef::swimmer("fangtooth", "Fangtooth", Uncommon, 30, 96.0, 24.0),
            CreatureTypeDef::swimmer("frilled_shark", "Frilled Shark", Rare, 50, 96.0, 24.0)
                .with_wave(30.0, 3.0),
            CreatureTypeDef::swimmer("giant_isopod", "Giant Isopod", Common, 10, 96.0, 24.0),
            CreatureTypeDef::swimmer("goblin_shark", "Goblin Shark", Epic, 75, 128.0, 32.0),
            CreatureTypeDef::swimmer("gulper_eel", "Gulper Eel", Legendary, 100, 112.0, 28.0)
                .with_bonus(1),
            CreatureTypeDef::swimmer("hatchetfish", "Hatchetfish", Common, 10, 80.0, 20.0),
            CreatureTypeDef::swimmer("lanternfish", "Lanternfish", Common, 10, 112.0, 28.0),
            CreatureTypeDef::swimmer("tubeworm", "Tubeworm", Common, 30, 220.0, 55.0)
                .as_escort(),
            CreatureTypeDef::swimmer("sea_spider", "Sea Spider", Common, 20, 128.0, 32.0),
            CreatureTypeDef::swimmer("sea_toad", "Sea Toad", Uncommon, 30, 80.0, 20.0),
            CreatureTypeDef::swimmer("siphonophore", "Siphonophore", Common, 10, 96.0, 24.0),
            CreatureTypeDef::swimmer("spider_crab", "Spider Crab", Rare, 50, 96.0, 24.0),
            CreatureTypeDef::swimmer("squat_lobster", "Squat Lobster", Common, 10, 96.0, 24.0),
            CreatureTypeDef::swimmer("vampire_squid", "Vampire Squid", Uncommon, 30, 96.0, 24.0),
            CreatureTypeDef::swimmer("vantafish", "Vantafish", Rare, 50, 80.0, 20.0),
            CreatureTypeDef::swimmer("viperfish", "Viperfish", Common, 10, 96.0, 24.0),
            CreatureTypeDef::swimmer("winged_comb_jelly", "Winged Comb Jelly", Common, 20, 96.0, 24.0),
        ];

        let treasures = vec![
            CreatureTypeDef::treasure("Diamond Ring", 200, 2),
            CreatureTypeDef::treasure("Emerald Ring", 200, 2),
            CreatureTypeDef::treasure("Sapphire Ring", 200, 2),
            CreatureTypeDef::treasure("Ruby Ring", 200, 2),
            CreatureTypeDef::treasure("Chalice", 300, 2),
            CreatureTypeDef::treasure("Gold Necklace", 150, 2),
            CreatureTypeDef::treasure("Golden Ankh", 250, 2),
            CreatureTypeDef::treasure("Golden Lamp", 300, 2),
            CreatureTypeDef::treasure("Golden Comb", 300, 2),
            CreatureTypeDef::treasure("Ruby Crown", 350, 3),
            CreatureTypeDef::treasure("Ruby Tiara", 350, 2),
            CreatureTypeDef::treasure("Ruby Scepter", 300, 2),
            CreatureTypeDef::treasure("Golden Elephant", 400, 2),
            CreatureTypeDef::treasure("Golden Eagle", 400, 2),
            CreatureTypeDef::treasure("Zlatorog", 450, 3),
            CreatureTypeDef::treasure("Gold Bars", 300, 3),
            CreatureTypeDef::treasure("Golden Horn", 300, 3),
        ];

        let ghost = CreatureTypeDef {
            id: "ghost".to_string(),
            name: "Ghost".to_string(),
            rarity: Legendary,
            points: 0,
            bonus_harpoons: 7,
            display_size: 56.0,
            hitbox_radius: 14.0,
            base_speed: Rare.base_speed(),
            wave: None,
            behavior: BehaviorTag::Ghost,
        };

        Self {
            creatures,
            treasures,
            ghost,
        }
    }

    /// Parse a catalog from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Structural checks that do not depend on tuning
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for def in self
            .creatures
            .iter()
            .chain(self.treasures.iter())
            .chain(std::iter::once(&self.ghost))
        {
            def.validate()?;
            if !seen.insert(def.id.as_str()) {
                return Err(ConfigError::DuplicateCreature(def.id.clone()));
            }
        }
        if self.pool(Rarity::Common).next().is_none() {
            // Schools are always drawn from the common pool
            return Err(ConfigError::EmptyRarityPool(Rarity::Common));
        }
        Ok(())
    }

    /// Look up a sea creature by id
    pub fn get(&self, id: &str) -> Option<&CreatureTypeDef> {
        self.creatures.iter().find(|c| c.id == id)
    }

    /// Look up any entry (creature, treasure or ghost) by id
    pub fn find_any(&self, id: &str) -> Option<&CreatureTypeDef> {
        self.get(id)
            .or_else(|| self.treasures.iter().find(|t| t.id == id))
            .or_else(|| (self.ghost.id == id).then_some(&self.ghost))
    }

    /// Spawnable swimmers registered under a rarity, in catalog order
    pub fn pool(&self, rarity: Rarity) -> impl Iterator<Item = &CreatureTypeDef> {
        self.creatures
            .iter()
            .filter(move |c| c.rarity == rarity && c.behavior == BehaviorTag::Swimmer)
    }

    pub fn pool_len(&self, rarity: Rarity) -> usize {
        self.pool(rarity).count()
    }

    /// `n`-th creature of a rarity pool
    pub fn pool_entry(&self, rarity: Rarity, n: usize) -> Option<&CreatureTypeDef> {
        self.pool(rarity).nth(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_validates() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.creatures.len(), 22);
        assert_eq!(catalog.treasures.len(), 17);
    }

    #[test]
    fn test_rarity_pools() {
        let catalog = Catalog::builtin();
        // Tubeworms only appear as chest escorts
        assert_eq!(catalog.pool_len(Rarity::Common), 8);
        assert_eq!(catalog.pool_len(Rarity::Uncommon), 4);
        assert_eq!(catalog.pool_len(Rarity::Rare), 5);
        assert_eq!(catalog.pool_len(Rarity::Epic), 2);
        assert_eq!(catalog.pool_len(Rarity::Legendary), 2);
    }

    #[test]
    fn test_treasure_ids() {
        let catalog = Catalog::builtin();
        let crown = catalog.find_any("treasure_ruby_crown").unwrap();
        assert_eq!(crown.points, 350);
        assert_eq!(crown.bonus_harpoons, 3);
        assert_eq!(crown.behavior, BehaviorTag::Treasure);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut catalog = Catalog::builtin();
        let dup = catalog.creatures[0].clone();
        catalog.creatures.push(dup);
        assert!(matches!(
            catalog.validate(),
            Err(ConfigError::DuplicateCreature(id)) if id == "anglerfish"
        ));
    }

    #[test]
    fn test_missing_common_pool_rejected() {
        let mut catalog = Catalog::builtin();
        catalog.creatures.retain(|c| c.rarity != Rarity::Common);
        assert!(matches!(
            catalog.validate(),
            Err(ConfigError::EmptyRarityPool(Rarity::Common))
        ));
    }

    #[test]
    fn test_bad_hitbox_rejected() {
        let mut catalog = Catalog::builtin();
        catalog.creatures[3].hitbox_radius = 0.0;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_wave() {
        let json = serde_json::to_string(&Catalog::builtin()).unwrap();
        let catalog = Catalog::from_json(&json).unwrap();
        let shark = catalog.get("frilled_shark").unwrap();
        assert_eq!(shark.wave.map(|w| w.amplitude), Some(30.0));
    }

    #[test]
    fn test_behavior_dispatch() {
        assert!(BehaviorTag::Swimmer.traits().despawns_offscreen);
        assert!(BehaviorTag::Ghost.traits().counts_toward_cap);
        assert!(!BehaviorTag::Escort.traits().counts_toward_cap);
        assert!(!BehaviorTag::Treasure.traits().self_propelled);
        assert!(!BehaviorTag::Escort.traits().despawns_offscreen);
    }
}
