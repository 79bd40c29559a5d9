//! Creature spawner
//!
//! Two independent clocks: regular spawns re-rolled from the current
//! difficulty tier, and the ghost catch-up spawn on a cadence chosen by the
//! caller. Spawns are skipped (never queued) while the live cap is reached.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::creature::{Creature, CreatureIds};
use crate::catalog::{Catalog, CreatureTypeDef, Rarity};
use crate::tuning::{RarityWeights, SpawnTier, Tuning};

/// Screen-edge entry patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    Left,
    Right,
    TopLeft,
    TopRight,
    Top,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 5] = [
        SpawnEdge::Left,
        SpawnEdge::Right,
        SpawnEdge::TopLeft,
        SpawnEdge::TopRight,
        SpawnEdge::Top,
    ];

    /// Entry point. `fraction` picks the height on side edges and the
    /// horizontal position on the top edge; corners ignore it.
    pub fn position(self, fraction: f32, width: f32, height: f32, inset: f32) -> Vec2 {
        match self {
            SpawnEdge::Left => Vec2::new(-inset, fraction * height),
            SpawnEdge::Right => Vec2::new(width + inset, fraction * height),
            SpawnEdge::TopLeft => Vec2::new(-inset, -inset),
            SpawnEdge::TopRight => Vec2::new(width + inset, -inset),
            SpawnEdge::Top => Vec2::new(fraction * width, -inset),
        }
    }

    pub fn velocity(self, speed: f32) -> Vec2 {
        match self {
            SpawnEdge::Left => Vec2::new(speed, 0.0),
            SpawnEdge::Right => Vec2::new(-speed, 0.0),
            SpawnEdge::TopLeft => Vec2::new(speed * 0.8, speed * 0.5),
            SpawnEdge::TopRight => Vec2::new(-speed * 0.8, speed * 0.5),
            SpawnEdge::Top => Vec2::new(0.0, speed),
        }
    }

    fn pick(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Entry height bands (fraction of field height)
const INDIVIDUAL_BAND: (f32, f32) = (0.1, 0.75);
const SCHOOL_BAND: (f32, f32) = (0.15, 0.7);
const GHOST_BAND: (f32, f32) = (0.15, 0.65);

/// Weighted rarity draw; zero-weight rarities are never chosen
pub fn pick_rarity(weights: &RarityWeights, rng: &mut impl Rng) -> Rarity {
    let total = weights.total();
    if total <= 0.0 {
        return Rarity::Common;
    }
    let mut roll = rng.random::<f32>() * total;
    let mut last = Rarity::Common;
    for rarity in Rarity::ALL {
        let weight = weights.get(rarity);
        if weight <= 0.0 {
            continue;
        }
        if roll < weight {
            return rarity;
        }
        roll -= weight;
        last = rarity;
    }
    // Float rounding on the final bucket
    last
}

/// Uniform pick from a rarity pool
fn pick_type<'a>(catalog: &'a Catalog, rarity: Rarity, rng: &mut impl Rng) -> Option<&'a CreatureTypeDef> {
    let len = catalog.pool_len(rarity);
    if len == 0 {
        return None;
    }
    catalog.pool_entry(rarity, rng.random_range(0..len))
}

fn roll_range(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    rng.random_range(min..=max)
}

/// Decides when, where and what to spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnManager {
    spawn_timer: f32,
    next_spawn_time: f32,
    ghost_timer: f32,
}

impl SpawnManager {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            spawn_timer: 0.0,
            next_spawn_time: tuning.spawn.first_spawn_delay,
            ghost_timer: 0.0,
        }
    }

    /// Seconds until the next regular spawn is due
    pub fn time_to_next_spawn(&self) -> f32 {
        (self.next_spawn_time - self.spawn_timer).max(0.0)
    }

    /// Advance both clocks and push any new creatures. Returns how many were
    /// spawned this call.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        avg_harpoons: f32,
        ghost_interval: f32,
        creatures: &mut Vec<Creature>,
        ids: &mut CreatureIds,
        tuning: &Tuning,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> usize {
        self.spawn_timer += dt;
        self.ghost_timer += dt;
        let before = creatures.len();
        let cap = tuning.spawn.max_live_creatures;

        if self.spawn_timer >= self.next_spawn_time && live_count(creatures) < cap {
            self.spawn_timer = 0.0;
            let tier = tuning.spawn.tier_for(avg_harpoons);
            self.next_spawn_time = roll_range(rng, tier.spawn_interval);

            if rng.random_bool(f64::from(tuning.spawn.school_probability)) {
                spawn_school(tier, creatures, ids, tuning, catalog, rng);
            } else {
                spawn_individual(tier, creatures, ids, tuning, catalog, rng);
            }
        }

        if self.ghost_timer >= ghost_interval && live_count(creatures) < cap {
            self.ghost_timer = 0.0;
            spawn_ghost(creatures, ids, tuning, catalog, rng);
        }

        creatures.len() - before
    }
}

fn live_count(creatures: &[Creature]) -> usize {
    creatures
        .iter()
        .filter(|c| c.alive && c.traits().counts_toward_cap)
        .count()
}

fn spawn_individual(
    tier: &SpawnTier,
    creatures: &mut Vec<Creature>,
    ids: &mut CreatureIds,
    tuning: &Tuning,
    catalog: &Catalog,
    rng: &mut impl Rng,
) {
    let rarity = pick_rarity(&tier.rarity_weights, rng);
    let Some(def) = pick_type(catalog, rarity, rng).or_else(|| catalog.pool_entry(Rarity::Common, 0)) else {
        log::warn!("no spawnable creature for rarity {}", rarity.as_str());
        return;
    };
    let edge = SpawnEdge::pick(rng);
    let fraction = roll_range(rng, INDIVIDUAL_BAND);
    let field = &tuning.field;
    let pos = edge.position(fraction, field.width, field.height, tuning.spawn.edge_inset);
    let vel = edge.velocity(def.base_speed * tier.speed_multiplier);

    log::debug!("spawn {} ({}) from {:?} tier {}", def.id, rarity.as_str(), edge, tier.name);
    let phase = rng.random_range(0.0..TAU);
    creatures.push(Creature::new(ids.allocate(), def.clone(), pos, vel, phase));
}

fn spawn_school(
    tier: &SpawnTier,
    creatures: &mut Vec<Creature>,
    ids: &mut CreatureIds,
    tuning: &Tuning,
    catalog: &Catalog,
    rng: &mut impl Rng,
) {
    // Schools are always commons
    let Some(def) = pick_type(catalog, Rarity::Common, rng) else {
        log::warn!("school skipped, common pool is empty");
        return;
    };
    let edge = SpawnEdge::pick(rng);
    let fraction = roll_range(rng, SCHOOL_BAND);
    let field = &tuning.field;
    let origin = edge.position(fraction, field.width, field.height, tuning.spawn.edge_inset);
    let base_vel = edge.velocity(def.base_speed * tier.speed_multiplier);

    let (min, max) = tuning.spawn.school_size;
    let count = rng.random_range(min..=max);
    log::debug!("spawn school of {count} {} from {:?}", def.id, edge);

    for i in 0..count {
        // Loose 3-wide grid with jitter
        let offset = Vec2::new(
            rng.random_range(-40.0f32..=40.0) + (i % 3) as f32 * 50.0,
            rng.random_range(-30.0f32..=30.0) + (i / 3) as f32 * 45.0,
        );
        let vel = base_vel + Vec2::new(rng.random_range(-10.0f32..=10.0), rng.random_range(-5.0f32..=5.0));
        let phase = rng.random_range(0.0..TAU);
        creatures.push(Creature::new(ids.allocate(), def.clone(), origin + offset, vel, phase));
    }
}

fn spawn_ghost(creatures: &mut Vec<Creature>, ids: &mut CreatureIds, tuning: &Tuning, catalog: &Catalog, rng: &mut impl Rng) {
    let def = &catalog.ghost;
    let edge = SpawnEdge::pick(rng);
    let fraction = roll_range(rng, GHOST_BAND);
    let field = &tuning.field;
    let pos = edge.position(fraction, field.width, field.height, tuning.spawn.edge_inset);
    let vel = edge.velocity(def.base_speed);

    log::debug!("spawn ghost from {:?}", edge);
    let phase = rng.random_range(0.0..TAU);
    creatures.push(Creature::new(ids.allocate(), def.clone(), pos, vel, phase));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BehaviorTag;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Fixture {
        spawner: SpawnManager,
        creatures: Vec<Creature>,
        ids: CreatureIds,
        tuning: Tuning,
        catalog: Catalog,
        rng: Pcg32,
    }

    impl Fixture {
        fn new(tuning: Tuning) -> Self {
            Self {
                spawner: SpawnManager::new(&tuning),
                creatures: Vec::new(),
                ids: CreatureIds::default(),
                tuning,
                catalog: Catalog::builtin(),
                rng: Pcg32::seed_from_u64(7),
            }
        }

        fn step(&mut self, dt: f32, avg: f32, ghost_interval: f32) -> usize {
            self.spawner.update(
                dt,
                avg,
                ghost_interval,
                &mut self.creatures,
                &mut self.ids,
                &self.tuning,
                &self.catalog,
                &mut self.rng,
            )
        }
    }

    #[test]
    fn test_first_spawn_waits_for_delay() {
        let mut f = Fixture::new(Tuning::default());
        assert_eq!(f.step(1.9, 10.0, 1000.0), 0);
        assert!(f.step(0.2, 10.0, 1000.0) >= 1);
        assert!(f.creatures.iter().all(|c| c.alive));
    }

    #[test]
    fn test_cap_skips_without_resetting_timer() {
        let mut tuning = Tuning::default();
        tuning.spawn.max_live_creatures = 0;
        let mut f = Fixture::new(tuning);
        assert_eq!(f.step(5.0, 10.0, 1000.0), 0);
        // Timer kept running while capped: the spawn fires as soon as room opens
        f.tuning.spawn.max_live_creatures = 20;
        assert!(f.step(0.0, 10.0, 1000.0) >= 1);
    }

    #[test]
    fn test_dead_creatures_do_not_count_toward_cap() {
        let mut tuning = Tuning::default();
        tuning.spawn.max_live_creatures = 1;
        let mut f = Fixture::new(tuning);
        let def = f.catalog.get("viperfish").unwrap().clone();
        let mut corpse = Creature::new(f.ids.allocate(), def, Vec2::ZERO, Vec2::ZERO, 0.0);
        corpse.alive = false;
        f.creatures.push(corpse);
        assert!(f.step(2.0, 10.0, 1000.0) >= 1);
    }

    #[test]
    fn test_schools_are_common_and_sized() {
        let mut tuning = Tuning::default();
        tuning.spawn.school_probability = 1.0;
        let mut f = Fixture::new(tuning);
        let n = f.step(2.0, 10.0, 1000.0);
        assert!((3..=6).contains(&n));
        let first = &f.creatures[0].def.id;
        assert!(f.creatures.iter().all(|c| &c.def.id == first));
        assert!(f.creatures.iter().all(|c| c.def.rarity == Rarity::Common));
    }

    #[test]
    fn test_ghost_on_own_clock() {
        let mut tuning = Tuning::default();
        tuning.spawn.first_spawn_delay = 1000.0;
        let mut f = Fixture::new(tuning);
        assert_eq!(f.step(14.0, 10.0, 15.0), 0);
        assert_eq!(f.step(1.0, 10.0, 15.0), 1);
        assert_eq!(f.creatures[0].def.behavior, BehaviorTag::Ghost);
        assert_eq!(f.creatures[0].def.points, 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut f = Fixture::new(Tuning::default());
        for _ in 0..200 {
            f.step(0.5, 2.0, 5.0);
            for c in f.creatures.iter_mut() {
                c.alive = false;
            }
        }
        let mut ids: Vec<u32> = f.creatures.iter().map(|c| c.id).collect();
        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
        assert!(len > 20);
    }

    #[test]
    fn test_late_tier_is_faster() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let def = catalog.get("viperfish").unwrap();
        let early = def.base_speed * tuning.spawn.tier_for(10.0).speed_multiplier;
        let late = def.base_speed * tuning.spawn.tier_for(1.0).speed_multiplier;
        assert!((early - 100.0).abs() < 1e-4);
        assert!((late - 160.0).abs() < 1e-3);
    }

    #[test]
    fn test_pick_rarity_respects_zero_weights() {
        let mut rng = Pcg32::seed_from_u64(1);
        let weights = Tuning::default().spawn.tiers[0].rarity_weights;
        for _ in 0..2000 {
            let r = pick_rarity(&weights, &mut rng);
            assert!(!matches!(r, Rarity::Epic | Rarity::Legendary));
        }
        let only_legendary = RarityWeights {
            legendary: 1.0,
            ..Default::default()
        };
        assert_eq!(pick_rarity(&only_legendary, &mut rng), Rarity::Legendary);
    }

    #[test]
    fn test_edge_formulas() {
        let p = SpawnEdge::Right.position(0.5, 1920.0, 1080.0, 60.0);
        assert_eq!(p, Vec2::new(1980.0, 540.0));
        assert_eq!(SpawnEdge::TopLeft.velocity(100.0), Vec2::new(80.0, 50.0));
        assert_eq!(SpawnEdge::Top.position(0.25, 1920.0, 1080.0, 60.0), Vec2::new(480.0, -60.0));
        assert_eq!(SpawnEdge::Left.velocity(100.0), Vec2::new(100.0, 0.0));
    }
}
