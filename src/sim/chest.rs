//! Treasure chest state machine
//!
//! Closed -> Opening -> Open -> Retreating -> Closing -> Closed. The chest
//! pushes its treasure (and optional escort ring) into the shared creature
//! collection so harpoons hit them like any sea creature. Catching the
//! treasure while Open or Retreating skips straight to Closing.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::creature::{Creature, CreatureIds};
use crate::catalog::Catalog;
use crate::tuning::Tuning;

/// Idle bob of the ring centre
const BOB_SPEED: f32 = 2.0;
const BOB_AMPLITUDE: f32 = 5.0;
const GLOW_SPEED: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestState {
    Closed,
    Opening,
    Open,
    Retreating,
    Closing,
}

/// Notable transitions reported by [`TreasureChest::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChestEvent {
    /// Lid started to open
    LidOpening,
    /// Treasure is up and harpoonable
    TreasureSurfaced { id: u32, type_id: String, pos: Vec2 },
    /// Treasure sank back uncaught
    TreasureLost { id: u32, type_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasureChest {
    pub state: ChestState,
    pub position: Vec2,
    timer: f32,
    next_open_delay: f32,
    open_duration: f32,
    /// Lid progress, 0 closed to 1 open
    transition_progress: f32,
    /// Sink progress while retreating, 0 up to 1 gone
    retreat_progress: f32,
    treasure: Option<u32>,
    ring: Vec<u32>,
    ring_angle: f32,
    bob_phase: f32,
    glow_phase: f32,
}

fn roll(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    rng.random_range(min..=max)
}

fn kill(creatures: &mut [Creature], ids: &[u32]) {
    for c in creatures.iter_mut().filter(|c| ids.contains(&c.id)) {
        c.alive = false;
    }
}

impl TreasureChest {
    pub fn new(tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let chest = &tuning.chest;
        Self {
            state: ChestState::Closed,
            position: chest.position,
            timer: 0.0,
            next_open_delay: roll(rng, chest.open_delay),
            open_duration: roll(rng, chest.open_duration),
            transition_progress: 0.0,
            retreat_progress: 0.0,
            treasure: None,
            ring: Vec::new(),
            ring_angle: 0.0,
            bob_phase: 0.0,
            glow_phase: 0.0,
        }
    }

    pub fn treasure_id(&self) -> Option<u32> {
        self.treasure
    }

    pub fn ring_ids(&self) -> &[u32] {
        &self.ring
    }

    pub fn transition_progress(&self) -> f32 {
        self.transition_progress
    }

    pub fn retreat_progress(&self) -> f32 {
        self.retreat_progress
    }

    pub fn glow_phase(&self) -> f32 {
        self.glow_phase
    }

    /// Whether the open lid sprite should show
    pub fn lid_open(&self) -> bool {
        match self.state {
            ChestState::Closed => false,
            ChestState::Open | ChestState::Retreating => true,
            ChestState::Opening | ChestState::Closing => self.transition_progress > 0.5,
        }
    }

    /// Seconds until the lid starts opening (0 unless closed)
    pub fn time_until_open(&self) -> f32 {
        match self.state {
            ChestState::Closed => (self.next_open_delay - self.timer).max(0.0),
            _ => 0.0,
        }
    }

    fn treasure_alive(&self, creatures: &[Creature]) -> bool {
        self.treasure
            .and_then(|id| creatures.iter().find(|c| c.id == id))
            .map(|c| c.alive)
            .unwrap_or(false)
    }

    /// Advance one tick
    pub fn update(
        &mut self,
        dt: f32,
        creatures: &mut Vec<Creature>,
        ids: &mut CreatureIds,
        tuning: &Tuning,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> Option<ChestEvent> {
        let chest = &tuning.chest;
        self.glow_phase += dt * GLOW_SPEED;
        let mut event = None;

        match self.state {
            ChestState::Closed => {
                self.timer += dt;
                if self.timer >= self.next_open_delay {
                    self.state = ChestState::Opening;
                    self.timer = 0.0;
                    self.transition_progress = 0.0;
                    self.retreat_progress = 0.0;
                    self.treasure = None;
                    self.open_duration = roll(rng, chest.open_duration);
                    log::info!("chest opening");
                    event = Some(ChestEvent::LidOpening);
                }
            }
            ChestState::Opening => {
                self.transition_progress += dt / chest.transition_duration;
                if self.transition_progress >= 1.0 {
                    self.transition_progress = 1.0;
                    self.state = ChestState::Open;
                    self.timer = 0.0;
                    event = self.raise_treasure(creatures, ids, tuning, catalog, rng);
                }
            }
            ChestState::Open => {
                self.timer += dt;
                if self.treasure_alive(creatures) {
                    if let Some(t) = self.treasure.and_then(|id| creatures.iter_mut().find(|c| c.id == id)) {
                        t.place(self.position);
                    }
                    self.animate_ring(dt, creatures, tuning);
                }
                if self.timer >= self.open_duration {
                    self.state = ChestState::Retreating;
                    self.timer = 0.0;
                    self.retreat_progress = 0.0;
                }
            }
            ChestState::Retreating => {
                self.retreat_progress += dt / chest.retreat_duration;
                if self.retreat_progress >= 1.0 {
                    self.retreat_progress = 1.0;
                    if self.treasure_alive(creatures) {
                        if let Some(t) = self.treasure.and_then(|id| creatures.iter().find(|c| c.id == id)) {
                            let (id, type_id) = (t.id, t.def.id.clone());
                            kill(creatures, &[id]);
                            log::debug!("treasure {id} sank uncaught");
                            event = Some(ChestEvent::TreasureLost { id, type_id });
                        }
                    }
                    kill(creatures, &self.ring);
                    self.treasure = None;
                    self.ring.clear();
                    self.state = ChestState::Closing;
                    self.timer = 0.0;
                    self.transition_progress = 1.0;
                } else if self.treasure_alive(creatures) {
                    self.animate_ring(dt, creatures, tuning);
                }
            }
            ChestState::Closing => {
                self.transition_progress -= dt / chest.transition_duration;
                if self.transition_progress <= 0.0 {
                    self.transition_progress = 0.0;
                    self.state = ChestState::Closed;
                    self.timer = 0.0;
                    self.next_open_delay = roll(rng, chest.open_delay);
                }
            }
        }

        // Prize gone early: no point holding the lid open
        if self.treasure.is_some()
            && !self.treasure_alive(creatures)
            && matches!(self.state, ChestState::Open | ChestState::Retreating)
        {
            kill(creatures, &self.ring);
            self.treasure = None;
            self.ring.clear();
            self.state = ChestState::Closing;
            self.timer = 0.0;
            self.transition_progress = 1.0;
            log::debug!("treasure caught, chest closing");
        }

        event
    }

    fn raise_treasure(
        &mut self,
        creatures: &mut Vec<Creature>,
        ids: &mut CreatureIds,
        tuning: &Tuning,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> Option<ChestEvent> {
        if catalog.treasures.is_empty() {
            log::warn!("chest opened with an empty treasure table");
            return None;
        }
        let def = catalog.treasures[rng.random_range(0..catalog.treasures.len())].clone();
        let id = ids.allocate();
        let type_id = def.id.clone();
        creatures.push(Creature::new(id, def, self.position, Vec2::ZERO, 0.0));
        self.treasure = Some(id);
        self.ring.clear();

        let chest = &tuning.chest;
        if chest.escort_ring && chest.escort_count > 0 {
            if let Some(escort) = catalog.get(&chest.escort_type) {
                let mut def = escort.clone();
                def.hitbox_radius = chest.escort_hitbox;
                def.display_size = chest.escort_display_size;
                self.ring_angle = rng.random_range(0.0..TAU);
                self.bob_phase = 0.0;
                for i in 0..chest.escort_count {
                    let angle = self.ring_slot(i, chest.escort_count);
                    let mut member = Creature::new(
                        ids.allocate(),
                        def.clone(),
                        Vec2::new(self.position.x + angle.cos() * chest.escort_radius, self.position.y),
                        Vec2::ZERO,
                        0.0,
                    );
                    member.render_y = self.position.y + angle.sin() * chest.escort_radius;
                    self.ring.push(member.id);
                    creatures.push(member);
                }
            }
        }

        log::info!("treasure {type_id} surfaced with {} escorts", self.ring.len());
        Some(ChestEvent::TreasureSurfaced {
            id,
            type_id,
            pos: self.position,
        })
    }

    fn ring_slot(&self, index: u32, count: u32) -> f32 {
        self.ring_angle + TAU * index as f32 / count as f32
    }

    /// Orbit live ring members around the bobbing centre
    fn animate_ring(&mut self, dt: f32, creatures: &mut [Creature], tuning: &Tuning) {
        let chest = &tuning.chest;
        self.bob_phase += dt * BOB_SPEED;
        if self.ring.is_empty() {
            return;
        }
        self.ring_angle += dt * chest.escort_speed;
        let centre_y = self.position.y + self.bob_phase.sin() * BOB_AMPLITUDE;
        let count = self.ring.len() as u32;

        for (i, id) in self.ring.iter().enumerate() {
            let angle = self.ring_slot(i as u32, count);
            // Caught members ride their harpoon instead
            if let Some(member) = creatures.iter_mut().find(|c| c.id == *id && c.alive) {
                member.pos.x = self.position.x + angle.cos() * chest.escort_radius;
                member.render_y = centre_y + angle.sin() * chest.escort_radius;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BehaviorTag;
    use crate::consts::SIM_DT;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Fixture {
        chest: TreasureChest,
        creatures: Vec<Creature>,
        ids: CreatureIds,
        tuning: Tuning,
        catalog: Catalog,
        rng: Pcg32,
    }

    impl Fixture {
        fn new(escort_ring: bool) -> Self {
            let mut tuning = Tuning::default();
            tuning.chest.open_delay = (1.0, 1.0);
            tuning.chest.open_duration = (4.0, 4.0);
            tuning.chest.escort_ring = escort_ring;
            let mut rng = Pcg32::seed_from_u64(3);
            Self {
                chest: TreasureChest::new(&tuning, &mut rng),
                creatures: Vec::new(),
                ids: CreatureIds::default(),
                tuning,
                catalog: Catalog::builtin(),
                rng,
            }
        }

        fn step(&mut self) -> Option<ChestEvent> {
            self.chest.update(
                SIM_DT,
                &mut self.creatures,
                &mut self.ids,
                &self.tuning,
                &self.catalog,
                &mut self.rng,
            )
        }

        /// Tick until `state`, returning the ticks taken
        fn run_until(&mut self, state: ChestState, limit: u32) -> u32 {
            for n in 1..=limit {
                self.step();
                if self.chest.state == state {
                    return n;
                }
            }
            panic!("chest never reached {state:?}, stuck in {:?}", self.chest.state);
        }

        fn treasures(&self) -> usize {
            self.creatures
                .iter()
                .filter(|c| c.def.behavior == BehaviorTag::Treasure)
                .count()
        }
    }

    #[test]
    fn test_opens_with_one_treasure() {
        let mut f = Fixture::new(false);
        assert_eq!(f.chest.state, ChestState::Closed);
        f.run_until(ChestState::Opening, 120);
        assert_eq!(f.treasures(), 0);
        f.run_until(ChestState::Open, 60);
        assert_eq!(f.treasures(), 1);
        assert_eq!(f.creatures.len(), 1);
        let t = &f.creatures[0];
        assert_eq!(Some(t.id), f.chest.treasure_id());
        assert_eq!(t.pos, Vec2::new(960.0, 400.0));
    }

    #[test]
    fn test_lid_opening_reported_once() {
        let mut f = Fixture::new(false);
        let mut lid_events = 0;
        let mut surfaced = 0;
        for _ in 0..200 {
            match f.step() {
                Some(ChestEvent::LidOpening) => lid_events += 1,
                Some(ChestEvent::TreasureSurfaced { .. }) => surfaced += 1,
                _ => {}
            }
        }
        assert_eq!(lid_events, 1);
        assert_eq!(surfaced, 1);
    }

    #[test]
    fn test_caught_treasure_closes_early() {
        let mut f = Fixture::new(true);
        f.run_until(ChestState::Open, 200);
        f.step();
        let id = f.chest.treasure_id().unwrap();
        f.creatures.iter_mut().find(|c| c.id == id).unwrap().alive = false;

        // Well inside the 4 s open duration
        let ticks = f.run_until(ChestState::Closing, 5);
        assert_eq!(ticks, 1);
        assert!(f.chest.treasure_id().is_none());
        assert!(f.chest.ring_ids().is_empty());
        assert!(f.creatures.iter().all(|c| !c.alive));
        assert_eq!(f.chest.transition_progress(), 1.0);
    }

    #[test]
    fn test_uncaught_treasure_sinks() {
        let mut f = Fixture::new(true);
        f.run_until(ChestState::Open, 200);
        f.run_until(ChestState::Retreating, 300);
        assert!(f.creatures.iter().all(|c| c.alive));

        let mut lost = false;
        for _ in 0..120 {
            if let Some(ChestEvent::TreasureLost { type_id, .. }) = f.step() {
                assert!(type_id.starts_with("treasure_"));
                lost = true;
            }
            if f.chest.state == ChestState::Closing {
                break;
            }
        }
        assert!(lost);
        assert!(f.creatures.iter().all(|c| !c.alive));
        f.run_until(ChestState::Closed, 60);
        assert!((f.chest.time_until_open() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_escort_ring_orbits() {
        let mut f = Fixture::new(true);
        f.run_until(ChestState::Open, 200);
        assert_eq!(f.chest.ring_ids().len(), 6);
        let ring: Vec<&Creature> = f
            .creatures
            .iter()
            .filter(|c| c.def.behavior == BehaviorTag::Escort)
            .collect();
        assert_eq!(ring.len(), 6);
        assert!(ring.iter().all(|c| c.hitbox_radius() == 30.0));
        let before: Vec<f32> = ring.iter().map(|c| c.pos.x).collect();

        f.step();
        for c in f.creatures.iter().filter(|c| c.def.behavior == BehaviorTag::Escort) {
            // Logical y stays on the chest line, the ring is drawn via render_y
            assert_eq!(c.pos.y, 400.0);
            let dx = c.pos.x - 960.0;
            let dy = c.render_y - (400.0 + f.chest.bob_phase.sin() * BOB_AMPLITUDE);
            assert!(((dx * dx + dy * dy).sqrt() - 90.0).abs() < 1e-2);
        }
        let after: Vec<f32> = f
            .creatures
            .iter()
            .filter(|c| c.def.behavior == BehaviorTag::Escort)
            .map(|c| c.pos.x)
            .collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_caught_ring_member_left_alone() {
        let mut f = Fixture::new(true);
        f.run_until(ChestState::Open, 200);
        let member = f.chest.ring_ids()[0];
        let c = f.creatures.iter_mut().find(|c| c.id == member).unwrap();
        c.alive = false;
        c.place(Vec2::new(5.0, 5.0));

        f.step();
        let c = f.creatures.iter().find(|c| c.id == member).unwrap();
        assert_eq!(c.pos, Vec2::new(5.0, 5.0));
        // Losing an escort does not close the chest
        assert_eq!(f.chest.state, ChestState::Open);
    }
}
