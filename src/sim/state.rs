//! Round and player state
//!
//! Everything one round owns lives here: player slots, the shared creature
//! collection, spawner, chest, timers and the seeded RNG. Per-tick logic is
//! in `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chest::TreasureChest;
use super::creature::{Creature, CreatureIds};
use super::harpoon::Harpoon;
use super::score::{ScoreManager, ScoreSummary};
use super::spawn::SpawnManager;
use super::tick::tick;
use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::feedback::GameEvent;
use crate::tuning::Tuning;

/// Per-player input for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    /// Fire request (consumed this tick whether or not it could fire)
    pub fire: bool,
    /// Aim angle from vertical (radians)
    pub aim_angle: f32,
}

/// Two-player outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player(usize),
    Tie,
}

/// One participant's slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub harpoon: Harpoon,
    pub score: ScoreManager,
    /// Seconds left to fire before the shot clock runs out
    pub shot_timer: f32,
    /// Shot clock starts with the first fire
    pub shot_timer_active: bool,
    pub game_over: bool,
    pub buyback_pending: bool,
}

impl PlayerState {
    pub fn new(index: usize, tuning: &Tuning) -> Self {
        Self {
            harpoon: Harpoon::new(index, tuning),
            score: ScoreManager::new(tuning.round.starting_harpoons),
            shot_timer: tuning.round.shot_timer,
            shot_timer_active: false,
            game_over: false,
            buyback_pending: false,
        }
    }

    /// Able to take input this tick
    pub fn is_active(&self) -> bool {
        !self.game_over && !self.buyback_pending
    }

    /// Out of the round and not waiting on a buyback decision
    pub fn is_done(&self) -> bool {
        !self.buyback_pending
            && (self.game_over || (self.score.is_out_of_harpoons() && self.harpoon.is_idle()))
    }

    pub fn harpoons_remaining(&self) -> i32 {
        self.score.harpoons_remaining()
    }

    /// Shot clock value for the HUD, once running
    pub fn shot_clock(&self) -> Option<f32> {
        self.shot_timer_active.then_some(self.shot_timer.max(0.0))
    }
}

/// End-of-round report for the score screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub seed: u64,
    pub winner: Option<Winner>,
    pub elapsed: f32,
    pub players: Vec<ScoreSummary>,
}

/// Complete round state
#[derive(Debug, Clone)]
pub struct RoundState {
    pub(crate) tuning: Tuning,
    pub(crate) catalog: Catalog,
    pub(crate) players: Vec<PlayerState>,
    /// Shared live collection, in spawn order
    pub(crate) creatures: Vec<Creature>,
    pub(crate) spawner: SpawnManager,
    pub(crate) chest: TreasureChest,
    pub(crate) round_timer: f32,
    pub(crate) game_over_pending: bool,
    pub(crate) game_over_timer: f32,
    pub(crate) winner: Option<Winner>,
    /// Decorative clock (water, bobbing); no gameplay effect
    pub(crate) ambient_time: f32,
    pub(crate) time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    pub(crate) ids: CreatureIds,
    seed: u64,
}

impl RoundState {
    /// Validate configuration and set up a fresh round
    pub fn new(tuning: Tuning, catalog: Catalog, player_count: usize, seed: u64) -> Result<Self, ConfigError> {
        if !(1..=2).contains(&player_count) {
            return Err(ConfigError::PlayerCount(player_count));
        }
        tuning.validate()?;
        tuning.validate_catalog(&catalog)?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let players = (0..player_count).map(|i| PlayerState::new(i, &tuning)).collect();
        let chest = TreasureChest::new(&tuning, &mut rng);
        log::info!("new round: {player_count} player(s), seed {seed}");

        Ok(Self {
            spawner: SpawnManager::new(&tuning),
            chest,
            round_timer: tuning.round.round_time,
            players,
            creatures: Vec::new(),
            game_over_pending: false,
            game_over_timer: 0.0,
            winner: None,
            ambient_time: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            rng,
            ids: CreatureIds::default(),
            seed,
            tuning,
            catalog,
        })
    }

    /// Start over with the same configuration and seed
    pub fn reset(&mut self) {
        let player_count = self.players.len();
        let mut rng = Pcg32::seed_from_u64(self.seed);
        self.players = (0..player_count).map(|i| PlayerState::new(i, &self.tuning)).collect();
        self.chest = TreasureChest::new(&self.tuning, &mut rng);
        self.spawner = SpawnManager::new(&self.tuning);
        self.creatures.clear();
        self.round_timer = self.tuning.round.round_time;
        self.game_over_pending = false;
        self.game_over_timer = 0.0;
        self.winner = None;
        self.ambient_time = 0.0;
        self.time_ticks = 0;
        self.events.clear();
        self.rng = rng;
        self.ids = CreatureIds::default();
    }

    /// Advance one fixed step
    pub fn update_round(&mut self, dt: f32, inputs: &[PlayerInput]) {
        tick(self, inputs, dt);
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&PlayerState> {
        self.players.get(index)
    }

    pub fn is_two_player(&self) -> bool {
        self.players.len() == 2
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creature(&self, id: u32) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    /// Creatures speared on a player's harpoon
    pub fn impaled(&self, player: usize) -> impl Iterator<Item = &Creature> {
        let ids = self.players.get(player).map(|p| p.harpoon.impaled.as_slice()).unwrap_or(&[]);
        self.creatures.iter().filter(move |c| ids.contains(&c.id))
    }

    pub fn chest(&self) -> &TreasureChest {
        &self.chest
    }

    /// Seconds left in the round
    pub fn round_timer(&self) -> f32 {
        self.round_timer
    }

    pub fn ambient_time(&self) -> f32 {
        self.ambient_time
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// Outcome decided; harpoons may still be reeling in
    pub fn is_game_over_pending(&self) -> bool {
        self.game_over_pending
    }

    /// Ready for the score screen
    pub fn is_finished(&self) -> bool {
        self.game_over_pending
            && self.game_over_timer >= self.tuning.round.game_over_delay
            && self.players.iter().all(|p| p.harpoon.is_idle())
    }

    pub fn is_buyback_pending(&self, player: usize) -> bool {
        self.players.get(player).is_some_and(|p| p.buyback_pending)
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            seed: self.seed,
            winner: self.winner,
            elapsed: self.tuning.round.round_time - self.round_timer,
            players: self.players.iter().map(|p| p.score.summary()).collect(),
        }
    }

    /// Spend the buyback cost for more harpoons. Fails unless a buyback is
    /// pending and still affordable.
    pub fn accept_buyback(&mut self, player: usize) -> bool {
        let round = &self.tuning.round;
        let Some(p) = self.players.get_mut(player) else {
            log::warn!("buyback accept for unknown player {player}");
            return false;
        };
        if !p.buyback_pending {
            log::warn!("buyback accept for player {player} with no offer pending");
            return false;
        }
        if !p.score.spend(round.buyback_cost) {
            log::warn!("player {player} can no longer afford the buyback");
            return false;
        }
        p.score.grant_harpoons(round.buyback_harpoons);
        p.buyback_pending = false;
        p.shot_timer = round.shot_timer;
        log::debug!("player {player} bought {} harpoon(s)", round.buyback_harpoons);
        self.events.push(GameEvent::BuybackAccepted {
            player,
            harpoons: round.buyback_harpoons,
        });
        true
    }

    /// Decline the buyback and end this player's session
    pub fn reject_buyback(&mut self, player: usize) -> bool {
        let Some(p) = self.players.get_mut(player) else {
            log::warn!("buyback reject for unknown player {player}");
            return false;
        };
        if !p.buyback_pending {
            log::warn!("buyback reject for player {player} with no offer pending");
            return false;
        }
        p.buyback_pending = false;
        p.game_over = true;
        self.events.push(GameEvent::BuybackDeclined { player });
        true
    }

    /// Debug hook: drop a catalog creature into the field
    pub fn spawn_creature(&mut self, type_id: &str, pos: Vec2, vel: Vec2) -> Option<u32> {
        let Some(def) = self.catalog.find_any(type_id) else {
            log::warn!("spawn_creature: unknown type `{type_id}`");
            return None;
        };
        let id = self.ids.allocate();
        self.creatures.push(Creature::new(id, def.clone(), pos, vel, 0.0));
        Some(id)
    }

    /// Average harpoons left over players still in the round, or over
    /// everyone once all are out
    pub(crate) fn average_harpoons(&self) -> f32 {
        let active: Vec<&PlayerState> = self.players.iter().filter(|p| !p.game_over).collect();
        let pool: Vec<&PlayerState> = if active.is_empty() {
            self.players.iter().collect()
        } else {
            active
        };
        let total: i32 = pool.iter().map(|p| p.harpoons_remaining()).sum();
        total as f32 / pool.len().max(1) as f32
    }

    /// Ghost cadence for the current player situation
    pub(crate) fn ghost_interval(&self) -> f32 {
        let spawn = &self.tuning.spawn;
        if !self.is_two_player() {
            spawn.ghost_interval_solo
        } else if self.players.iter().any(|p| p.score.is_out_of_harpoons()) {
            spawn.ghost_interval_rubber_band
        } else {
            spawn.ghost_interval_two_player
        }
    }
}
