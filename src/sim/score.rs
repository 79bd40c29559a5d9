//! Per-player score and harpoon economy

use serde::{Deserialize, Serialize};

use super::creature::Creature;
use crate::catalog::Rarity;

/// One landed catch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchRecord {
    pub type_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub points: u32,
}

/// Catches of one creature type, for the score screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchTally {
    pub type_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub points: u32,
    pub count: u32,
}

/// End-of-round report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub score: u64,
    pub total_catches: usize,
    pub harpoons_fired: u32,
    /// Whole percent
    pub accuracy: u32,
    pub best_catch: Option<CatchRecord>,
    /// In order of first catch
    pub catches_by_type: Vec<CatchTally>,
}

/// Score, harpoon inventory and catch history for one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreManager {
    pub(crate) score: u64,
    /// May dip below zero between a fire and the next game-over check
    pub(crate) harpoons_remaining: i32,
    pub(crate) harpoons_fired: u32,
    pub(crate) catches: Vec<CatchRecord>,
    pub(crate) best_catch: Option<CatchRecord>,
    starting_harpoons: i32,
}

impl ScoreManager {
    pub fn new(starting_harpoons: i32) -> Self {
        Self {
            score: 0,
            harpoons_remaining: starting_harpoons,
            harpoons_fired: 0,
            catches: Vec::new(),
            best_catch: None,
            starting_harpoons,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.starting_harpoons);
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Harpoons left, never below zero
    pub fn harpoons_remaining(&self) -> i32 {
        self.harpoons_remaining.max(0)
    }

    pub fn harpoons_fired(&self) -> u32 {
        self.harpoons_fired
    }

    pub fn catches(&self) -> &[CatchRecord] {
        &self.catches
    }

    pub fn best_catch(&self) -> Option<&CatchRecord> {
        self.best_catch.as_ref()
    }

    /// Spend one harpoon; call once per successful fire
    pub fn use_harpoon(&mut self) {
        self.harpoons_remaining -= 1;
        self.harpoons_fired += 1;
    }

    /// Record a catch and return the bonus harpoons it granted
    pub fn add_catch(&mut self, creature: &Creature) -> u32 {
        let record = CatchRecord {
            type_id: creature.def.id.clone(),
            name: creature.def.name.clone(),
            rarity: creature.def.rarity,
            points: creature.def.points,
        };
        self.score += u64::from(record.points);

        // Ties keep the earlier catch
        let better = self
            .best_catch
            .as_ref()
            .map(|best| record.points > best.points)
            .unwrap_or(true);
        if better {
            self.best_catch = Some(record.clone());
        }
        self.catches.push(record);

        let bonus = creature.def.bonus_harpoons;
        self.harpoons_remaining += bonus as i32;
        bonus
    }

    /// Deduct `cost` points; fails (no change) if the score can't cover it
    pub fn spend(&mut self, cost: u64) -> bool {
        match self.score.checked_sub(cost) {
            Some(left) => {
                self.score = left;
                true
            }
            None => false,
        }
    }

    pub fn grant_harpoons(&mut self, count: i32) {
        self.harpoons_remaining += count;
    }

    /// Catches per harpoon fired (0 before the first shot)
    pub fn accuracy(&self) -> f32 {
        if self.harpoons_fired == 0 {
            0.0
        } else {
            self.catches.len() as f32 / self.harpoons_fired as f32
        }
    }

    pub fn is_out_of_harpoons(&self) -> bool {
        self.harpoons_remaining <= 0
    }

    pub fn summary(&self) -> ScoreSummary {
        let mut by_type: Vec<CatchTally> = Vec::new();
        for c in &self.catches {
            match by_type.iter_mut().find(|t| t.type_id == c.type_id) {
                Some(tally) => tally.count += 1,
                None => by_type.push(CatchTally {
                    type_id: c.type_id.clone(),
                    name: c.name.clone(),
                    rarity: c.rarity,
                    points: c.points,
                    count: 1,
                }),
            }
        }

        ScoreSummary {
            score: self.score,
            total_catches: self.catches.len(),
            harpoons_fired: self.harpoons_fired,
            accuracy: (self.accuracy() * 100.0).round() as u32,
            best_catch: self.best_catch.clone(),
            catches_by_type: by_type,
        }
    }
}
