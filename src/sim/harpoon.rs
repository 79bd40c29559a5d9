//! Per-player harpoon state machine
//!
//! Idle -> Traveling -> Retracting -> Idle. A hit cuts travel short and goes
//! straight to Retracting; nothing ever returns to Idle without retracting.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::creature::Creature;
use crate::aim_direction;
use crate::tuning::Tuning;

/// Harpoon state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarpoonState {
    /// Resting at the launcher, ready to fire
    Idle,
    /// Flying outward along the aim angle
    Traveling,
    /// Being reeled in, dragging any impaled creatures
    Retracting,
}

/// One player's harpoon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Harpoon {
    pub state: HarpoonState,
    /// Launcher anchor
    pub base: Vec2,
    /// -1.0 fires up the screen, 1.0 fires down
    pub vertical: f32,
    /// Aim angle from vertical (radians), fixed for a flight
    pub angle: f32,
    pub tip: Vec2,
    /// Tip position at the start of the last update (swept collision)
    pub prev_tip: Vec2,
    /// Distance travelled outward since firing
    pub rope_length: f32,
    /// Creature ids currently speared on this harpoon
    pub impaled: Vec<u32>,
    /// Whether this flight has caught anything
    pub landed_catch: bool,
    /// Multi-catch variant
    pub pierce: bool,
    /// The last update moved the tip outward (also true on the turn-back tick)
    pub outward_sweep: bool,

    speed: f32,
    retract_speed: f32,
    max_rope: f32,
    aim_limit: f32,
    /// Field rect expanded by the off-screen margin: (min, max)
    bounds: (Vec2, Vec2),
}

impl Harpoon {
    /// Player 0 sits at the bottom firing up, player 1 at the top firing down
    pub fn new(player: usize, tuning: &Tuning) -> Self {
        let field = &tuning.field;
        let h = &tuning.harpoon;
        let (base, vertical) = if player == 0 {
            (Vec2::new(field.width / 2.0, field.height - h.anchor_inset), -1.0)
        } else {
            (Vec2::new(field.width / 2.0, h.anchor_inset), 1.0)
        };
        let margin = Vec2::splat(h.offscreen_margin);

        Self {
            state: HarpoonState::Idle,
            base,
            vertical,
            angle: 0.0,
            tip: base,
            prev_tip: base,
            rope_length: 0.0,
            impaled: Vec::new(),
            landed_catch: false,
            pierce: h.pierce,
            outward_sweep: false,
            speed: h.speed,
            retract_speed: h.retract_speed,
            max_rope: h.max_rope,
            aim_limit: h.aim_limit_deg.to_radians(),
            bounds: (-margin, Vec2::new(field.width, field.height) + margin),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == HarpoonState::Idle
    }

    /// Symmetric aim limit (radians)
    pub fn aim_limit(&self) -> f32 {
        self.aim_limit
    }

    /// The segment from `prev_tip` to `tip` is an outward sweep that has
    /// not caught anything yet
    #[inline]
    pub fn is_sweeping(&self) -> bool {
        self.outward_sweep && self.impaled.is_empty()
    }

    /// Current flight direction
    pub fn direction(&self) -> Vec2 {
        aim_direction(self.angle, self.vertical)
    }

    /// Fire at `angle` (clamped to the aim limit). Fails unless idle.
    pub fn fire(&mut self, angle: f32) -> bool {
        if self.state != HarpoonState::Idle || !angle.is_finite() {
            return false;
        }
        self.angle = angle.clamp(-self.aim_limit, self.aim_limit);
        self.tip = self.base;
        self.prev_tip = self.base;
        self.rope_length = 0.0;
        self.impaled.clear();
        self.landed_catch = false;
        self.outward_sweep = false;
        self.state = HarpoonState::Traveling;
        true
    }

    /// Spear the given creatures and start reeling in. Fails unless the last
    /// update swept outward.
    pub fn latch_creatures<'a>(&mut self, hits: impl IntoIterator<Item = &'a mut Creature>) -> bool {
        if !self.is_sweeping() {
            return false;
        }
        for creature in hits {
            creature.alive = false;
            self.impaled.push(creature.id);
        }
        self.landed_catch = !self.impaled.is_empty();
        self.state = HarpoonState::Retracting;
        true
    }

    fn tip_offscreen(&self) -> bool {
        let (min, max) = self.bounds;
        self.tip.x < min.x || self.tip.y < min.y || self.tip.x > max.x || self.tip.y > max.y
    }

    /// Advance one tick. Returns true on the tick the harpoon arrives home.
    pub fn update(&mut self, dt: f32, creatures: &mut [Creature]) -> bool {
        match self.state {
            HarpoonState::Idle => {
                self.outward_sweep = false;
                false
            }
            HarpoonState::Traveling => {
                self.outward_sweep = true;
                self.prev_tip = self.tip;
                let step = self.speed * dt;
                self.tip += self.direction() * step;
                self.rope_length += step;

                if self.rope_length >= self.max_rope || self.tip_offscreen() {
                    self.state = HarpoonState::Retracting;
                }
                false
            }
            HarpoonState::Retracting => {
                self.outward_sweep = false;
                self.prev_tip = self.tip;
                let step = self.retract_speed * dt;
                let to_base = self.base - self.tip;
                let dist = to_base.length();

                let arrived = dist <= step;
                if arrived {
                    self.tip = self.base;
                } else {
                    self.tip += to_base / dist * step;
                }

                // Speared creatures ride the tip
                for creature in creatures.iter_mut().filter(|c| self.impaled.contains(&c.id)) {
                    creature.place(self.tip);
                }

                if arrived {
                    self.state = HarpoonState::Idle;
                    self.impaled.clear();
                }
                arrived
            }
        }
    }
}
