//! Live creature entities
//!
//! Sea creatures, ghosts, treasure items and escort ring members all share
//! this one record; behaviour differences come from the catalog's
//! `BehaviorTag` dispatch table.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::{BehaviorTraits, CreatureTypeDef};

/// Monotonic creature id source shared by the spawner, the chest and debug
/// injection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureIds {
    next: u32,
}

impl Default for CreatureIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl CreatureIds {
    /// Allocate a new entity ID
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A creature in the shared live collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub id: u32,
    /// Catalog entry this creature was spawned from
    pub def: CreatureTypeDef,
    /// Logical position
    pub pos: Vec2,
    /// Rendered (and hit-tested) y; differs from `pos.y` under wave motion
    pub render_y: f32,
    pub vel: Vec2,
    pub alive: bool,
    /// Wave phase (radians)
    pub wave_phase: f32,
}

impl Creature {
    pub fn new(id: u32, def: CreatureTypeDef, pos: Vec2, vel: Vec2, wave_phase: f32) -> Self {
        Self {
            id,
            def,
            pos,
            render_y: pos.y,
            vel,
            alive: true,
            wave_phase,
        }
    }

    #[inline]
    pub fn traits(&self) -> BehaviorTraits {
        self.def.behavior.traits()
    }

    /// Hitbox centre
    #[inline]
    pub fn hit_center(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.render_y)
    }

    #[inline]
    pub fn hitbox_radius(&self) -> f32 {
        self.def.hitbox_radius
    }

    /// Advance self-propelled motion; dead or externally positioned
    /// creatures are left alone
    pub fn update(&mut self, dt: f32) {
        if !self.alive || !self.traits().self_propelled {
            return;
        }

        self.pos += self.vel * dt;

        match self.def.wave {
            Some(wave) if wave.amplitude > 0.0 => {
                self.wave_phase += wave.frequency * dt;
                self.render_y = self.pos.y + self.wave_phase.sin() * wave.amplitude;
            }
            _ => self.render_y = self.pos.y,
        }
    }

    /// Place the creature exactly at `pos` (harpoon drag, chest anchoring)
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.render_y = pos.y;
    }

    /// Outside the field by more than the despawn margin plus its own size
    pub fn is_offscreen(&self, width: f32, height: f32, despawn_margin: f32) -> bool {
        if !self.traits().despawns_offscreen {
            return false;
        }
        let margin = despawn_margin + self.def.display_size;
        self.pos.x < -margin
            || self.pos.x > width + margin
            || self.pos.y < -margin
            || self.pos.y > height + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn creature(id: &str) -> Creature {
        let def = Catalog::builtin().find_any(id).unwrap().clone();
        Creature::new(1, def, Vec2::new(100.0, 200.0), Vec2::new(50.0, 0.0), 0.0)
    }

    #[test]
    fn test_moves_with_velocity() {
        let mut c = creature("giant_isopod");
        c.update(0.5);
        assert!((c.pos.x - 125.0).abs() < 1e-4);
        assert_eq!(c.render_y, c.pos.y);
    }

    #[test]
    fn test_wave_offsets_render_y_only() {
        let mut c = creature("frilled_shark");
        c.update(0.5);
        // phase = 3 * 0.5
        let expected = 200.0 + (1.5f32).sin() * 30.0;
        assert!((c.render_y - expected).abs() < 1e-3);
        assert_eq!(c.pos.y, 200.0);
    }

    #[test]
    fn test_dead_creature_frozen() {
        let mut c = creature("giant_isopod");
        c.alive = false;
        c.update(1.0);
        assert_eq!(c.pos, Vec2::new(100.0, 200.0));
    }

    #[test]
    fn test_offscreen_margin() {
        let mut c = creature("giant_isopod");
        // display 96 + margin 100
        c.pos.x = -195.0;
        assert!(!c.is_offscreen(1920.0, 1080.0, 100.0));
        c.pos.x = -197.0;
        assert!(c.is_offscreen(1920.0, 1080.0, 100.0));
    }

    #[test]
    fn test_treasure_never_offscreen() {
        let mut c = creature("treasure_chalice");
        c.pos = Vec2::new(-5000.0, -5000.0);
        assert!(!c.is_offscreen(1920.0, 1080.0, 100.0));
        c.update(1.0);
        assert_eq!(c.pos, Vec2::new(-5000.0, -5000.0));
    }
}
