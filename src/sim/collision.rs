//! Harpoon vs creature collision
//!
//! Only an outward sweep can hit anything, including the sweep on the tick
//! the harpoon turns back. The test runs against the segment from the
//! previous tip to the current tip, so a fast harpoon cannot skip over a
//! small creature between ticks.

use super::creature::Creature;
use super::geometry::segment_circle_intersection;
use super::harpoon::Harpoon;

/// One creature struck this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    /// Index into the creature slice
    pub index: usize,
    /// Parameter along the swept segment where contact begins
    pub t: f32,
}

/// Creatures hit by `harpoon` this tick, ordered by `t`.
///
/// A regular harpoon reports at most the single earliest hit; a piercing
/// harpoon reports every creature its swept segment touches. Dead creatures
/// are never tested.
pub fn check_harpoon(harpoon: &Harpoon, creatures: &[Creature]) -> Vec<CollisionHit> {
    if !harpoon.is_sweeping() {
        return Vec::new();
    }

    let mut hits: Vec<CollisionHit> = creatures
        .iter()
        .enumerate()
        .filter(|(_, c)| c.alive)
        .filter_map(|(index, c)| {
            segment_circle_intersection(harpoon.prev_tip, harpoon.tip, c.hit_center(), c.hitbox_radius())
                .map(|t| CollisionHit { index, t })
        })
        .collect();

    // Stable sort keeps collection order for equal t
    hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));

    if !harpoon.pierce {
        hits.truncate(1);
    }
    hits
}
