//! Fixed timestep round tick
//!
//! Order per tick: ambient clock, round clock, each player in turn (shot
//! clock, fire, harpoon, collision), spawner, chest, creature motion and
//! pruning, then the end-of-round check.

use super::chest::ChestEvent;
use super::collision::check_harpoon;
use super::state::{PlayerInput, PlayerState, RoundState, Winner};
use crate::feedback::GameEvent;

/// Advance the round by one fixed timestep
pub fn tick(round: &mut RoundState, inputs: &[PlayerInput], dt: f32) {
    // Zero (or garbage) dt is a no-op tick
    if !(dt.is_finite() && dt > 0.0) || round.is_finished() {
        return;
    }

    round.ambient_time += dt;
    round.time_ticks += 1;

    advance_round_clock(round, dt);
    if round.game_over_pending {
        round.game_over_timer += dt;
    }

    for index in 0..round.players.len() {
        let input = inputs.get(index).copied().unwrap_or_default();
        update_player(round, index, input, dt);
    }

    if !round.game_over_pending {
        let avg = round.average_harpoons();
        let ghost_interval = round.ghost_interval();
        let RoundState {
            spawner,
            creatures,
            ids,
            tuning,
            catalog,
            rng,
            ..
        } = round;
        spawner.update(dt, avg, ghost_interval, creatures, ids, tuning, catalog, rng);
    }

    update_chest(round, dt);
    update_creatures(round, dt);
    check_round_end(round);
}

fn advance_round_clock(round: &mut RoundState, dt: f32) {
    if round.game_over_pending || round.round_timer <= 0.0 {
        return;
    }
    round.round_timer -= dt;
    if round.round_timer <= 0.0 {
        round.round_timer = 0.0;
        for p in round.players.iter_mut() {
            p.game_over = true;
            // Time up settles any open offer
            p.buyback_pending = false;
        }
        log::info!("round time up");
        round.events.push(GameEvent::RoundTimeUp);
    }
}

fn update_player(round: &mut RoundState, index: usize, input: PlayerInput, dt: f32) {
    let player_count = round.players.len();
    let pending = round.game_over_pending;
    let RoundState {
        players,
        creatures,
        events,
        tuning,
        ..
    } = round;
    let player: &mut PlayerState = &mut players[index];

    if player.is_active() {
        if player.shot_timer_active && !pending {
            player.shot_timer -= dt;
            if player.shot_timer <= 0.0 {
                player.shot_timer = 0.0;
                let rules = &tuning.round;
                if rules.buyback_mode.allows(player_count) && player.score.score() >= rules.buyback_cost {
                    player.buyback_pending = true;
                    log::debug!("player {index} shot clock expired, buyback offered");
                    events.push(GameEvent::BuybackOffered { player: index });
                } else {
                    player.game_over = true;
                    log::debug!("player {index} shot clock expired");
                    events.push(GameEvent::ShotClockExpired { player: index });
                }
            }
        }

        if player.is_active()
            && !pending
            && input.fire
            && player.harpoon.is_idle()
            && player.score.harpoons_remaining() > 0
            && player.harpoon.fire(input.aim_angle)
        {
            player.score.use_harpoon();
            player.shot_timer = tuning.round.shot_timer;
            player.shot_timer_active = true;
            log::debug!("player {index} fired at {:.1} deg", player.harpoon.angle.to_degrees());
            events.push(GameEvent::Fired {
                player: index,
                anchor: player.harpoon.base,
            });
        }
    }

    // Harpoons keep flying after a player is out so they always come home
    let arrived = player.harpoon.update(dt, creatures);
    if arrived && !player.harpoon.landed_catch {
        events.push(GameEvent::Miss { player: index });
    }

    // Scores are final once the outcome is decided; harpoons only reel in
    if pending {
        return;
    }
    let hits = check_harpoon(&player.harpoon, creatures);
    if hits.is_empty() {
        return;
    }
    let struck: Vec<usize> = hits.iter().map(|h| h.index).collect();
    player.harpoon.latch_creatures(
        creatures
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| struck.contains(i))
            .map(|(_, c)| c),
    );

    for hit in &hits {
        let creature = &creatures[hit.index];
        let bonus = player.score.add_catch(creature);
        log::debug!(
            "player {index} caught {} for {} (+{bonus} harpoons)",
            creature.def.id,
            creature.def.points
        );
        events.push(GameEvent::Catch {
            player: index,
            type_id: creature.def.id.clone(),
            name: creature.def.name.clone(),
            rarity: creature.def.rarity,
            points: creature.def.points,
            bonus_harpoons: bonus,
            pos: creature.hit_center(),
        });
    }
}

fn update_chest(round: &mut RoundState, dt: f32) {
    let RoundState {
        chest,
        creatures,
        ids,
        tuning,
        catalog,
        rng,
        events,
        ..
    } = round;
    match chest.update(dt, creatures, ids, tuning, catalog, rng) {
        Some(ChestEvent::LidOpening) => events.push(GameEvent::ChestOpening),
        Some(ChestEvent::TreasureSurfaced { type_id, pos, .. }) => {
            events.push(GameEvent::TreasureSurfaced { type_id, pos })
        }
        Some(ChestEvent::TreasureLost { type_id, .. }) => events.push(GameEvent::TreasureLost { type_id }),
        None => {}
    }
}

fn update_creatures(round: &mut RoundState, dt: f32) {
    let (width, height) = (round.tuning.field.width, round.tuning.field.height);
    let margin = round.tuning.spawn.despawn_margin;

    for creature in round.creatures.iter_mut() {
        creature.update(dt);
    }

    let players = &round.players;
    let speared = |id: u32| players.iter().any(|p| p.harpoon.impaled.contains(&id));
    round.creatures.retain(|c| {
        if c.alive {
            !c.is_offscreen(width, height, margin)
        } else {
            speared(c.id)
        }
    });
}

fn check_round_end(round: &mut RoundState) {
    if round.game_over_pending || !round.players.iter().all(PlayerState::is_done) {
        return;
    }

    round.game_over_pending = true;
    round.game_over_timer = 0.0;
    round.winner = match round.players.as_slice() {
        [a, b] => Some(match a.score.score().cmp(&b.score.score()) {
            std::cmp::Ordering::Greater => Winner::Player(0),
            std::cmp::Ordering::Less => Winner::Player(1),
            std::cmp::Ordering::Equal => Winner::Tie,
        }),
        _ => None,
    };
    log::info!("round over after {} ticks, winner {:?}", round.time_ticks, round.winner);
    round.events.push(GameEvent::GameOver { winner: round.winner });
}
