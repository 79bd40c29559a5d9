//! Presentation feedback derived from simulation events
//!
//! The round queues `GameEvent`s during each tick. Audio, particle and toast
//! layers live outside this crate; they drain the queue and react through a
//! `FeedbackSink`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;
use crate::sim::state::Winner;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Harpoon left the launcher
    Fired { player: usize, anchor: Vec2 },
    /// Creature speared
    Catch {
        player: usize,
        type_id: String,
        name: String,
        rarity: Rarity,
        points: u32,
        bonus_harpoons: u32,
        pos: Vec2,
    },
    /// Harpoon came home empty
    Miss { player: usize },
    ChestOpening,
    TreasureSurfaced { type_id: String, pos: Vec2 },
    /// Treasure sank back into the chest uncaught
    TreasureLost { type_id: String },
    /// Shot clock ran out with enough points to buy back in
    BuybackOffered { player: usize },
    BuybackAccepted { player: usize, harpoons: i32 },
    BuybackDeclined { player: usize },
    /// Shot clock ran out and ended this player's session
    ShotClockExpired { player: usize },
    RoundTimeUp,
    /// Round outcome decided
    GameOver { winner: Option<Winner> },
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Harpoon hits the water
    Splash,
    /// Regular catch
    Hit,
    /// Legendary catch
    Legendary,
    /// Extra harpoons granted
    BonusHarpoon,
    /// Empty return
    Miss,
    ChestOpen,
    GameOver,
}

/// Particle emission request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParticleBurst {
    Splash { pos: Vec2 },
    /// Small spark in the rarity colour
    Hit { pos: Vec2, color: String },
    /// Big gold burst for epic and legendary catches
    Legendary { pos: Vec2 },
}

/// Floating catch text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub player: usize,
    pub text: String,
    pub rarity: Rarity,
    /// Anchor, above the catch
    pub pos: Vec2,
}

/// Toasts float this far above the catch
const TOAST_LIFT: f32 = 40.0;

impl GameEvent {
    /// Sound cues, in play order
    pub fn sounds(&self) -> Vec<SoundCue> {
        match self {
            GameEvent::Fired { .. } => vec![SoundCue::Splash],
            GameEvent::Catch {
                rarity, bonus_harpoons, ..
            } => {
                let mut cues = vec![if *rarity == Rarity::Legendary {
                    SoundCue::Legendary
                } else {
                    SoundCue::Hit
                }];
                if *bonus_harpoons > 0 {
                    cues.push(SoundCue::BonusHarpoon);
                }
                cues
            }
            GameEvent::Miss { .. } => vec![SoundCue::Miss],
            GameEvent::ChestOpening => vec![SoundCue::ChestOpen],
            GameEvent::BuybackAccepted { .. } => vec![SoundCue::BonusHarpoon],
            GameEvent::GameOver { .. } => vec![SoundCue::GameOver],
            _ => Vec::new(),
        }
    }

    pub fn particles(&self) -> Option<ParticleBurst> {
        match self {
            GameEvent::Fired { anchor, .. } => Some(ParticleBurst::Splash { pos: *anchor }),
            GameEvent::Catch { rarity, pos, .. } if rarity.is_showcase() => {
                Some(ParticleBurst::Legendary { pos: *pos })
            }
            GameEvent::Catch { rarity, pos, .. } => Some(ParticleBurst::Hit {
                pos: *pos,
                color: rarity.color().to_string(),
            }),
            _ => None,
        }
    }

    pub fn toast(&self) -> Option<Toast> {
        match self {
            GameEvent::Catch {
                player,
                name,
                rarity,
                points,
                bonus_harpoons,
                pos,
                ..
            } => {
                let mut text = format!("{name} ({}) +{points}", rarity.as_str());
                if *bonus_harpoons > 0 {
                    text.push_str(&format!(" +{bonus_harpoons} harpoon"));
                    if *bonus_harpoons > 1 {
                        text.push('s');
                    }
                }
                Some(Toast {
                    player: *player,
                    text,
                    rarity: *rarity,
                    pos: *pos - Vec2::new(0.0, TOAST_LIFT),
                })
            }
            _ => None,
        }
    }
}

/// Receiver for derived feedback
pub trait FeedbackSink {
    fn play(&mut self, cue: SoundCue);
    fn emit(&mut self, burst: ParticleBurst);
    fn toast(&mut self, toast: Toast);
    /// Raw event, after the derived calls above
    fn event(&mut self, _event: &GameEvent) {}
}

/// Fan events out to a sink
pub fn dispatch<'a>(events: impl IntoIterator<Item = &'a GameEvent>, sink: &mut impl FeedbackSink) {
    for event in events {
        for cue in event.sounds() {
            sink.play(cue);
        }
        if let Some(burst) = event.particles() {
            sink.emit(burst);
        }
        if let Some(toast) = event.toast() {
            sink.toast(toast);
        }
        sink.event(event);
    }
}

/// Sink that writes everything to the log
#[derive(Debug, Default)]
pub struct LogFeedback {
    pub sounds_played: usize,
}

impl FeedbackSink for LogFeedback {
    fn play(&mut self, cue: SoundCue) {
        self.sounds_played += 1;
        log::debug!("sound {cue:?}");
    }

    fn emit(&mut self, burst: ParticleBurst) {
        log::debug!("particles {burst:?}");
    }

    fn toast(&mut self, toast: Toast) {
        log::debug!("toast P{}: {}", toast.player + 1, toast.text);
    }

    fn event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GameOver { winner } => log::info!("game over, winner {winner:?}"),
            GameEvent::RoundTimeUp => log::info!("round time up"),
            GameEvent::TreasureLost { type_id } => log::debug!("{type_id} sank back into the chest"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catch(rarity: Rarity, bonus: u32) -> GameEvent {
        GameEvent::Catch {
            player: 0,
            type_id: "x".to_string(),
            name: "Gulper Eel".to_string(),
            rarity,
            points: 100,
            bonus_harpoons: bonus,
            pos: Vec2::new(100.0, 200.0),
        }
    }

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<SoundCue>,
        bursts: Vec<ParticleBurst>,
        toasts: Vec<Toast>,
        events: usize,
    }

    impl FeedbackSink for Recorder {
        fn play(&mut self, cue: SoundCue) {
            self.sounds.push(cue);
        }
        fn emit(&mut self, burst: ParticleBurst) {
            self.bursts.push(burst);
        }
        fn toast(&mut self, toast: Toast) {
            self.toasts.push(toast);
        }
        fn event(&mut self, _event: &GameEvent) {
            self.events += 1;
        }
    }

    #[test]
    fn test_legendary_catch_cues() {
        let e = catch(Rarity::Legendary, 1);
        assert_eq!(e.sounds(), vec![SoundCue::Legendary, SoundCue::BonusHarpoon]);
        assert!(matches!(e.particles(), Some(ParticleBurst::Legendary { .. })));
    }

    #[test]
    fn test_epic_gets_burst_but_hit_sound() {
        let e = catch(Rarity::Epic, 0);
        assert_eq!(e.sounds(), vec![SoundCue::Hit]);
        assert!(matches!(e.particles(), Some(ParticleBurst::Legendary { .. })));
    }

    #[test]
    fn test_common_spark_uses_rarity_color() {
        let e = catch(Rarity::Uncommon, 0);
        match e.particles() {
            Some(ParticleBurst::Hit { color, .. }) => assert_eq!(color, "#2ECC71"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_toast_text() {
        let t = catch(Rarity::Legendary, 1).toast().unwrap();
        assert_eq!(t.text, "Gulper Eel (legendary) +100 +1 harpoon");
        assert_eq!(t.pos, Vec2::new(100.0, 160.0));
        let t = catch(Rarity::Rare, 3).toast().unwrap();
        assert!(t.text.ends_with("+3 harpoons"));
    }

    #[test]
    fn test_dispatch_fans_out() {
        let events = vec![
            GameEvent::Fired {
                player: 1,
                anchor: Vec2::new(960.0, 40.0),
            },
            catch(Rarity::Common, 0),
            GameEvent::RoundTimeUp,
        ];
        let mut sink = Recorder::default();
        dispatch(&events, &mut sink);
        assert_eq!(sink.sounds, vec![SoundCue::Splash, SoundCue::Hit]);
        assert_eq!(sink.bursts.len(), 2);
        assert_eq!(sink.toasts.len(), 1);
        assert_eq!(sink.events, 3);
    }
}
