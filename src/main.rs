//! Abyss Harpoon headless runner
//!
//! Plays one round with simple auto-aiming bots through the fixed timestep
//! driver and prints the round summary as JSON.
//!
//! Usage: `abyss-harpoon [--players 1|2] [--seed N] [--tuning FILE]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use abyss_harpoon::consts::SIM_DT;
    use abyss_harpoon::error::ConfigError;
    use abyss_harpoon::feedback::dispatch;
    use abyss_harpoon::sim::{PlayerInput, RoundState};
    use abyss_harpoon::{Catalog, FixedStepDriver, LogFeedback, Tuning};

    /// Give up on a round that never ends (ten simulated minutes)
    const MAX_TICKS: u64 = 60 * 600;

    pub struct Options {
        pub players: usize,
        pub seed: u64,
        pub tuning: Option<String>,
    }

    impl Options {
        pub fn from_args(args: impl Iterator<Item = String>) -> Result<Self, ConfigError> {
            let mut options = Options {
                players: 1,
                seed: 0x5EA_F00D,
                tuning: None,
            };
            let mut args = args.skip(1);
            while let Some(flag) = args.next() {
                let value = args
                    .next()
                    .ok_or_else(|| ConfigError::InvalidValue {
                        field: "args",
                        reason: format!("{flag} needs a value"),
                    })?;
                match flag.as_str() {
                    "--players" => options.players = parse(&value, "--players")?,
                    "--seed" => options.seed = parse(&value, "--seed")?,
                    "--tuning" => options.tuning = Some(value),
                    other => {
                        return Err(ConfigError::InvalidValue {
                            field: "args",
                            reason: format!("unknown flag {other}"),
                        });
                    }
                }
            }
            Ok(options)
        }
    }

    fn parse<T: std::str::FromStr>(value: &str, flag: &'static str) -> Result<T, ConfigError> {
        value.parse().map_err(|_| ConfigError::InvalidValue {
            field: flag,
            reason: format!("cannot parse `{value}`"),
        })
    }

    /// Aim at the closest reachable live creature; fire when idle
    fn bot_input(round: &RoundState, player: usize) -> PlayerInput {
        let Some(p) = round.player(player) else {
            return PlayerInput::default();
        };
        let base = p.harpoon.base;
        let limit = p.harpoon.aim_limit();
        let target = round
            .creatures()
            .iter()
            .filter(|c| c.alive)
            .map(|c| {
                let d = c.hit_center() - base;
                (d.x.atan2(d.y * p.harpoon.vertical), d.length())
            })
            .filter(|(angle, _)| angle.abs() <= limit)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match target {
            Some((angle, _)) => PlayerInput {
                fire: p.harpoon.is_idle(),
                aim_angle: angle,
            },
            None => PlayerInput::default(),
        }
    }

    pub fn run(options: Options) -> Result<(), ConfigError> {
        let tuning = match &options.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let mut round = RoundState::new(tuning, Catalog::builtin(), options.players, options.seed)?;
        let mut driver = FixedStepDriver::new(SIM_DT);
        let mut sink = LogFeedback::default();

        // Uneven frame pacing exercises the accumulator
        let frames = [1.0 / 50.0, 1.0 / 75.0, 1.0 / 60.0];
        let mut frame = 0usize;
        while !round.is_finished() && round.time_ticks() < MAX_TICKS {
            for player in 0..options.players {
                if round.is_buyback_pending(player) {
                    round.accept_buyback(player);
                }
            }
            driver.advance(frames[frame % frames.len()], |dt| {
                let inputs: Vec<PlayerInput> = (0..options.players).map(|i| bot_input(&round, i)).collect();
                round.update_round(dt, &inputs);
            });
            frame += 1;
            dispatch(&round.drain_events(), &mut sink);
        }

        if !round.is_finished() {
            log::warn!("round did not finish within {MAX_TICKS} ticks");
        }
        log::info!("{} sounds cued over {frame} frames", sink.sounds_played);
        println!("{}", serde_json::to_string_pretty(&round.summary())?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Abyss Harpoon (headless) starting...");

    let result = headless::Options::from_args(std::env::args()).and_then(headless::run);
    if let Err(err) = result {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; the host page drives `RoundState` directly
}
