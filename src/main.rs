//! Dot Dash headless demo
//!
//! Plays one single-player autopilot round at a fixed 60 Hz and logs what
//! happens. Browser hosts link the library directly and drive `tick` from
//! their animation-frame callback.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use clap::Parser;
    use dot_dash::audio::AudioSettings;
    use dot_dash::autopilot::steer;
    use dot_dash::consts::TARGET_FRAME_MS;
    use dot_dash::input::{FrameInput, InputBinding, MenuClaim};
    use dot_dash::sim::{GameEvent, SimulationState, tick};
    use dot_dash::tuning::GameConfig;

    /// Stop the demo after this many simulated seconds
    const TIME_LIMIT_SECS: u32 = 180;

    /// Play one single-player autopilot round and log what happens
    #[derive(Parser, Debug)]
    #[command(author, version, about)]
    pub struct Cli {
        /// Balance overrides as (partial) JSON
        #[arg(long)]
        pub config: Option<PathBuf>,
        /// RNG seed for the session
        #[arg(long, default_value_t = 0x5eed)]
        pub seed: u64,
    }

    fn load_config(path: Option<&Path>) -> Result<GameConfig, String> {
        let Some(path) = path else {
            return Ok(GameConfig::default());
        };
        let json = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        GameConfig::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
    }

    pub fn run() -> ExitCode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = Cli::parse();
        let config = match load_config(args.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Invalid config: {e}");
                return ExitCode::FAILURE;
            }
        };
        let mut state = match SimulationState::new(config, args.seed) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Invalid config: {e}");
                return ExitCode::FAILURE;
            }
        };
        log::info!("Dot Dash demo starting (seed {})", args.seed);

        let audio = AudioSettings::default();
        let mut input = FrameInput {
            menu_claim: Some(MenuClaim::Bind(InputBinding::Keyboard)),
            ..Default::default()
        };
        let mut frame: u64 = 0;
        let mut cues = 0usize;

        loop {
            frame += 1;
            let now = frame as f64 * TARGET_FRAME_MS;
            input.players[0].intent = steer(&state, 0);
            tick(&mut state, &input, now);

            // Second menu stage: play alone
            input.menu_claim = state.stats.menu_stage().map(|_| MenuClaim::Skip);

            cues += audio.cues(&state.events).len();
            for event in &state.events {
                match event {
                    GameEvent::Collected { kind, points, .. } => {
                        log::debug!("Collected {} (+{})", kind.name(), points)
                    }
                    GameEvent::ObstaclePassed { score, .. } => log::debug!("Passed, score {score}"),
                    _ => {}
                }
            }

            if state.stats.is_game_over() || state.stats.time >= TIME_LIMIT_SECS {
                break;
            }
        }

        let snapshot = state.snapshot();
        log::info!(
            "Finished after {}s: score {}, best {}, speed {:.2}, gap {:.1}, {} sound cues",
            state.stats.final_time.unwrap_or(state.stats.time),
            state.players[0].score,
            snapshot.stats.high_score.best,
            snapshot.scroll_speed,
            snapshot.gap_size,
            cues
        );
        ExitCode::SUCCESS
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    demo::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the library directly
}
