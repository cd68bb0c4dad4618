//! Headless driver for the layered maze.
//!
//! Each frame runs in the same order a windowed host would use:
//!
//!   1. feed the next recorded frame of held keys into `InputState`
//!   2. `SceneManager::update` advances title or field by one step
//!   3. redraw into a cleared `DrawContext`
//!   4. `end_frame()` drops this frame's key edges
//!
//! Input comes from a replay file or, with `--autoplay`, from the solver's
//! plan for the maze the session is about to play.

use std::path::PathBuf;

use maze_core::{Difficulty, InputState, Key};
use maze_game::config::{load_config_or_default, DEFAULT_CONFIG_PATH};
use maze_game::draw::{DrawCommand, DrawContext};
use maze_game::maze::load_maze_from_path;
use maze_game::replay::{load_replay_from_path, save_replay_to_path, ReplayPlayer, ReplaySequence};
use maze_game::scene::SceneManager;
use maze_game::solver;

enum InputSource {
    Replay(PathBuf),
    Autoplay,
}

struct Options {
    config_path: PathBuf,
    maze_path: Option<PathBuf>,
    input: InputSource,
    difficulty: Option<Difficulty>,
    seed: Option<u64>,
    record_path: Option<PathBuf>,
}

fn usage() -> String {
    "Usage: cargo run -p maze_game -- [--config PATH] [--maze PATH] (--replay PATH | --autoplay) [--difficulty easy|normal|hard] [--seed N] [--record PATH]\nExample: cargo run -p maze_game -- --autoplay --difficulty hard --seed 42".to_string()
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut maze_path = None;
    let mut input = None;
    let mut difficulty = None;
    let mut seed = None;
    let mut record_path = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || iter.next().cloned().ok_or_else(usage);
        match arg.as_str() {
            "--config" => config_path = PathBuf::from(value()?),
            "--maze" => maze_path = Some(PathBuf::from(value()?)),
            "--replay" => input = Some(InputSource::Replay(PathBuf::from(value()?))),
            "--autoplay" => input = Some(InputSource::Autoplay),
            "--difficulty" => difficulty = Some(value()?.parse::<Difficulty>()?),
            "--seed" => {
                let raw = value()?;
                seed = Some(
                    raw.parse::<u64>()
                        .map_err(|e| format!("Invalid seed '{raw}': {e}"))?,
                );
            }
            "--record" => record_path = Some(PathBuf::from(value()?)),
            "--help" | "-h" => return Err(usage()),
            other => return Err(format!("Unknown argument '{other}'\n{}", usage())),
        }
    }

    Ok(Options {
        config_path,
        maze_path,
        input: input.ok_or_else(usage)?,
        difficulty,
        seed,
        record_path,
    })
}

/// Leave the title with Enter, then play the solver's plan for the maze the
/// session will start on.
fn autoplay_replay(manager: &SceneManager) -> Result<ReplaySequence, String> {
    let field = manager.start_field();
    let steps = solver::solve(field.maze())
        .ok_or_else(|| format!("Maze '{}' has no solution", field.maze().maze_id))?;
    log::info!(
        "Solver found {} steps for maze '{}'",
        steps.len(),
        field.maze().maze_id
    );

    let mut replay = ReplaySequence::default();
    replay.push(vec![Key::Enter], 1);
    replay.push(Vec::new(), 1);
    for frame in solver::script_for(&steps).frames {
        replay.push(frame.held, frame.repeat.max(1));
    }
    Ok(replay)
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let mut config = load_config_or_default(&options.config_path)?;
    if let Some(difficulty) = options.difficulty {
        config.difficulty = difficulty;
    }
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let mut manager = SceneManager::new(config.session_settings());
    if let Some(path) = &options.maze_path {
        manager = manager.with_custom_maze(load_maze_from_path(path)?);
    }

    let replay = match &options.input {
        InputSource::Replay(path) => load_replay_from_path(path)?,
        InputSource::Autoplay => autoplay_replay(&manager)?,
    };
    if let Some(path) = &options.record_path {
        save_replay_to_path(path, &replay)?;
        log::info!("Wrote input script to {}", path.display());
    }

    let mut input = InputState::new();
    let mut ctx = DrawContext::new(config.screen_width, config.screen_height);
    let mut player = ReplayPlayer::new(&replay);
    let mut last_floor = None;

    while player.apply_next(&mut input) {
        manager.update(&input);
        ctx.clear();
        manager.draw(&mut ctx);
        input.end_frame();

        match manager.field() {
            Some(field) => {
                let floor = field.floor_number();
                if last_floor != Some(floor) {
                    log::debug!(
                        "Frame {}: floor {}F of {}F",
                        manager.frame(),
                        floor,
                        field.maze().floor_count()
                    );
                }
                last_floor = Some(floor);
            }
            None => last_floor = None,
        }
    }

    for command in &ctx.commands {
        if let DrawCommand::Text { text, .. } = command {
            println!("{text}");
        }
    }
    println!(
        "Frames: {}  Clears: {}  Scene: {}",
        manager.frame(),
        manager.clears(),
        if manager.is_title() { "title" } else { "game" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_autoplay_with_overrides() {
        let options = parse_args(&args(&["--autoplay", "--difficulty", "HARD", "--seed", "42"]))
            .expect("valid arguments");
        assert!(matches!(options.input, InputSource::Autoplay));
        assert_eq!(options.difficulty, Some(Difficulty::Hard));
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn input_source_is_required() {
        assert!(parse_args(&args(&["--seed", "1"])).is_err());
    }

    #[test]
    fn bad_values_are_reported() {
        let err = parse_args(&args(&["--autoplay", "--seed", "x"])).err().unwrap_or_default();
        assert!(err.contains("Invalid seed 'x'"));
        let err = parse_args(&args(&["--autoplay", "--bogus"])).err().unwrap_or_default();
        assert!(err.contains("Unknown argument '--bogus'"));
        assert!(parse_args(&args(&["--replay"])).is_err());
    }

    #[test]
    fn autoplay_clears_the_session_maze() {
        let manager = SceneManager::new(maze_game::scene::SessionSettings::new(Difficulty::Easy));
        let replay = autoplay_replay(&manager).expect("generated maze is solvable");
        assert_eq!(replay.frames[0].held, vec![Key::Enter]);

        let mut manager = manager;
        let mut input = InputState::new();
        let mut player = ReplayPlayer::new(&replay);
        while player.apply_next(&mut input) {
            manager.update(&input);
            input.end_frame();
        }
        assert_eq!(manager.clears(), 1);
        assert!(manager.is_title());
    }

    #[test]
    fn bundled_replay_clears_bundled_maze() {
        let assets = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let maze = load_maze_from_path(&assets.join("mazes/two_floor_sample.json"))
            .expect("bundled maze loads");
        let replay = load_replay_from_path(&assets.join("replays/two_floor_sample.json"))
            .expect("bundled replay loads");

        let mut manager =
            SceneManager::new(maze_game::scene::SessionSettings::new(Difficulty::Normal))
                .with_custom_maze(maze);
        let mut input = InputState::new();
        let mut player = ReplayPlayer::new(&replay);
        while player.apply_next(&mut input) {
            manager.update(&input);
            input.end_frame();
        }
        assert_eq!(manager.clears(), 1);
    }
}
