//! Command line front-end: chart inspection, headless autoplay and replay
//! re-simulation.

use clap::{Parser, Subcommand};
use rsmania::logic::{ReplayEngine, TICK_RATE, run_autoplay};
use rsmania::models::chart::Track;
use rsmania::models::settings::{DEFAULT_SETTINGS_PATH, GameSettings};
use rsmania::parsing::load_track;
use rsmania::state::{GameResult, Session};
use rsmania::storage::replay_storage::{self, REPLAY_DIR};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rsmania")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Four-lane rhythm game core", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a chart's metadata and maps
    Info {
        #[arg(value_name = "CHART")]
        chart: PathBuf,
    },

    /// Play a map with the autoplay bot and print the result
    Play {
        /// Chart file; defaults to `default_track` from the settings
        #[arg(value_name = "CHART")]
        chart: Option<PathBuf>,

        /// Map index, in meter order
        #[arg(short, long, default_value_t = 0)]
        map: usize,

        /// Simulation ticks per second
        #[arg(long, default_value_t = TICK_RATE)]
        fps: u32,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Save the replay into this directory
        #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = REPLAY_DIR)]
        replay_dir: Option<PathBuf>,
    },

    /// Re-simulate a saved replay
    Replay {
        #[arg(value_name = "CHART")]
        chart: PathBuf,

        #[arg(value_name = "REPLAY")]
        replay: PathBuf,

        /// Map index; found by chart hash when omitted
        #[arg(short, long)]
        map: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = GameSettings::load_or_default(&cli.settings);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log_level))
        .init();
    log::info!("MAIN: rsmania {}", env!("CARGO_PKG_VERSION"));

    match run(cli.command, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("MAIN: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, settings: GameSettings) -> Result<(), String> {
    match command {
        Command::Info { chart } => {
            let track = open_chart(&chart)?;
            print!("{}", track);
            for (i, map) in track.maps.iter().enumerate() {
                println!("map #{}: {} ({})", i, map.difficulty, track.chart_hash(map));
            }
            if let Some(audio) = track.resolve_audio_path() {
                println!("audio: {}", audio.display());
            }
            Ok(())
        }
        Command::Play {
            chart,
            map,
            fps,
            json,
            replay_dir,
        } => {
            let mut session = Session::new(settings);
            if let Some(chart) = chart {
                session.load_track(open_chart(&chart)?);
            } else if session.track().is_none() {
                return Err("no chart given and no loadable default_track in settings".into());
            }
            session.select_map(map).map_err(|e| e.to_string())?;
            let outcome = run_autoplay(&mut session, fps).map_err(|e| e.to_string())?;
            log::info!("MAIN: simulated {} ticks", outcome.ticks);

            if let Some(dir) = replay_dir {
                let path = replay_storage::save_replay(&dir, &outcome.replay)
                    .map_err(|e| format!("cannot save replay in {:?}: {}", dir, e))?;
                log::info!("MAIN: replay written to {:?}", path);
            }
            print_result(&outcome.result, json)
        }
        Command::Replay {
            chart,
            replay,
            map,
            json,
        } => {
            let track = open_chart(&chart)?;
            let data = replay_storage::load_replay_from_path(&replay)
                .map_err(|e| format!("cannot read replay {:?}: {}", replay, e))?;

            let map_index = match map {
                Some(index) => index,
                None => track
                    .maps
                    .iter()
                    .position(|m| track.chart_hash(m) == data.chart_hash)
                    .ok_or_else(|| format!("no map of {:?} matches the replay", chart))?,
            };
            let result =
                ReplayEngine::replay_fast(&track, map_index, data).map_err(|e| e.to_string())?;
            print_result(&result, json)
        }
    }
}

fn open_chart(path: &Path) -> Result<Track, String> {
    load_track(path).map_err(|e| e.to_string())
}

fn print_result(result: &GameResult, json: bool) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(result).map_err(|e| e.to_string())?;
        println!("{}", out);
        return Ok(());
    }

    println!("{} [{} {}]", result.title, result.meter, result.difficulty);
    println!(
        "score {}/{} ({:.2}%), max combo {}",
        result.score,
        result.max_score,
        result.accuracy * 100.0,
        result.max_combo
    );
    let stats = &result.stats;
    println!(
        "perfect {}  nice {}  good {}  ok {}  meh {}  miss {}",
        stats.perfect, stats.nice, stats.good, stats.ok, stats.meh, stats.miss
    );
    Ok(())
}
