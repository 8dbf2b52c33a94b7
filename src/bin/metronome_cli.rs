use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metronome::api::ControlPanel;
use metronome::config::AppConfig;
use metronome::engine::{
    CueSetup, Grouping, MetronomeHandle, SchedulerSnapshot, SchedulerState, Tempo,
};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(
    name = "metronome_cli",
    about = "Headless harness for the metronome beat scheduler"
)]
struct Cli {
    /// Config file to load (defaults to assets/metronome_config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play the metronome and print each beat as a JSON line
    Run {
        #[arg(long)]
        tempo: Option<u32>,
        #[arg(long)]
        grouping: Option<u32>,
        /// Number of beats to emit before stopping
        #[arg(long, default_value_t = 8)]
        beats: u32,
        /// Skip audio output and schedule beats only
        #[arg(long)]
        silent: bool,
    },
    /// Print the tick interval for a tempo
    Interval {
        #[arg(long)]
        tempo: u32,
    },
    /// Print the control panel view model
    Panel {
        #[arg(long, default_value_t = 120)]
        tempo: u32,
        #[arg(long, default_value_t = 4)]
        grouping: u32,
    },
}

#[derive(Serialize)]
struct IntervalReport {
    tempo: u32,
    interval_ms: f64,
}

fn main() -> ExitCode {
    metronome::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load_platform);

    match cli.command {
        Commands::Run {
            tempo,
            grouping,
            beats,
            silent,
        } => run_beats(config, tempo, grouping, beats, silent),
        Commands::Interval { tempo } => run_interval(tempo),
        Commands::Panel { tempo, grouping } => run_panel(tempo, grouping),
    }
}

fn run_beats(
    mut config: AppConfig,
    tempo: Option<u32>,
    grouping: Option<u32>,
    beats: u32,
    silent: bool,
) -> Result<ExitCode> {
    if let Some(tempo) = tempo {
        config.metronome.initial_tempo = Tempo::new(tempo).bpm();
    }
    if let Some(beats) = grouping {
        config.metronome.initial_grouping = Grouping::try_from(beats)?.beats();
    }

    let cues = if silent {
        CueSetup::silent("disabled with --silent")
    } else {
        MetronomeHandle::create_cues(&config)
    };
    let handle = MetronomeHandle::with_cues(
        config,
        cues,
        std::sync::Arc::new(metronome::engine::SystemTimeSource::default()),
    )
    .context("creating metronome handle")?;

    let mut receiver = handle.subscribe_beats();
    handle.toggle_play()?;

    let mut emitted = 0;
    while emitted < beats {
        match receiver.blocking_recv() {
            Ok(event) => {
                println!("{}", serde_json::to_string(&event)?);
                emitted += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("[metronome_cli] Skipped {} beats", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    handle.stop()?;
    Ok(ExitCode::from(0))
}

fn run_interval(tempo: u32) -> Result<ExitCode> {
    let tempo = Tempo::new(tempo);
    let report = IntervalReport {
        tempo: tempo.bpm(),
        interval_ms: tempo.interval_ms(),
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(ExitCode::from(0))
}

fn run_panel(tempo: u32, grouping: u32) -> Result<ExitCode> {
    let state = SchedulerState::new(Tempo::new(tempo), Grouping::try_from(grouping)?);
    let panel = ControlPanel::from_snapshot(&SchedulerSnapshot::new(&state, 0));
    println!("{}", serde_json::to_string_pretty(&panel)?);
    Ok(ExitCode::from(0))
}
