#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Typer Drive headlessly with a scripted
//! typist and prints a run summary.

mod config;
mod presenter;
mod typist;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;
use typer_drive_core::WELCOME_BANNER;
use typer_drive_factory::MobFactory;
use typer_drive_session::Session;

use config::RunConfig;
use presenter::LogPresenter;
use typist::ScriptedTypist;

#[derive(Debug, Parser)]
#[command(version, about = "Headless Typer Drive runner")]
struct Cli {
    /// TOML run manifest; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the scheduler seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the number of waves.
    #[arg(long)]
    waves: Option<u32>,
    /// Wave to begin with.
    #[arg(long, default_value_t = 1)]
    start_wave: u32,
    /// Probability that the typist presses the intended key.
    #[arg(long, default_value_t = 0.92)]
    accuracy: f64,
    /// Typing speed of the scripted typist.
    #[arg(long, default_value_t = 4.0)]
    keys_per_second: f64,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Simulated time after which the run stops.
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,
}

/// Entry point for the Typer Drive command-line interface.
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.accuracy) {
        bail!("--accuracy must be within 0.0 and 1.0, got {}", cli.accuracy);
    }
    if cli.frame_ms == 0 {
        bail!("--frame-ms must be positive");
    }

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.scheduler.seed = seed;
    }
    if let Some(waves) = cli.waves {
        config.scheduler.total_waves = waves;
    }
    config.validate()?;

    println!("{WELCOME_BANNER}");
    let typist_seed = config.scheduler.seed.rotate_left(17);
    let mut session = Session::new(
        config.world.to_config(),
        config.scheduler,
        MobFactory::with_default_variants(),
        LogPresenter::default(),
    );
    session
        .start_wave(cli.start_wave)
        .context("failed to start the first wave")?;

    let mut typist = ScriptedTypist::new(typist_seed, cli.accuracy, cli.keys_per_second);
    let frame = Duration::from_millis(cli.frame_ms);
    let deadline = Duration::from_secs(cli.max_seconds);
    while !session.is_finished() && !session.is_defeated() && session.clock() < deadline {
        session.update(frame);
        for character in typist.keystrokes(frame, &session.mob_view()) {
            let _ = session.on_typed(character);
        }
    }
    if !session.is_finished() && !session.is_defeated() {
        info!(seconds = cli.max_seconds, "time limit reached");
        session.stop_spawning();
    }

    let stats = *session.stats();
    let elapsed = session.clock();
    let presenter = session.into_presenter();
    println!(
        "{} after {:.1}s: reached wave {}, cleared {} wave(s)",
        outcome(&presenter),
        elapsed.as_secs_f64(),
        presenter.highest_wave().map_or(0, |wave| wave.get()),
        presenter.waves_cleared(),
    );
    println!(
        "score {} | damage taken {} | health {} | accuracy {:.1}% ({} of {} keys)",
        stats.score(),
        stats.damage_taken(),
        stats.health(),
        stats.accuracy() * 100.0,
        stats.hits(),
        stats.keystrokes(),
    );
    println!(
        "rendered {} mob frames and {} effects",
        presenter.rendered(),
        presenter.effects()
    );
    Ok(())
}

fn outcome(presenter: &LogPresenter) -> &'static str {
    if presenter.won() {
        "Victory"
    } else if presenter.defeated() {
        "Defeat"
    } else {
        "Run ended"
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
