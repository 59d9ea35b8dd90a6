/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;
mod view;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use config::GameConfig;
use error::GameError;
use sim::level::Level;
use sim::save;
use ui::terminal::{CrosstermTerminal, Terminal};
use view::signal::{Signal, SignalBus};
use view::simulation::SimulationView;
use view::{Ctx, ViewStack};

fn main() {
    let mut config = GameConfig::load();
    if let Some(name) = std::env::args().nth(1) {
        config.start_level = name;
    }
    init_tracing(&config);

    // A missing start level is reported before the terminal is touched.
    let level = match load_start_level(&config) {
        Ok(level) => level,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut term = CrosstermTerminal::new(&config.gamepad);
    if let Err(e) = term.init() {
        eprintln!("Terminal init failed: {e}");
        std::process::exit(1);
    }

    let result = game_loop(level, &mut term, &config);

    if let Err(e) = term.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!(error = %e, "game aborted");
        eprintln!("Game error: {e}");
        std::process::exit(1);
    }

    println!();
    println!("Thanks for playing The Adventures of X!");
}

/// Logs go to a file; the terminal belongs to the game.
fn init_tracing(config: &GameConfig) {
    let file = match File::create(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", config.log_file.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();
}

fn load_start_level(config: &GameConfig) -> Result<Level, GameError> {
    let path = save::resolve(&config.levels_dir, &config.start_level);
    save::load_level(&path, &config.start_level, &config.rules).map_err(|source| GameError::StartLevel {
        name: config.start_level.clone(),
        source,
    })
}

fn game_loop(level: Level, term: &mut CrosstermTerminal, config: &GameConfig) -> Result<(), GameError> {
    let frame_sleep = Duration::from_millis(config.frame_sleep_ms);
    let mut signals = SignalBus::new();
    let mut views = ViewStack::new(Box::new(SimulationView::new(level, config, term.size())));
    let mut last_tick = Instant::now();

    loop {
        // Whole milliseconds only; the remainder carries into the next frame.
        let delta_ms = u64::try_from(last_tick.elapsed().as_millis()).unwrap_or(u64::MAX);
        last_tick += Duration::from_millis(delta_ms);

        let mut ctx = Ctx { signals: &mut signals, term: &mut *term, config };
        views.tick(&mut ctx, delta_ms)?;
        if let Some(event) = ctx.term.poll_input() {
            views.dispatch(event, &mut ctx);
        }
        if ctx.term.take_resize() {
            views.resize(&mut ctx)?;
        }
        ctx.term.flush()?;

        if signals.is_posted(Signal::Quit) {
            tracing::info!("quit requested");
            break;
        }
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}
