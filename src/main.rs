//! Headless gem grid runner (default binary).
//!
//! Plays a seeded session with the autoplay driver and prints a summary.
//! There is no renderer; `--dump` prints the final grid in layout notation.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};

use gem_grid::core::{GameEvent, GameState};
use gem_grid::engine::{run_until_ready, AutoPlayer, PlayError};
use gem_grid::types::{EngineConfig, DEFAULT_GRID_SIZE, DEFAULT_KINDS, DEFAULT_TICK_MS};

#[derive(Debug, Parser)]
#[command(name = "gem-grid", version, about = "Play a headless match-3 session")]
struct Args {
    /// Grid edge length
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    size: usize,

    /// Number of gem kinds
    #[arg(long, default_value_t = DEFAULT_KINDS)]
    kinds: u8,

    /// Seed for spawning, wildcard targets and move choice
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Swaps to play
    #[arg(long, default_value_t = 20)]
    moves: u32,

    /// Simulated frame interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u32,

    /// Give up if the grid does not settle within this many ticks
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u32,

    /// Print the final grid
    #[arg(long)]
    dump: bool,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Minimal stderr sink for the `log` facade.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    log::set_logger(&LOGGER).map_err(|err| anyhow!("logger already installed: {err}"))?;
    log::set_max_level(level);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = EngineConfig::new(args.size, args.kinds)
        .context("invalid engine configuration")?
        .with_seed(args.seed);
    let mut game = GameState::new(config)?;
    let mut player = AutoPlayer::for_grid(args.seed.wrapping_add(1), args.size);

    let settle = |game: &mut GameState| {
        run_until_ready(game, args.tick_ms, args.max_ticks)
            .map_err(|err| anyhow!("{}: {}", err.code(), err.message()))
    };

    settle(&mut game)?;
    let mut played = 0;
    let mut best_combo = 0;
    while played < args.moves {
        match player.play_move(&mut game) {
            Ok(_) => played += 1,
            Err(PlayError::NoLegalMove) => break,
            Err(err) => return Err(anyhow!("{}: {}", err.code(), err.message())),
        }
        settle(&mut game)?;
        for event in game.drain_events() {
            if let GameEvent::Cleared { combo, .. } = event {
                best_combo = best_combo.max(combo);
            }
        }
    }

    let stats = game.stats();
    println!("moves:      {played}");
    println!("score:      {}", game.score());
    println!("best combo: {best_combo}");
    println!("cleared:    {}", stats.cleared);
    println!("cascades:   {}", stats.cascades);
    println!("reshuffles: {}", stats.reshuffles);
    println!("ticks:      {}", game.tick_count());
    if args.dump {
        println!();
        println!("{}", game.grid());
    }
    Ok(())
}
