//! Pipeboard TUI: an interactive pipeline board.
//!
//! Deals are moved between stages by dragging them with the mouse or by
//! lifting them with the keyboard, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pipeboard-tui", version, about = "Interactive pipeline board")]
struct Args {
    /// Board seed file (TOML or JSON); overrides `board.seed_file`
    #[arg(long)]
    seed: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = pipeboard_shared::load_config()?;
    init_tracing()?;

    let seed_path = args
        .seed
        .or_else(|| config.board.seed_file.as_ref().map(PathBuf::from));
    let seed = pipeboard_core::load_seed_or_sample(seed_path.as_deref())?;

    app::run(seed, &config)
}

/// The terminal belongs to the board, so logs go to a file under the config dir.
fn init_tracing() -> Result<()> {
    let path = pipeboard_shared::tui_log_path()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::create(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pipeboard_tui=info,pipeboard_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}
