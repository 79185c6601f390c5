//! CLI command definitions, routing, and tracing setup.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use pipeboard_core::{Board, BoardView, DragEvent, DragOutcome, format_currency, load_seed_or_sample};
use pipeboard_shared::{AppConfig, init_config, load_config};
use serde::Serialize;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Pipeboard: a pipeline board you drive from the terminal.
#[derive(Parser)]
#[command(
    name = "pipeboard",
    version,
    about = "Inspect a pipeline board and replay drag sessions against it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the board: stages, counts, totals and deals.
    Show {
        /// Seed file (TOML or JSON). Defaults to `board.seed_file`, then the sample board.
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Emit the board view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Apply a JSON array of drag events to the board and print each outcome.
    Replay {
        /// Event script path.
        script: PathBuf,

        /// Seed file (TOML or JSON). Defaults to `board.seed_file`, then the sample board.
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Emit outcomes and the final board as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// clean for board output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pipeboard=info,pipeboard_core=info",
        1 => "pipeboard=debug,pipeboard_core=debug",
        _ => "pipeboard=trace,pipeboard_core=trace,pipeboard_shared=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Show { seed, json } => cmd_show(seed.as_deref(), json),
        Command::Replay { script, seed, json } => cmd_replay(&script, seed.as_deref(), json),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Load config and build the board from `--seed`, the configured seed file,
/// or the sample board, in that order.
fn open_board(seed: Option<&Path>) -> Result<Board> {
    let config = load_config()?;
    let configured = config.board.seed_file.as_deref().map(Path::new);
    let seed = load_seed_or_sample(seed.or(configured))?;
    Ok(Board::new(seed, &config.drag)?)
}

fn cmd_show(seed: Option<&Path>, json: bool) -> Result<()> {
    let board = open_board(seed)?;
    let view = board.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_text(&view));
    }
    Ok(())
}

#[derive(Serialize)]
struct ReplayReport<'a> {
    outcomes: Vec<DragOutcome>,
    board: BoardView<'a>,
}

fn cmd_replay(script: &Path, seed: Option<&Path>, json: bool) -> Result<()> {
    let mut board = open_board(seed)?;
    let content = std::fs::read_to_string(script)
        .wrap_err_with(|| format!("failed to read script {}", script.display()))?;
    let events = parse_script(&content)?;
    info!(events = events.len(), script = %script.display(), "replaying drag script");

    let outcomes: Vec<DragOutcome> = events
        .into_iter()
        .map(|event| board.dispatch(event))
        .collect();

    if board.is_dragging() {
        warn!("script ended mid-drag; the last hover is kept");
    }
    board.store().check_invariants()?;

    if json {
        let report = ReplayReport {
            outcomes,
            board: board.view(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (i, outcome) in outcomes.iter().enumerate() {
            println!("{:>3}. {outcome}", i + 1);
        }
        println!();
        print!("{}", render_text(&board.view()));
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_script(content: &str) -> Result<Vec<DragEvent>> {
    serde_json::from_str(content).map_err(|e| eyre!("invalid drag script: {e}"))
}

/// Plain-text board: one block per stage, in board order.
fn render_text(view: &BoardView<'_>) -> String {
    let mut out = String::new();
    for column in &view.columns {
        let _ = writeln!(
            out,
            "{} [{}]  {} · {}",
            column.stage.name,
            column.stage.id,
            column.count,
            format_currency(column.total_value)
        );
        if column.cards.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for card in &column.cards {
            let deal = card.deal;
            let _ = write!(out, "  {:<4} {}", deal.id, deal.title);
            if let Some(company) = &deal.company {
                let _ = write!(out, " ({company})");
            }
            let _ = write!(out, "  {}", format_currency(deal.value));
            if card.faded {
                let _ = write!(out, "  <dragging>");
            }
            let _ = writeln!(out);
        }
    }
    let _ = writeln!(out, "Pipeline total: {}", format_currency(view.pipeline_value()));
    out
}
