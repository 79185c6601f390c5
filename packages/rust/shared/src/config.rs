//! Application configuration for Pipeboard.
//!
//! User config lives at `~/.pipeboard/pipeboard.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipeboardError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pipeboard.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pipeboard";

/// Log file written by the TUI (stdout belongs to the terminal canvas).
const TUI_LOG_FILE_NAME: &str = "pipeboard-tui.log";

/// Smallest card that still fits a bordered title and value line.
const MIN_CARD_HEIGHT: u16 = 3;
const MAX_CARD_HEIGHT: u16 = 12;

// ---------------------------------------------------------------------------
// Config structs (matching pipeboard.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Drag behaviour.
    #[serde(default)]
    pub drag: DragConfig,

    /// Board construction and layout.
    #[serde(default)]
    pub board: BoardConfig,
}

/// `[drag]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Pointer travel (in cells) a press must exceed before it becomes a drag.
    #[serde(default = "default_activation_distance")]
    pub activation_distance: u16,

    /// Reorder cards within their own lane on hover (off: cross-lane only).
    #[serde(default)]
    pub reorder_within_stage: bool,

    /// Restore the board as it was at lift time when a drag is cancelled.
    #[serde(default)]
    pub revert_on_cancel: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_distance: default_activation_distance(),
            reorder_within_stage: false,
            revert_on_cancel: false,
        }
    }
}

fn default_activation_distance() -> u16 {
    2
}

/// `[board]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Seed file (TOML or JSON). The built-in sample board is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<String>,

    /// Rendered card height in terminal rows, borders included.
    #[serde(default = "default_card_height")]
    pub card_height: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            card_height: default_card_height(),
        }
    }
}

fn default_card_height() -> u16 {
    4
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pipeboard/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PipeboardError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pipeboard/pipeboard.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Get the path of the TUI log file (`~/.pipeboard/pipeboard-tui.log`).
pub fn tui_log_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(TUI_LOG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PipeboardError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PipeboardError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PipeboardError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PipeboardError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PipeboardError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject values the board cannot lay out.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let height = config.board.card_height;
    if !(MIN_CARD_HEIGHT..=MAX_CARD_HEIGHT).contains(&height) {
        return Err(PipeboardError::config(format!(
            "board.card_height must be between {MIN_CARD_HEIGHT} and {MAX_CARD_HEIGHT}, got {height}"
        )));
    }
    Ok(())
}
