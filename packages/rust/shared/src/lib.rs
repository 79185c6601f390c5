//! Shared types, error model, and configuration for Pipeboard.
//!
//! This crate is the foundation depended on by all other Pipeboard crates.
//! It provides:
//! - [`PipeboardError`], the unified error type
//! - Domain types ([`Deal`], [`Stage`], [`DealId`], [`StageId`], [`TargetId`])
//!   and board geometry ([`Rect`], [`Point`])
//! - Configuration ([`AppConfig`], [`DragConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BoardConfig, DragConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from, tui_log_path, validate_config,
};
pub use error::{PipeboardError, Result};
pub use types::{Deal, DealId, Point, Rect, SessionId, Stage, StageId, TargetId};
