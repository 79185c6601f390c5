//! Board engine for Pipeboard.
//!
//! Holds the stage-to-deals mapping, interprets drag lifecycle events into
//! moves, and turns pointer and keyboard input into those events. Nothing
//! here touches a terminal; the TUI and CLI render [`view::BoardView`]s and
//! feed input back through [`board::Board`].

pub mod board;
pub mod drag;
pub mod layout;
pub mod seed;
pub mod sensor;
pub mod store;
pub mod view;

pub use board::Board;
pub use drag::{DragController, DragEvent, DragOptions, DragOutcome, DragSession, OverTarget};
pub use layout::BoardLayout;
pub use seed::{BoardSeed, StageSeed, load_seed, load_seed_or_sample};
pub use store::{BoardStore, StageSummary};
pub use view::{BoardView, format_currency};
