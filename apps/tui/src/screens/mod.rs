//! TUI screens.
//!
//! The board fills the content area; the deal detail is a popup drawn over
//! it when a card is clicked or opened from the keyboard.

pub(crate) mod board;
pub(crate) mod deal_detail;
