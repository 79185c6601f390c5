//! Input sensors.
//!
//! A sensor turns raw input (pointer presses and moves, key presses) into the
//! abstract [`DragEvent`] stream the drag controller consumes, plus plain
//! card clicks for the host. Both sensors produce the same stream, so the
//! whole board can be driven without a pointer device.

mod keyboard;
mod pointer;

use pipeboard_shared::{Deal, DealId};

use crate::drag::DragEvent;

pub use keyboard::{KeyInput, KeyboardFocus, KeyboardSensor};
pub use pointer::{PointerInput, PointerSensor};

/// What a sensor produced for one raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSignal {
    Drag(DragEvent),
    /// A completed interaction that never became a drag.
    Click(DealId),
}

/// Receives card selections, typically to open a detail view.
pub trait DealClickHandler {
    fn on_deal_click(&mut self, deal: &Deal);
}

impl<F> DealClickHandler for F
where
    F: FnMut(&Deal),
{
    fn on_deal_click(&mut self, deal: &Deal) {
        self(deal)
    }
}

/// Click handler for headless usage.
pub struct IgnoreClicks;

impl DealClickHandler for IgnoreClicks {
    fn on_deal_click(&mut self, _deal: &Deal) {}
}
