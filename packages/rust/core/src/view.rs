//! Rendering Adapter view model.
//!
//! A [`BoardView`] is derived from a store snapshot plus the drag session and
//! holds no state of its own. Renderers (the TUI, `pipeboard show`) only
//! ever read it.

use serde::Serialize;

use pipeboard_shared::{Deal, DealId, Rect, Stage};

use crate::drag::DragSession;
use crate::store::BoardStore;

#[derive(Debug, Serialize)]
pub struct CardView<'a> {
    pub deal: &'a Deal,
    /// The in-place original of the card being dragged.
    pub faded: bool,
    /// Under the keyboard cursor.
    pub focused: bool,
}

#[derive(Debug, Serialize)]
pub struct ColumnView<'a> {
    pub stage: &'a Stage,
    pub cards: Vec<CardView<'a>>,
    pub count: usize,
    pub total_value: u64,
}

/// Floating copy of the dragged card.
#[derive(Debug, Serialize)]
pub struct OverlayView<'a> {
    pub deal: &'a Deal,
    /// Where to draw it; `None` for keyboard drags, which have no pointer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
}

#[derive(Debug, Serialize)]
pub struct BoardView<'a> {
    pub columns: Vec<ColumnView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayView<'a>>,
}

impl<'a> BoardView<'a> {
    pub fn build(
        store: &'a BoardStore,
        session: &DragSession,
        overlay_rect: Option<Rect>,
        focus: Option<&DealId>,
    ) -> Self {
        let active = session.active().map(|a| &a.deal_id);

        let columns = store
            .stages()
            .map(|stage| {
                let deals = store.deals(&stage.id).unwrap_or_default();
                ColumnView {
                    stage,
                    cards: deals
                        .iter()
                        .map(|deal| CardView {
                            deal,
                            faded: Some(&deal.id) == active,
                            focused: Some(&deal.id) == focus,
                        })
                        .collect(),
                    count: deals.len(),
                    total_value: deals.iter().map(|d| d.value).sum(),
                }
            })
            .collect();

        let overlay = active
            .and_then(|id| store.deal(id))
            .map(|deal| OverlayView {
                deal,
                rect: overlay_rect,
            });

        Self { columns, overlay }
    }

    /// Sum of every stage's total.
    pub fn pipeline_value(&self) -> u64 {
        self.columns.iter().map(|c| c.total_value).sum()
    }
}

/// `12000` → `"$12,000"`.
pub fn format_currency(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
