//! Drag Controller: the state machine turning abstract drag events into
//! Board Store mutations.
//!
//! A session goes `Idle → Dragging → Idle`. While dragging, every
//! [`DragEvent::Over`] is resolved against the store and may move the active
//! deal into the hovered stage right away, so the board shows the new
//! arrangement before the drag ends. Ending a drag only clears the session;
//! the last hover move is the committed outcome.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use pipeboard_shared::{DealId, DragConfig, Rect, SessionId, StageId, TargetId};

use crate::store::{BoardSnapshot, BoardStore};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Abstract drag event produced by a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    /// A deal was lifted.
    Start { deal_id: DealId, origin: StageId },
    /// The gesture moved; `over` is the element now under it, if any.
    Over {
        #[serde(default)]
        over: Option<OverTarget>,
        /// Current (translated) rect of the dragged card, when measured.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active_rect: Option<Rect>,
    },
    /// The gesture ended: released, confirmed, or cancelled.
    End {
        #[serde(default)]
        cancelled: bool,
    },
}

impl DragEvent {
    pub fn start(deal_id: impl Into<DealId>, origin: impl Into<StageId>) -> Self {
        Self::Start {
            deal_id: deal_id.into(),
            origin: origin.into(),
        }
    }

    /// Hover over `target` without geometry.
    pub fn over(target: TargetId) -> Self {
        Self::Over {
            over: Some(OverTarget::new(target)),
            active_rect: None,
        }
    }

    pub fn drop() -> Self {
        Self::End { cancelled: false }
    }

    pub fn cancel() -> Self {
        Self::End { cancelled: true }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Over { .. } => "over",
            Self::End { .. } => "end",
        }
    }
}

/// The hovered element and, when measured, its rect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverTarget {
    pub id: TargetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
}

impl OverTarget {
    pub fn new(id: TargetId) -> Self {
        Self { id, rect: None }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }
}

// ---------------------------------------------------------------------------
// Session / options / outcomes
// ---------------------------------------------------------------------------

/// The deal currently being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDrag {
    pub session_id: SessionId,
    pub deal_id: DealId,
    /// Where the drag began. Diagnostic only.
    pub origin: StageId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

impl DragSession {
    pub fn active(&self) -> Option<&ActiveDrag> {
        match self {
            Self::Idle => None,
            Self::Dragging(active) => Some(active),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }
}

/// Behaviour switches beyond the default cross-lane-only engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragOptions {
    /// Also reorder when hovering inside the active deal's own stage.
    pub reorder_within_stage: bool,
    /// Capture the board at lift and restore it on a cancelled drop.
    pub revert_on_cancel: bool,
}

impl From<&DragConfig> for DragOptions {
    fn from(config: &DragConfig) -> Self {
        Self {
            reorder_within_stage: config.reorder_within_stage,
            revert_on_cancel: config.revert_on_cancel,
        }
    }
}

/// Why a hover left the board untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unchanged {
    /// Nothing under the gesture.
    NoTarget,
    /// The active deal is not on the board.
    ActiveUnresolved,
    /// The hovered id does not resolve to a stage.
    TargetUnresolved,
    /// Hovering inside the active deal's own stage.
    SameStage,
    /// A same-stage reorder that would leave the deal where it is.
    InPlace,
    /// The store refused the move.
    Rejected,
}

/// Why an event was not applied to the session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ignored {
    /// A lift arrived while another deal is being dragged.
    AlreadyDragging,
    /// A lift named a deal the board does not hold.
    UnknownDeal,
    /// Hover or drop without a preceding lift.
    NotDragging,
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DragOutcome {
    Lifted {
        deal_id: DealId,
        origin: StageId,
    },
    Moved {
        deal_id: DealId,
        from: StageId,
        to: StageId,
        index: usize,
    },
    Unchanged {
        reason: Unchanged,
    },
    Dropped {
        deal_id: DealId,
        cancelled: bool,
        reverted: bool,
    },
    Ignored {
        reason: Ignored,
    },
}

impl DragOutcome {
    /// Whether the board changed.
    pub fn mutated(&self) -> bool {
        matches!(
            self,
            Self::Moved { .. } | Self::Dropped { reverted: true, .. }
        )
    }
}

impl std::fmt::Display for DragOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lifted { deal_id, origin } => write!(f, "lifted {deal_id} from {origin}"),
            Self::Moved {
                deal_id,
                from,
                to,
                index,
            } => write!(f, "moved {deal_id} from {from} to {to} at position {}", index + 1),
            Self::Unchanged { reason } => write!(f, "no change ({reason:?})"),
            Self::Dropped {
                deal_id,
                cancelled,
                reverted,
            } => match (*cancelled, *reverted) {
                (_, true) => write!(f, "cancelled {deal_id}, board restored"),
                (true, false) => write!(f, "cancelled {deal_id}"),
                (false, false) => write!(f, "dropped {deal_id}"),
            },
            Self::Ignored { reason } => write!(f, "ignored ({reason:?})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Single writer of the Board Store.
#[derive(Debug, Default)]
pub struct DragController {
    session: DragSession,
    options: DragOptions,
    lift_snapshot: Option<BoardSnapshot>,
}

impl DragController {
    pub fn new(options: DragOptions) -> Self {
        Self {
            session: DragSession::Idle,
            options,
            lift_snapshot: None,
        }
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    pub fn active_deal(&self) -> Option<&DealId> {
        self.session.active().map(|a| &a.deal_id)
    }

    pub fn options(&self) -> DragOptions {
        self.options
    }

    /// Apply one event. Runs to completion; never fails.
    #[instrument(skip_all, fields(event = event.kind()))]
    pub fn handle(&mut self, store: &mut BoardStore, event: DragEvent) -> DragOutcome {
        match event {
            DragEvent::Start { deal_id, origin } => self.lift(store, deal_id, origin),
            DragEvent::Over { over, active_rect } => self.hover(store, over, active_rect),
            DragEvent::End { cancelled } => self.drop(store, cancelled),
        }
    }

    fn lift(&mut self, store: &BoardStore, deal_id: DealId, origin: StageId) -> DragOutcome {
        if let DragSession::Dragging(active) = &self.session {
            debug!(active = %active.deal_id, lifted = %deal_id, "lift while dragging ignored");
            return DragOutcome::Ignored {
                reason: Ignored::AlreadyDragging,
            };
        }
        let Some(owner) = store.find_stage_of(&deal_id) else {
            warn!(%deal_id, "lift of a deal that is not on the board");
            return DragOutcome::Ignored {
                reason: Ignored::UnknownDeal,
            };
        };
        if owner != &origin {
            debug!(%deal_id, reported = %origin, actual = %owner, "lift origin mismatch");
        }

        if self.options.revert_on_cancel {
            self.lift_snapshot = Some(store.snapshot());
        }
        let session_id = SessionId::new();
        info!(%session_id, %deal_id, %origin, "drag started");
        self.session = DragSession::Dragging(ActiveDrag {
            session_id,
            deal_id: deal_id.clone(),
            origin: origin.clone(),
        });
        DragOutcome::Lifted { deal_id, origin }
    }

    fn hover(
        &mut self,
        store: &mut BoardStore,
        over: Option<OverTarget>,
        active_rect: Option<Rect>,
    ) -> DragOutcome {
        let Some(active) = self.session.active() else {
            return DragOutcome::Ignored {
                reason: Ignored::NotDragging,
            };
        };
        let unchanged = |reason| DragOutcome::Unchanged { reason };
        let Some(over) = over else {
            return unchanged(Unchanged::NoTarget);
        };
        let Some(active_container) = store.find_stage_of(&active.deal_id).cloned() else {
            return unchanged(Unchanged::ActiveUnresolved);
        };
        let Some(over_container) = store.find_container(&over.id).cloned() else {
            debug!(over = %over.id, "hover target does not resolve to a stage");
            return unchanged(Unchanged::TargetUnresolved);
        };

        let index = if active_container == over_container {
            if !self.options.reorder_within_stage {
                return unchanged(Unchanged::SameStage);
            }
            match reorder_index(store, &active_container, &active.deal_id, &over.id) {
                Some(index) => index,
                None => return unchanged(Unchanged::InPlace),
            }
        } else {
            insertion_index(store, &over_container, &over, active_rect)
        };

        let deal_id = active.deal_id.clone();
        match store.move_deal(&deal_id, &active_container, &over_container, index) {
            Ok(index) => {
                debug!(
                    session_id = %active.session_id,
                    %deal_id,
                    from = %active_container,
                    to = %over_container,
                    index,
                    "hover moved deal"
                );
                DragOutcome::Moved {
                    deal_id,
                    from: active_container,
                    to: over_container,
                    index,
                }
            }
            Err(e) => {
                warn!(error = %e, "hover move rejected");
                unchanged(Unchanged::Rejected)
            }
        }
    }

    fn drop(&mut self, store: &mut BoardStore, cancelled: bool) -> DragOutcome {
        let snapshot = self.lift_snapshot.take();
        let DragSession::Dragging(active) = std::mem::take(&mut self.session) else {
            return DragOutcome::Ignored {
                reason: Ignored::NotDragging,
            };
        };

        let reverted = match snapshot {
            Some(snapshot) if cancelled => {
                store.restore(snapshot);
                true
            }
            _ => false,
        };
        info!(
            session_id = %active.session_id,
            deal_id = %active.deal_id,
            cancelled,
            reverted,
            "drag ended"
        );
        DragOutcome::Dropped {
            deal_id: active.deal_id,
            cancelled,
            reverted,
        }
    }
}

/// Insertion index for a cross-stage hover into `container`.
///
/// Hovering the stage itself yields `len + 1`, one past the end; the store
/// clamps it, so the deal is appended. Hovering a card yields that card's
/// index, plus one when the dragged card's top has passed the hovered card's
/// bottom edge.
pub fn insertion_index(
    store: &BoardStore,
    container: &StageId,
    over: &OverTarget,
    active_rect: Option<Rect>,
) -> usize {
    let len = store.deals(container).map_or(0, |d| d.len());
    match &over.id {
        TargetId::Stage(_) => len + 1,
        TargetId::Deal(over_id) => {
            let base = store.index_of(container, over_id).unwrap_or(len);
            base + usize::from(is_below(active_rect, over.rect))
        }
    }
}

/// `true` when the dragged card's top edge is strictly below the hovered
/// card's bottom edge. Unmeasured rects count as "not below".
fn is_below(active: Option<Rect>, over: Option<Rect>) -> bool {
    match (active, over) {
        (Some(active), Some(over)) => active.top() > over.bottom(),
        _ => false,
    }
}

/// Target index for a same-stage reorder, with array-move semantics: the
/// deal takes the hovered card's slot, or the last slot when the stage
/// itself is hovered. `None` when the deal would not move.
fn reorder_index(
    store: &BoardStore,
    stage: &StageId,
    active: &DealId,
    over: &TargetId,
) -> Option<usize> {
    let current = store.index_of(stage, active)?;
    let target = match over {
        TargetId::Stage(_) => store.deals(stage).map_or(0, |d| d.len()).saturating_sub(1),
        TargetId::Deal(id) => store.index_of(stage, id)?,
    };
    (target != current).then_some(target)
}
