//! Keyboard sensor built for a multi-lane board.
//!
//! Idle, the arrow keys move a focus cursor over the cards. Activating a
//! focused card lifts it; while lifted, left/right hover the neighbouring
//! lane at the card's current row and up/down hover its neighbours in the
//! same lane. Activate again to drop, Escape to cancel.

use pipeboard_shared::{Deal, DealId, TargetId};

use super::SensorSignal;
use crate::drag::DragEvent;
use crate::store::BoardStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Up,
    Down,
    Left,
    Right,
    /// Space/Enter: lift the focused card, or drop the lifted one.
    Activate,
    /// Select the focused card without dragging it.
    Open,
    /// Escape.
    Cancel,
}

/// Cursor position: stage position in board order and row within it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardFocus {
    pub stage: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardSensor {
    focus: KeyboardFocus,
    active: Option<DealId>,
}

impl KeyboardSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> KeyboardFocus {
        self.focus
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn focused_deal<'a>(&self, store: &'a BoardStore) -> Option<&'a Deal> {
        let stage = store.stage_at(self.focus.stage)?;
        store.deals(&stage.id)?.get(self.focus.row)
    }

    /// Forget a drag that ended outside this sensor.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Re-anchor the cursor after the board changed: follow the lifted card,
    /// otherwise clamp to the lane's current length.
    pub fn sync(&mut self, store: &BoardStore) {
        if let Some(pos) = self.active.as_ref().and_then(|id| locate(store, id)) {
            self.focus = pos;
            return;
        }
        let last_stage = store.stage_count().saturating_sub(1);
        self.focus.stage = self.focus.stage.min(last_stage);
        self.focus.row = self.focus.row.min(lane_len(store, self.focus.stage).saturating_sub(1));
    }

    pub fn handle(&mut self, key: KeyInput, store: &BoardStore) -> Option<SensorSignal> {
        match self.active.clone() {
            None => self.idle_key(key, store),
            Some(active) => self.dragging_key(key, store, &active),
        }
    }

    fn idle_key(&mut self, key: KeyInput, store: &BoardStore) -> Option<SensorSignal> {
        let KeyboardFocus { stage, row } = self.focus;
        match key {
            KeyInput::Up => self.focus.row = row.saturating_sub(1),
            KeyInput::Down => {
                self.focus.row = (row + 1).min(lane_len(store, stage).saturating_sub(1));
            }
            KeyInput::Left | KeyInput::Right => {
                let next = neighbour(store, stage, key)?;
                self.focus = KeyboardFocus {
                    stage: next,
                    row: row.min(lane_len(store, next).saturating_sub(1)),
                };
            }
            KeyInput::Activate => {
                let deal = self.focused_deal(store)?.id.clone();
                let origin = store.stage_at(stage)?.id.clone();
                self.active = Some(deal.clone());
                return Some(SensorSignal::Drag(DragEvent::Start {
                    deal_id: deal,
                    origin,
                }));
            }
            KeyInput::Open => {
                return self
                    .focused_deal(store)
                    .map(|d| SensorSignal::Click(d.id.clone()));
            }
            KeyInput::Cancel => {}
        }
        None
    }

    fn dragging_key(
        &mut self,
        key: KeyInput,
        store: &BoardStore,
        active: &DealId,
    ) -> Option<SensorSignal> {
        match key {
            KeyInput::Activate => {
                self.active = None;
                return Some(SensorSignal::Drag(DragEvent::drop()));
            }
            KeyInput::Cancel => {
                self.active = None;
                return Some(SensorSignal::Drag(DragEvent::cancel()));
            }
            KeyInput::Open => return None,
            _ => {}
        }

        let KeyboardFocus { stage, row } = locate(store, active)?;
        let target = match key {
            KeyInput::Left | KeyInput::Right => {
                let next = neighbour(store, stage, key)?;
                let lane = store.stage_at(next)?;
                match store.deals(&lane.id)?.get(row) {
                    Some(deal) => TargetId::Deal(deal.id.clone()),
                    None => TargetId::Stage(lane.id.clone()),
                }
            }
            KeyInput::Up => {
                let lane = store.stage_at(stage)?;
                let above = store.deals(&lane.id)?.get(row.checked_sub(1)?)?;
                TargetId::Deal(above.id.clone())
            }
            KeyInput::Down => {
                let lane = store.stage_at(stage)?;
                let below = store.deals(&lane.id)?.get(row + 1)?;
                TargetId::Deal(below.id.clone())
            }
            _ => return None,
        };
        Some(SensorSignal::Drag(DragEvent::over(target)))
    }
}

fn locate(store: &BoardStore, deal: &DealId) -> Option<KeyboardFocus> {
    let stage_id = store.find_stage_of(deal)?;
    Some(KeyboardFocus {
        stage: store.stage_position(stage_id)?,
        row: store.index_of(stage_id, deal)?,
    })
}

fn lane_len(store: &BoardStore, position: usize) -> usize {
    store
        .stage_at(position)
        .and_then(|s| store.deals(&s.id))
        .map_or(0, |d| d.len())
}

fn neighbour(store: &BoardStore, position: usize, key: KeyInput) -> Option<usize> {
    match key {
        KeyInput::Left => position.checked_sub(1),
        KeyInput::Right => Some(position + 1).filter(|p| *p < store.stage_count()),
        _ => None,
    }
}
