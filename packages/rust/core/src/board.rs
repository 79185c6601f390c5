//! The `Board` facade: one store, one controller, and the two sensors that
//! feed it.
//!
//! Hosts push raw input in and read snapshots back out. The store is only
//! handed out by shared reference, so the controller stays its single
//! writer.

use tracing::debug;

use pipeboard_shared::{Deal, DragConfig, Rect, Result};

use crate::drag::{DragController, DragEvent, DragOptions, DragOutcome, DragSession};
use crate::layout::BoardLayout;
use crate::seed::BoardSeed;
use crate::sensor::{
    DealClickHandler, KeyInput, KeyboardSensor, PointerInput, PointerSensor, SensorSignal,
};
use crate::store::BoardStore;
use crate::view::BoardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SensorKind {
    Pointer,
    Keyboard,
}

#[derive(Debug)]
pub struct Board {
    store: BoardStore,
    controller: DragController,
    pointer: PointerSensor,
    keyboard: KeyboardSensor,
    /// Sensor that started the current session, if a sensor did.
    owner: Option<SensorKind>,
}

impl Board {
    pub fn new(seed: BoardSeed, config: &DragConfig) -> Result<Self> {
        Ok(Self {
            store: BoardStore::from_seed(seed)?,
            controller: DragController::new(DragOptions::from(config)),
            pointer: PointerSensor::new(config.activation_distance),
            keyboard: KeyboardSensor::new(),
            owner: None,
        })
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn session(&self) -> &DragSession {
        self.controller.session()
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Card under the keyboard cursor.
    pub fn keyboard_focus(&self) -> Option<&Deal> {
        self.keyboard.focused_deal(&self.store)
    }

    /// Where the floating copy of a pointer-dragged card should be drawn.
    pub fn overlay_rect(&self) -> Option<Rect> {
        match self.owner {
            Some(SensorKind::Pointer) => self.pointer.overlay_rect(),
            _ => None,
        }
    }

    pub fn view(&self) -> BoardView<'_> {
        BoardView::build(
            &self.store,
            self.controller.session(),
            self.overlay_rect(),
            self.keyboard_focus().map(|d| &d.id),
        )
    }

    pub fn layout(&self, area: Rect, card_height: u16) -> BoardLayout {
        BoardLayout::compute(&self.store, area, card_height)
    }

    /// Apply an already-abstract drag event, bypassing the sensors.
    pub fn dispatch(&mut self, event: DragEvent) -> DragOutcome {
        let outcome = self.controller.handle(&mut self.store, event);
        if matches!(outcome, DragOutcome::Dropped { .. }) {
            // Whoever ended it, neither sensor is dragging any more.
            self.owner = None;
            self.keyboard.reset();
            let _ = self.pointer.cancel();
        }
        self.keyboard.sync(&self.store);
        outcome
    }

    /// Feed pointer input. `layout` must describe the board as last drawn.
    pub fn pointer(
        &mut self,
        input: PointerInput,
        layout: &BoardLayout,
        clicks: &mut dyn DealClickHandler,
    ) -> Vec<DragOutcome> {
        if self.owner == Some(SensorKind::Keyboard) {
            return Vec::new();
        }
        let signals = self.pointer.handle(input, layout);
        self.apply(SensorKind::Pointer, signals, clicks)
    }

    /// Feed keyboard input. Escape also cancels a pointer drag.
    pub fn key(&mut self, input: KeyInput, clicks: &mut dyn DealClickHandler) -> Vec<DragOutcome> {
        if self.owner == Some(SensorKind::Pointer) {
            return match input {
                KeyInput::Cancel => self.cancel().into_iter().collect(),
                _ => Vec::new(),
            };
        }
        let signals: Vec<_> = self.keyboard.handle(input, &self.store).into_iter().collect();
        self.apply(SensorKind::Keyboard, signals, clicks)
    }

    /// Cancel the sensor-driven session, if any.
    pub fn cancel(&mut self) -> Option<DragOutcome> {
        let signal = match self.owner? {
            SensorKind::Pointer => self.pointer.cancel(),
            SensorKind::Keyboard => self.keyboard.handle(KeyInput::Cancel, &self.store),
        }?;
        match signal {
            SensorSignal::Drag(event) => Some(self.dispatch(event)),
            SensorSignal::Click(_) => None,
        }
    }

    fn apply(
        &mut self,
        kind: SensorKind,
        signals: Vec<SensorSignal>,
        clicks: &mut dyn DealClickHandler,
    ) -> Vec<DragOutcome> {
        let mut outcomes = Vec::with_capacity(signals.len());
        for signal in signals {
            match signal {
                SensorSignal::Drag(event) => {
                    let is_start = matches!(event, DragEvent::Start { .. });
                    let outcome = self.dispatch(event);
                    if is_start {
                        if matches!(outcome, DragOutcome::Lifted { .. }) {
                            self.owner = Some(kind);
                        } else {
                            // Someone else holds the session; stand this sensor down.
                            debug!(?kind, %outcome, "sensor start rejected");
                            match kind {
                                SensorKind::Pointer => {
                                    let _ = self.pointer.cancel();
                                }
                                SensorKind::Keyboard => self.keyboard.reset(),
                            }
                            outcomes.push(outcome);
                            break;
                        }
                    }
                    outcomes.push(outcome);
                }
                SensorSignal::Click(deal_id) => {
                    if self.controller.is_dragging() {
                        continue;
                    }
                    if let Some(deal) = self.store.deal(&deal_id) {
                        debug!(%deal_id, "deal clicked");
                        clicks.on_deal_click(deal);
                    }
                }
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::StageSeed;
    use crate::sensor::IgnoreClicks;
    use pipeboard_shared::{DealId, Point, StageId, TargetId};

    const AREA: Rect = Rect::new(0, 0, 62, 30);

    fn sid(s: &str) -> StageId {
        StageId::from(s)
    }

    fn ids(board: &Board, stage: &str) -> Vec<String> {
        board
            .store()
            .deal_ids(&sid(stage))
            .into_iter()
            .map(|d| d.0)
            .collect()
    }

    /// `new=[D1,D2]`, `contact=[D3]`, `won=[]`.
    fn scenario_board(config: &DragConfig) -> Board {
        let stage = |id: &str, deals: &[&str]| StageSeed {
            id: sid(id),
            name: id.to_string(),
            color: "white".into(),
            deals: deals.iter().map(|d| Deal::new(*d, *d, 1_000)).collect(),
        };
        let seed = BoardSeed {
            stages: vec![
                stage("new", &["D1", "D2"]),
                stage("contact", &["D3"]),
                stage("won", &[]),
            ],
        };
        Board::new(seed, config).expect("board")
    }

    fn center(layout: &BoardLayout, deal: &str) -> Point {
        let r = layout.card_rect(&DealId::from(deal)).expect("card");
        Point::new(r.x + r.width / 2, r.y + r.height / 2)
    }

    #[test]
    fn pointer_drag_onto_upper_half_of_card() {
        let mut board = scenario_board(&DragConfig::default());
        let layout = board.layout(AREA, 4);
        let press = center(&layout, "D2");
        let d3 = layout.card_rect(&DealId::from("D3")).expect("D3");

        board.pointer(PointerInput::Down(press), &layout, &mut IgnoreClicks);
        let outcomes = board.pointer(
            PointerInput::Move(Point::new(d3.x + 2, d3.y)),
            &layout,
            &mut IgnoreClicks,
        );
        assert!(matches!(outcomes[0], DragOutcome::Lifted { .. }));
        assert!(matches!(outcomes[1], DragOutcome::Moved { index: 0, .. }));
        assert_eq!(ids(&board, "new"), ["D1"]);
        assert_eq!(ids(&board, "contact"), ["D2", "D3"]);
        assert!(board.view().overlay.is_some());

        let after_hover = board.store().clone();
        let outcomes = board.pointer(PointerInput::Up(press), &layout, &mut IgnoreClicks);
        assert!(matches!(outcomes[0], DragOutcome::Dropped { .. }));
        assert_eq!(board.store(), &after_hover);
        assert_eq!(board.session(), &DragSession::Idle);
        assert!(board.view().overlay.is_none());
    }

    #[test]
    fn pointer_drag_past_last_card_lands_after_it() {
        let mut board = scenario_board(&DragConfig::default());
        let layout = board.layout(AREA, 4);
        let d3 = layout.card_rect(&DealId::from("D3")).expect("D3");

        board.pointer(PointerInput::Down(center(&layout, "D1")), &layout, &mut IgnoreClicks);
        let outcomes = board.pointer(
            PointerInput::Move(Point::new(d3.x + 2, d3.bottom() + 8)),
            &layout,
            &mut IgnoreClicks,
        );
        assert!(matches!(outcomes[0], DragOutcome::Lifted { .. }));
        assert!(matches!(outcomes[1], DragOutcome::Moved { index: 1, .. }));
        assert_eq!(ids(&board, "contact"), ["D3", "D1"]);
        assert_eq!(ids(&board, "new"), ["D2"]);

        board.pointer(PointerInput::Up(Point::new(0, 0)), &layout, &mut IgnoreClicks);
        assert_eq!(ids(&board, "contact"), ["D3", "D1"]);
    }

    #[test]
    fn click_fires_only_without_drag() {
        let mut board = scenario_board(&DragConfig::default());
        let layout = board.layout(AREA, 4);
        let p = center(&layout, "D1");

        let mut clicked = Vec::new();
        let mut record = |deal: &Deal| clicked.push(deal.id.clone());

        board.pointer(PointerInput::Down(p), &layout, &mut record);
        board.pointer(PointerInput::Move(Point::new(p.x + 1, p.y)), &layout, &mut record);
        board.pointer(PointerInput::Up(p), &layout, &mut record);

        board.pointer(PointerInput::Down(p), &layout, &mut record);
        board.pointer(PointerInput::Move(Point::new(p.x, p.y + 3)), &layout, &mut record);
        board.pointer(PointerInput::Up(p), &layout, &mut record);

        assert_eq!(clicked, vec![DealId::from("D1")]);
    }

    #[test]
    fn pointer_over_empty_lane_appends() {
        let mut board = scenario_board(&DragConfig::default());
        let layout = board.layout(AREA, 4);
        let won = layout.column(&sid("won")).expect("won").body;

        board.pointer(PointerInput::Down(center(&layout, "D1")), &layout, &mut IgnoreClicks);
        board.pointer(
            PointerInput::Move(Point::new(won.x + 3, won.y + 8)),
            &layout,
            &mut IgnoreClicks,
        );
        assert_eq!(ids(&board, "won"), ["D1"]);
        assert_eq!(ids(&board, "new"), ["D2"]);
    }

    #[test]
    fn keyboard_only_cross_lane_move() {
        let mut board = Board::new(BoardSeed::sample(), &DragConfig::default()).expect("board");

        board.key(KeyInput::Activate, &mut IgnoreClicks);
        assert!(board.is_dragging());

        board.key(KeyInput::Right, &mut IgnoreClicks);
        assert_eq!(ids(&board, "contact"), ["1", "3"]);
        board.key(KeyInput::Right, &mut IgnoreClicks);
        assert_eq!(ids(&board, "qualified"), ["1", "4"]);
        board.key(KeyInput::Right, &mut IgnoreClicks);
        assert_eq!(ids(&board, "offer"), ["1"]);
        assert_eq!(board.keyboard_focus().map(|d| d.id.as_str()), Some("1"));

        let outcomes = board.key(KeyInput::Activate, &mut IgnoreClicks);
        assert!(matches!(outcomes[0], DragOutcome::Dropped { cancelled: false, .. }));
        assert!(!board.is_dragging());
        assert_eq!(ids(&board, "new"), ["2"]);
        board.store().check_invariants().expect("unique");
    }

    #[test]
    fn keyboard_open_reports_focused_deal() {
        let mut board = Board::new(BoardSeed::sample(), &DragConfig::default()).expect("board");
        let mut opened = None;
        board.key(KeyInput::Right, &mut IgnoreClicks);
        board.key(KeyInput::Open, &mut |deal: &Deal| opened = Some(deal.title.clone()));
        assert_eq!(opened.as_deref(), Some("Marketing Campaign"));
    }

    #[test]
    fn escape_cancels_pointer_drag_and_reverts_when_configured() {
        let config = DragConfig {
            revert_on_cancel: true,
            ..DragConfig::default()
        };
        let mut board = scenario_board(&config);
        let original = board.store().clone();
        let layout = board.layout(AREA, 4);
        let won = layout.column(&sid("won")).expect("won").body;

        board.pointer(PointerInput::Down(center(&layout, "D1")), &layout, &mut IgnoreClicks);
        board.pointer(
            PointerInput::Move(Point::new(won.x + 3, won.y + 8)),
            &layout,
            &mut IgnoreClicks,
        );
        assert_eq!(ids(&board, "won"), ["D1"]);

        // Arrow keys belong to the pointer's session owner; only Escape gets through.
        assert!(board.key(KeyInput::Left, &mut IgnoreClicks).is_empty());
        let outcomes = board.key(KeyInput::Cancel, &mut IgnoreClicks);
        assert!(matches!(outcomes[0], DragOutcome::Dropped { reverted: true, .. }));
        assert_eq!(board.store(), &original);
        assert!(board.pointer(PointerInput::Up(Point::new(0, 0)), &layout, &mut IgnoreClicks).is_empty());
    }

    #[test]
    fn pointer_is_ignored_during_keyboard_drag() {
        let mut board = scenario_board(&DragConfig::default());
        let layout = board.layout(AREA, 4);
        board.key(KeyInput::Activate, &mut IgnoreClicks);

        let p = center(&layout, "D3");
        assert!(board.pointer(PointerInput::Down(p), &layout, &mut IgnoreClicks).is_empty());
        assert!(board
            .pointer(PointerInput::Move(Point::new(p.x + 5, p.y)), &layout, &mut IgnoreClicks)
            .is_empty());
        assert_eq!(
            board.session().active().map(|a| a.deal_id.as_str()),
            Some("D1")
        );
    }

    #[test]
    fn dispatch_drives_scripted_sessions() {
        let mut board = scenario_board(&DragConfig::default());
        board.dispatch(DragEvent::start("D1", "new"));
        board.dispatch(DragEvent::over(TargetId::Stage(sid("won"))));
        let outcome = board.dispatch(DragEvent::drop());
        assert!(matches!(outcome, DragOutcome::Dropped { .. }));
        assert_eq!(ids(&board, "won"), ["D1"]);

        // Drop again: idempotent.
        let before = board.store().clone();
        board.dispatch(DragEvent::drop());
        assert_eq!(board.store(), &before);
    }

    #[test]
    fn sensor_start_during_scripted_session_is_rejected() {
        let mut board = scenario_board(&DragConfig::default());
        board.dispatch(DragEvent::start("D3", "contact"));

        let outcomes = board.key(KeyInput::Activate, &mut IgnoreClicks);
        assert!(matches!(outcomes[0], DragOutcome::Ignored { .. }));
        // The keyboard stood down, so its next Activate is a fresh lift attempt
        // rather than a drop of someone else's session.
        assert!(board.is_dragging());
        let outcomes = board.key(KeyInput::Activate, &mut IgnoreClicks);
        assert!(matches!(outcomes[0], DragOutcome::Ignored { .. }));
        assert_eq!(board.session().active().map(|a| a.deal_id.as_str()), Some("D3"));
    }
}
