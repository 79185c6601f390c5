//! Pointer sensor with an activation-distance gate.
//!
//! A press on a card only arms a gesture. It becomes a drag once the pointer
//! travels strictly further than the activation distance from the press
//! point; releasing before that is a click.

use tracing::trace;

use pipeboard_shared::{DealId, Point, Rect, StageId, TargetId};

use super::SensorSignal;
use crate::drag::DragEvent;
use crate::layout::BoardLayout;

/// Raw pointer input in board cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up(Point),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Gesture {
    #[default]
    Idle,
    /// Pressed on a card, not yet past the activation distance.
    Pending {
        deal: DealId,
        origin: StageId,
        press: Point,
        card: Rect,
    },
    Active {
        press: Point,
        card: Rect,
        position: Point,
    },
}

#[derive(Debug, Clone)]
pub struct PointerSensor {
    activation_distance: f64,
    gesture: Gesture,
    last_was_drag: bool,
}

impl PointerSensor {
    pub fn new(activation_distance: u16) -> Self {
        Self {
            activation_distance: f64::from(activation_distance),
            gesture: Gesture::Idle,
            last_was_drag: false,
        }
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Active { .. })
    }

    /// Whether the current or just-completed gesture became a drag. Card
    /// click handling is gated on this being `false`.
    pub fn last_gesture_was_drag(&self) -> bool {
        self.is_dragging() || self.last_was_drag
    }

    /// Rect of the grabbed card translated by the pointer's travel.
    pub fn overlay_rect(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Active {
                press,
                card,
                position,
            } => Some(translated(*card, *press, *position)),
            _ => None,
        }
    }

    pub fn handle(&mut self, input: PointerInput, layout: &BoardLayout) -> Vec<SensorSignal> {
        match input {
            PointerInput::Down(p) => self.down(p, layout),
            PointerInput::Move(p) => self.moved(p, layout),
            PointerInput::Up(_) => self.up(),
        }
    }

    /// End an active drag as cancelled. A pending press is simply dropped.
    pub fn cancel(&mut self) -> Option<SensorSignal> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Active { .. } => {
                self.last_was_drag = true;
                Some(SensorSignal::Drag(DragEvent::cancel()))
            }
            _ => None,
        }
    }

    fn down(&mut self, p: Point, layout: &BoardLayout) -> Vec<SensorSignal> {
        // A press without a release in between; end whatever was going on.
        let signals: Vec<_> = self.cancel().into_iter().collect();
        self.last_was_drag = false;

        let Some(hit) = layout.hit_test(p) else {
            return signals;
        };
        let TargetId::Deal(deal) = hit.id else {
            return signals;
        };
        let Some(card) = layout.card(&deal) else {
            return signals;
        };
        trace!(%deal, x = p.x, y = p.y, "pointer armed");
        self.gesture = Gesture::Pending {
            origin: card.stage.clone(),
            card: card.rect,
            deal,
            press: p,
        };
        signals
    }

    fn moved(&mut self, p: Point, layout: &BoardLayout) -> Vec<SensorSignal> {
        match &mut self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Pending {
                deal,
                origin,
                press,
                card,
            } => {
                if p.distance_to(*press) <= self.activation_distance {
                    return Vec::new();
                }
                let start = DragEvent::Start {
                    deal_id: deal.clone(),
                    origin: origin.clone(),
                };
                let (press, card) = (*press, *card);
                self.gesture = Gesture::Active {
                    press,
                    card,
                    position: p,
                };
                vec![SensorSignal::Drag(start), self.over(p, layout)]
            }
            Gesture::Active { position, .. } => {
                *position = p;
                vec![self.over(p, layout)]
            }
        }
    }

    fn up(&mut self) -> Vec<SensorSignal> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => Vec::new(),
            Gesture::Pending { deal, .. } => {
                self.last_was_drag = false;
                vec![SensorSignal::Click(deal)]
            }
            Gesture::Active { .. } => {
                self.last_was_drag = true;
                vec![SensorSignal::Drag(DragEvent::drop())]
            }
        }
    }

    fn over(&self, p: Point, layout: &BoardLayout) -> SensorSignal {
        let active_rect = self.overlay_rect();
        let over = match active_rect {
            Some(active) => layout.drag_target(p, active),
            None => layout.hit_test(p),
        };
        SensorSignal::Drag(DragEvent::Over { over, active_rect })
    }
}

fn translated(card: Rect, press: Point, now: Point) -> Rect {
    card.translate(now.x - press.x, now.y - press.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::BoardSeed;
    use crate::store::BoardStore;

    fn layout() -> BoardLayout {
        let store = BoardStore::from_seed(BoardSeed::sample()).expect("seed");
        BoardLayout::compute(&store, Rect::new(0, 0, 104, 30), 4)
    }

    fn card_center(layout: &BoardLayout, deal: &str) -> Point {
        let r = layout.card_rect(&DealId::from(deal)).expect("card");
        Point::new(r.x + r.width / 2, r.y + r.height / 2)
    }

    #[test]
    fn short_press_is_a_click() {
        let layout = layout();
        let mut sensor = PointerSensor::new(2);
        let p = card_center(&layout, "1");

        assert!(sensor.handle(PointerInput::Down(p), &layout).is_empty());
        // Travel of exactly the threshold does not activate.
        let nudge = Point::new(p.x + 2, p.y);
        assert!(sensor.handle(PointerInput::Move(nudge), &layout).is_empty());
        let signals = sensor.handle(PointerInput::Up(nudge), &layout);

        assert_eq!(signals, vec![SensorSignal::Click(DealId::from("1"))]);
        assert!(!sensor.last_gesture_was_drag());
    }

    #[test]
    fn travel_past_threshold_starts_drag_without_click() {
        let layout = layout();
        let mut sensor = PointerSensor::new(2);
        let p = card_center(&layout, "2");

        sensor.handle(PointerInput::Down(p), &layout);
        let signals = sensor.handle(PointerInput::Move(Point::new(p.x + 3, p.y)), &layout);
        assert_eq!(signals.len(), 2);
        assert_eq!(
            signals[0],
            SensorSignal::Drag(DragEvent::start("2", "new"))
        );
        assert!(matches!(signals[1], SensorSignal::Drag(DragEvent::Over { .. })));
        assert!(sensor.is_dragging());

        let signals = sensor.handle(PointerInput::Up(p), &layout);
        assert_eq!(signals, vec![SensorSignal::Drag(DragEvent::drop())]);
        assert!(!signals.iter().any(|s| matches!(s, SensorSignal::Click(_))));
        assert!(sensor.last_gesture_was_drag());
        assert!(!sensor.is_dragging());
    }

    #[test]
    fn over_reports_target_and_translated_rect() {
        let layout = layout();
        let mut sensor = PointerSensor::new(2);
        let press = card_center(&layout, "1");
        let grabbed = layout.card_rect(&DealId::from("1")).expect("card");
        let over_card = layout.card_rect(&DealId::from("3")).expect("card");
        let dest = Point::new(over_card.x + 1, over_card.y + 1);

        sensor.handle(PointerInput::Down(press), &layout);
        let signals = sensor.handle(PointerInput::Move(dest), &layout);
        let SensorSignal::Drag(DragEvent::Over { over, active_rect }) = &signals[1] else {
            panic!("expected over, got {signals:?}");
        };
        let over = over.as_ref().expect("target");
        assert_eq!(over.id, TargetId::Deal(DealId::from("3")));
        assert_eq!(over.rect, Some(over_card));
        assert_eq!(
            *active_rect,
            Some(grabbed.translate(dest.x - press.x, dest.y - press.y))
        );
        assert_eq!(sensor.overlay_rect(), *active_rect);
    }

    #[test]
    fn dragging_below_last_card_targets_that_card() {
        let layout = layout();
        let mut sensor = PointerSensor::new(2);
        let press = card_center(&layout, "1");
        let card3 = layout.card_rect(&DealId::from("3")).expect("card");
        let dest = Point::new(card3.x + 2, card3.bottom() + 8);

        sensor.handle(PointerInput::Down(press), &layout);
        let signals = sensor.handle(PointerInput::Move(dest), &layout);
        let SensorSignal::Drag(DragEvent::Over { over, active_rect }) = &signals[1] else {
            panic!("expected over, got {signals:?}");
        };
        let over = over.as_ref().expect("target");
        assert_eq!(over.id, TargetId::Deal(DealId::from("3")));
        let active = active_rect.expect("active rect");
        assert!(active.top() > card3.bottom());
    }

    #[test]
    fn press_outside_cards_arms_nothing() {
        let layout = layout();
        let mut sensor = PointerSensor::new(2);
        let offer = layout.column(&StageId::from("offer")).expect("col").rect;
        let p = Point::new(offer.x + 2, offer.y + 10);

        sensor.handle(PointerInput::Down(p), &layout);
        assert!(sensor.handle(PointerInput::Move(Point::new(p.x + 10, p.y)), &layout).is_empty());
        assert!(sensor.handle(PointerInput::Up(p), &layout).is_empty());
    }

    #[test]
    fn cancel_ends_active_drag_only() {
        let layout = layout();
        let mut sensor = PointerSensor::new(2);
        let p = card_center(&layout, "1");

        sensor.handle(PointerInput::Down(p), &layout);
        assert_eq!(sensor.cancel(), None);

        sensor.handle(PointerInput::Down(p), &layout);
        sensor.handle(PointerInput::Move(Point::new(p.x, p.y + 5)), &layout);
        assert_eq!(
            sensor.cancel(),
            Some(SensorSignal::Drag(DragEvent::cancel()))
        );
        assert!(sensor.handle(PointerInput::Up(p), &layout).is_empty());
    }
}
