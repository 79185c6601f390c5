//! Board geometry: where each column and card sits, and what lies under a
//! point.
//!
//! The TUI draws from this layout and the pointer sensor hit-tests against
//! it, so what the user sees and what the pointer resolves to never drift
//! apart. Recompute after every board change.

use pipeboard_shared::{DealId, Point, Rect, StageId, TargetId};

use crate::drag::OverTarget;
use crate::store::BoardStore;

/// Rows reserved at the top of each column for name, count and total.
pub const HEADER_HEIGHT: i32 = 4;

/// Horizontal gap between columns.
pub const COLUMN_GAP: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub deal: DealId,
    pub stage: StageId,
    pub rect: Rect,
    /// Whether the card fits inside its column body.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub stage: StageId,
    /// Whole column.
    pub rect: Rect,
    pub header: Rect,
    /// Droppable area under the header.
    pub body: Rect,
    pub cards: Vec<CardLayout>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardLayout {
    area: Rect,
    columns: Vec<ColumnLayout>,
}

impl BoardLayout {
    /// Split `area` into one column per stage, left to right, and stack each
    /// stage's cards top-down below its header.
    pub fn compute(store: &BoardStore, area: Rect, card_height: u16) -> Self {
        let n = i32::try_from(store.stage_count()).unwrap_or(i32::MAX);
        if n == 0 || area.width <= 0 || area.height <= 0 {
            return Self {
                area,
                columns: Vec::new(),
            };
        }

        let card_height = i32::from(card_height.max(1));
        let usable = (area.width - COLUMN_GAP * (n - 1)).max(n);
        let base = usable / n;
        let extra = usable % n;

        let mut x = area.x;
        let columns = store
            .stages()
            .enumerate()
            .map(|(i, stage)| {
                let i = i32::try_from(i).unwrap_or(i32::MAX);
                let width = base + i32::from(i < extra);
                let rect = Rect::new(x, area.y, width, area.height);
                x += width + COLUMN_GAP;

                let header_height = HEADER_HEIGHT.min(area.height);
                let header = Rect::new(rect.x, rect.y, width, header_height);
                let body = Rect::new(
                    rect.x,
                    rect.y + header_height,
                    width,
                    area.height - header_height,
                );

                // Cards sit inside the body border.
                let inner_bottom = body.bottom() - 1;
                let cards = store
                    .deals(&stage.id)
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                    .map(|(row, deal)| {
                        let row = i32::try_from(row).unwrap_or(i32::MAX);
                        let card = Rect::new(
                            body.x + 1,
                            body.y + 1 + row * card_height,
                            (width - 2).max(1),
                            card_height,
                        );
                        CardLayout {
                            deal: deal.id.clone(),
                            stage: stage.id.clone(),
                            rect: card,
                            visible: card.bottom() <= inner_bottom,
                        }
                    })
                    .collect();

                ColumnLayout {
                    stage: stage.id.clone(),
                    rect,
                    header,
                    body,
                    cards,
                }
            })
            .collect();

        Self { area, columns }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns
    }

    pub fn column(&self, stage: &StageId) -> Option<&ColumnLayout> {
        self.columns.iter().find(|c| &c.stage == stage)
    }

    pub fn card(&self, deal: &DealId) -> Option<&CardLayout> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|c| &c.deal == deal)
    }

    pub fn card_rect(&self, deal: &DealId) -> Option<Rect> {
        self.card(deal).map(|c| c.rect)
    }

    /// The visible card under `point`, else the column under it, else none.
    pub fn hit_test(&self, point: Point) -> Option<OverTarget> {
        let column = self.columns.iter().find(|c| c.rect.contains(point))?;
        let target = column
            .cards
            .iter()
            .filter(|c| c.visible)
            .find(|c| c.rect.contains(point))
            .map(|c| OverTarget::new(TargetId::Deal(c.deal.clone())).with_rect(c.rect))
            .unwrap_or_else(|| {
                OverTarget::new(TargetId::Stage(column.stage.clone())).with_rect(column.rect)
            });
        Some(target)
    }

    /// Drop target for a card being dragged with its translated rect at
    /// `active` and the pointer at `point`.
    ///
    /// The column under the pointer decides the lane. Within it, the visible
    /// card whose corners lie closest to `active`'s corners wins, so a card
    /// dragged past the last one still resolves to that card. A column with
    /// no visible cards resolves to itself.
    pub fn drag_target(&self, point: Point, active: Rect) -> Option<OverTarget> {
        let column = self.columns.iter().find(|c| c.rect.contains(point))?;
        let closest = column
            .cards
            .iter()
            .filter(|c| c.visible)
            .map(|c| (corner_distance(active, c.rect), c))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, c)| c);
        let target = match closest {
            Some(card) => OverTarget::new(TargetId::Deal(card.deal.clone())).with_rect(card.rect),
            None => OverTarget::new(TargetId::Stage(column.stage.clone())).with_rect(column.rect),
        };
        Some(target)
    }
}

fn corners(r: Rect) -> [Point; 4] {
    [
        Point::new(r.left(), r.top()),
        Point::new(r.right(), r.top()),
        Point::new(r.left(), r.bottom()),
        Point::new(r.right(), r.bottom()),
    ]
}

/// Sum of distances between matching corners of `a` and `b`.
fn corner_distance(a: Rect, b: Rect) -> f64 {
    corners(a)
        .into_iter()
        .zip(corners(b))
        .map(|(p, q)| p.distance_to(q))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::BoardSeed;

    fn sample_layout() -> BoardLayout {
        let store = BoardStore::from_seed(BoardSeed::sample()).expect("seed");
        BoardLayout::compute(&store, Rect::new(0, 3, 104, 30), 4)
    }

    #[test]
    fn columns_split_area_evenly() {
        let layout = sample_layout();
        assert_eq!(layout.columns().len(), 5);
        // 104 - 4 gaps = 100, 20 each.
        let xs: Vec<_> = layout.columns().iter().map(|c| c.rect.x).collect();
        assert_eq!(xs, [0, 21, 42, 63, 84]);
        assert!(layout.columns().iter().all(|c| c.rect.width == 20));
        assert_eq!(layout.columns()[0].body.y, 3 + HEADER_HEIGHT);
    }

    #[test]
    fn remainder_goes_to_leading_columns() {
        let store = BoardStore::from_seed(BoardSeed::sample()).expect("seed");
        let layout = BoardLayout::compute(&store, Rect::new(0, 0, 106, 20), 4);
        let widths: Vec<_> = layout.columns().iter().map(|c| c.rect.width).collect();
        assert_eq!(widths, [21, 21, 20, 20, 20]);
    }

    #[test]
    fn cards_stack_under_header() {
        let layout = sample_layout();
        let first = layout.card_rect(&DealId::from("1")).expect("card 1");
        let second = layout.card_rect(&DealId::from("2")).expect("card 2");
        assert_eq!(first, Rect::new(1, 3 + HEADER_HEIGHT + 1, 18, 4));
        assert_eq!(second.y, first.bottom());
        assert_eq!(layout.card(&DealId::from("2")).map(|c| c.stage.as_str()), Some("new"));
    }

    #[test]
    fn hit_test_prefers_cards_then_columns() {
        let layout = sample_layout();
        let card = layout.card_rect(&DealId::from("3")).expect("card 3");

        let hit = layout.hit_test(Point::new(card.x + 2, card.y + 1)).expect("hit");
        assert_eq!(hit.id, TargetId::Deal(DealId::from("3")));
        assert_eq!(hit.rect, Some(card));

        // Empty "offer" column.
        let offer = layout.column(&StageId::from("offer")).expect("offer").rect;
        let hit = layout.hit_test(Point::new(offer.x + 3, offer.y + 10)).expect("hit");
        assert_eq!(hit.id, TargetId::Stage(StageId::from("offer")));

        // Gap between columns and outside the board.
        assert!(layout.hit_test(Point::new(20, 10)).is_none());
        assert!(layout.hit_test(Point::new(5, 0)).is_none());
    }

    #[test]
    fn drag_target_picks_closest_card_in_pointer_column() {
        let layout = sample_layout();
        let qualified = layout.column(&StageId::from("qualified")).expect("qualified");
        let card4 = layout.card_rect(&DealId::from("4")).expect("card 4");

        // Dragged card sits well below deal 4; the pointer is in empty body space.
        let active = Rect::new(card4.x + 1, card4.bottom() + 6, card4.width, card4.height);
        let pointer = Point::new(qualified.body.x + 4, active.y + 1);
        assert_eq!(
            layout.hit_test(pointer).map(|t| t.id),
            Some(TargetId::Stage(StageId::from("qualified")))
        );

        let target = layout.drag_target(pointer, active).expect("target");
        assert_eq!(target.id, TargetId::Deal(DealId::from("4")));
        assert_eq!(target.rect, Some(card4));

        // Two cards: the nearer one wins.
        let card2 = layout.card_rect(&DealId::from("2")).expect("card 2");
        let new_body = layout.column(&StageId::from("new")).expect("new").body;
        let near_second = card2.translate(0, 1);
        let target = layout
            .drag_target(Point::new(new_body.x + 3, near_second.y), near_second)
            .expect("target");
        assert_eq!(target.id, TargetId::Deal(DealId::from("2")));
    }

    #[test]
    fn drag_target_over_empty_column_is_the_stage() {
        let layout = sample_layout();
        let offer = layout.column(&StageId::from("offer")).expect("offer").rect;
        let pointer = Point::new(offer.x + 3, offer.y + 10);
        let target = layout
            .drag_target(pointer, Rect::new(offer.x, offer.y + 8, 18, 4))
            .expect("target");
        assert_eq!(target.id, TargetId::Stage(StageId::from("offer")));
        assert_eq!(target.rect, Some(offer));

        // Outside every column.
        assert!(layout.drag_target(Point::new(20, 10), Rect::new(15, 8, 18, 4)).is_none());
    }

    #[test]
    fn overflowing_cards_are_not_hit() {
        let store = BoardStore::from_seed(BoardSeed::sample()).expect("seed");
        // Body is 10 - 4 = 6 rows: room for one 4-row card inside the border.
        let layout = BoardLayout::compute(&store, Rect::new(0, 0, 104, 10), 4);
        let second = layout.card(&DealId::from("2")).expect("card");
        assert!(!second.visible);
        let hit = layout
            .hit_test(Point::new(second.rect.x + 1, second.rect.y))
            .map(|t| t.id);
        assert_eq!(hit, Some(TargetId::Stage(StageId::from("new"))));
    }

    #[test]
    fn degenerate_area_has_no_columns() {
        let store = BoardStore::from_seed(BoardSeed::sample()).expect("seed");
        let layout = BoardLayout::compute(&store, Rect::new(0, 0, 0, 10), 4);
        assert!(layout.columns().is_empty());
        assert!(layout.hit_test(Point::new(0, 0)).is_none());
    }
}
