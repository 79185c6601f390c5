//! Reusable TUI widgets.

use std::str::FromStr;

use pipeboard_core::format_currency;
use pipeboard_shared::{Deal, Rect as BoardRect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}

/// How a card is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CardLook {
    Normal,
    /// Under the keyboard cursor.
    Focused,
    /// The in-place original while its copy is being dragged.
    Faded,
    /// The floating copy that follows the pointer.
    Lifted,
}

/// A deal card: title on the first line, value and company on the second.
pub(crate) fn deal_card(deal: &Deal, look: CardLook) -> Paragraph<'_> {
    let (border, text) = match look {
        CardLook::Normal => (Style::default().fg(Color::Gray), Style::default()),
        CardLook::Focused => (
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Style::default(),
        ),
        CardLook::Faded => (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        ),
        CardLook::Lifted => (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    };
    let value_style = if look == CardLook::Faded {
        text
    } else {
        Style::default().fg(Color::Green)
    };

    let mut detail = vec![Span::styled(format_currency(deal.value), value_style)];
    if let Some(company) = &deal.company {
        detail.push(Span::styled(format!("  {company}"), text.add_modifier(Modifier::DIM)));
    }

    let mut block = Block::default().borders(Borders::ALL).border_style(border);
    if let Some(tag) = deal.tags.first() {
        block = block.title(format!(" {tag} "));
    }
    if deal.tasks_due {
        block = block.title_bottom(Line::from(" ! due ").right_aligned());
    }

    Paragraph::new(vec![
        Line::styled(deal.title.as_str(), text.add_modifier(Modifier::BOLD)),
        Line::from(detail),
    ])
    .style(text)
    .block(block)
}

/// Parse a stage accent (`"blue"`, `"#f97316"`). Unknown values fall back to white.
pub(crate) fn stage_color(accent: &str) -> Color {
    Color::from_str(accent).unwrap_or(Color::White)
}

/// Screen area to board geometry.
pub(crate) fn board_rect(area: Rect) -> BoardRect {
    BoardRect::new(
        i32::from(area.x),
        i32::from(area.y),
        i32::from(area.width),
        i32::from(area.height),
    )
}

/// Board geometry back to screen cells, clipped to `bounds`. `None` when
/// nothing of `r` is on screen.
pub(crate) fn to_cells(r: BoardRect, bounds: Rect) -> Option<Rect> {
    let left = r.left().max(i32::from(bounds.x));
    let top = r.top().max(i32::from(bounds.y));
    let right = r.right().min(i32::from(bounds.right()));
    let bottom = r.bottom().min(i32::from(bounds.bottom()));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        u16::try_from(left).ok()?,
        u16::try_from(top).ok()?,
        u16::try_from(right - left).ok()?,
        u16::try_from(bottom - top).ok()?,
    ))
}

/// Create a centered rectangle with percentage width and height.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_parse_names_and_hex() {
        assert_eq!(stage_color("blue"), Color::Blue);
        assert_eq!(stage_color("#f97316"), Color::Rgb(0xf9, 0x73, 0x16));
        assert_eq!(stage_color("not-a-colour"), Color::White);
    }

    #[test]
    fn cells_are_clipped_to_bounds() {
        let bounds = Rect::new(0, 3, 80, 20);
        assert_eq!(
            to_cells(BoardRect::new(5, 5, 10, 4), bounds),
            Some(Rect::new(5, 5, 10, 4))
        );
        // Dragged past the top-left corner.
        assert_eq!(
            to_cells(BoardRect::new(-4, 1, 10, 4), bounds),
            Some(Rect::new(0, 3, 6, 2))
        );
        assert_eq!(to_cells(BoardRect::new(90, 5, 10, 4), bounds), None);
    }

    #[test]
    fn board_rect_round_trips_on_screen() {
        let area = Rect::new(2, 3, 40, 10);
        assert_eq!(to_cells(board_rect(area), area), Some(area));
    }
}
