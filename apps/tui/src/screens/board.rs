//! The pipeline board: one column per stage, cards stacked under a header.

use pipeboard_core::layout::ColumnLayout;
use pipeboard_core::view::ColumnView;
use pipeboard_core::{BoardLayout, BoardView, format_currency};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::widgets::{CardLook, deal_card, stage_color, to_cells};

pub(crate) fn draw(f: &mut Frame, area: Rect, view: &BoardView<'_>, layout: &BoardLayout) {
    for (column, geometry) in view.columns.iter().zip(layout.columns()) {
        draw_column(f, area, column, geometry);
    }

    // The lifted copy goes on top of everything else.
    if let Some(overlay) = &view.overlay {
        if let Some(rect) = overlay.rect.and_then(|r| to_cells(r, area)) {
            f.render_widget(Clear, rect);
            f.render_widget(deal_card(overlay.deal, CardLook::Lifted), rect);
        }
    }
}

fn draw_column(f: &mut Frame, area: Rect, column: &ColumnView<'_>, geometry: &ColumnLayout) {
    let accent = stage_color(&column.stage.color);

    if let Some(header) = to_cells(geometry.header, area) {
        let noun = if column.count == 1 { "deal" } else { "deals" };
        let text = vec![
            Line::styled(
                column.stage.name.as_str(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Line::from(format!(
                "{} {noun} · {}",
                column.count,
                format_currency(column.total_value)
            ))
            .style(Style::default().fg(Color::Gray)),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent));
        f.render_widget(Paragraph::new(text).block(block), header);
    }

    let Some(body) = to_cells(geometry.body, area) else {
        return;
    };
    let hidden = geometry.cards.iter().filter(|c| !c.visible).count();
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    if hidden > 0 {
        block = block.title_bottom(format!(" +{hidden} more "));
    }

    if column.cards.is_empty() {
        let hint = Paragraph::new("\nDrop deals here")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, body);
        return;
    }
    f.render_widget(block, body);

    for (card, slot) in column.cards.iter().zip(&geometry.cards) {
        if !slot.visible {
            continue;
        }
        let Some(rect) = to_cells(slot.rect, area) else {
            continue;
        };
        let look = if card.faded {
            CardLook::Faded
        } else if card.focused {
            CardLook::Focused
        } else {
            CardLook::Normal
        };
        f.render_widget(deal_card(card.deal, look), rect);
    }
}
