//! Deal detail popup.

use pipeboard_core::format_currency;
use pipeboard_shared::{Deal, Stage};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::widgets::centered_rect;

pub(crate) fn draw(f: &mut Frame, deal: &Deal, stage: Option<&Stage>) {
    let area = centered_rect(50, 45, f.area());
    let label = Style::default().fg(Color::Gray);

    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<11}"), label), Span::raw(value)])
    };

    let lines = vec![
        Line::styled(
            deal.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        field("Company", deal.company.clone().unwrap_or_else(|| "-".into())),
        field("Value", format_currency(deal.value)),
        field(
            "Stage",
            stage.map_or_else(|| "-".into(), |s| s.name.clone()),
        ),
        field(
            "Tags",
            if deal.tags.is_empty() {
                "-".into()
            } else {
                deal.tags.join(", ")
            },
        ),
        field("Tasks due", if deal.tasks_due { "yes" } else { "no" }.into()),
        Line::from(""),
        Line::styled("Esc or Enter to close", label),
    ];

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Deal {} ", deal.id))
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}
