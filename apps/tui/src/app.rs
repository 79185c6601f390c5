//! Core TUI application state and event loop.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::info;

use pipeboard_core::sensor::{KeyInput, PointerInput};
use pipeboard_core::{Board, BoardLayout, BoardSeed, DragOutcome, format_currency};
use pipeboard_shared::{AppConfig, Deal, Point};

use crate::screens;
use crate::widgets::{board_rect, centered_rect, status_bar};

const READY: &str = "Drag cards with the mouse, or Space to lift and arrows to move. ? for help";

/// Application state.
pub(crate) struct App {
    board: Board,
    /// Geometry of the board as last drawn; pointer input hit-tests against it.
    layout: BoardLayout,
    card_height: u16,
    /// Deal shown in the detail popup.
    selected: Option<Deal>,
    /// Status message shown in bottom bar.
    status: String,
    show_help: bool,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(seed: BoardSeed, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            board: Board::new(seed, &config.drag)?,
            layout: BoardLayout::default(),
            card_height: config.board.card_height,
            selected: None,
            status: READY.to_string(),
            show_help: false,
            should_quit: false,
        })
    }

    fn relayout(&mut self, screen: Rect) {
        let area = board_rect(split(screen)[1]);
        self.layout = self.board.layout(area, self.card_height);
    }

    fn report(&mut self, outcomes: &[DragOutcome]) {
        let Some(last) = outcomes.last() else {
            return;
        };
        self.status = match last {
            DragOutcome::Dropped { .. } => format!("{last}. {READY}"),
            _ => last.to_string(),
        };
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(seed: BoardSeed, config: &AppConfig) -> Result<()> {
    let app = App::new(seed, config)?;

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    info!(deals = app.board.store().deal_count(), "board opened");

    loop {
        let size = terminal.size()?;
        app.relayout(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key.code, key.modifiers),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("board closed");
    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = !app.show_help;
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.selected.is_some() {
        if matches!(code, KeyCode::Esc | KeyCode::Enter) {
            app.selected = None;
        }
        return;
    }

    let input = match code {
        KeyCode::Up | KeyCode::Char('k') => KeyInput::Up,
        KeyCode::Down | KeyCode::Char('j') => KeyInput::Down,
        KeyCode::Left | KeyCode::Char('h') => KeyInput::Left,
        KeyCode::Right | KeyCode::Char('l') => KeyInput::Right,
        KeyCode::Char(' ') | KeyCode::Enter => KeyInput::Activate,
        KeyCode::Char('o') => KeyInput::Open,
        KeyCode::Esc => KeyInput::Cancel,
        _ => return,
    };

    let App {
        board, selected, ..
    } = app;
    let outcomes = board.key(input, &mut |deal: &Deal| *selected = Some(deal.clone()));
    app.report(&outcomes);
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let point = Point::new(i32::from(mouse.column), i32::from(mouse.row));
    let input = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerInput::Down(point),
        MouseEventKind::Drag(MouseButton::Left) => PointerInput::Move(point),
        MouseEventKind::Up(MouseButton::Left) => PointerInput::Up(point),
        _ => return,
    };

    // A click anywhere closes an overlay instead of reaching the board.
    if app.show_help || app.selected.is_some() {
        if matches!(input, PointerInput::Down(_)) {
            app.show_help = false;
            app.selected = None;
        }
        return;
    }

    let App {
        board,
        layout,
        selected,
        ..
    } = app;
    let outcomes = board.pointer(input, layout, &mut |deal: &Deal| {
        *selected = Some(deal.clone());
    });
    app.report(&outcomes);
}

/// Title bar, board, status bar.
fn split(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(1),    // Board
            Constraint::Length(1), // Status bar
        ])
        .split(area)
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = split(f.area());
    let view = app.board.view();

    let deals: usize = view.columns.iter().map(|c| c.count).sum();
    let title = Paragraph::new(Line::from(vec![
        Span::styled("Pipeline ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_currency(view.pipeline_value()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  across {deals} deals"), Style::default().fg(Color::Gray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Pipeboard "),
    );
    f.render_widget(title, chunks[0]);

    screens::board::draw(f, chunks[1], &view, &app.layout);

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    if let Some(deal) = &app.selected {
        let stage = app
            .board
            .store()
            .find_stage_of(&deal.id)
            .and_then(|id| app.board.store().stage(id));
        screens::deal_detail::draw(f, deal, stage);
    }

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  ←↓↑→ / hjkl  Move the cursor, or the lifted card"),
        Line::from("  Space/Enter  Lift / drop the card under the cursor"),
        Line::from("  Esc          Cancel the current drag"),
        Line::from("  o            Open deal details"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Mouse:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Click        Open deal details"),
        Line::from("  Drag         Move a card to another stage"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (press any key to close) ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}
