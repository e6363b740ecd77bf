//! Stateless UI rendering for the game table.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use gambit::{Cell, GameMode, GameSession, Seat};

use super::app::App;

/// Renders the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let session = app.session();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Scores
            Constraint::Min(11),   // Board
            Constraint::Length(4), // Status
            Constraint::Length(1), // Help
        ])
        .split(area);

    // Title
    let title = Paragraph::new("Gambit - Tic Tac Toe")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_scores(frame, chunks[1], session, app.oracle_name());
    draw_board(frame, chunks[2], session, app.cursor());

    // Status
    let mut lines = vec![Line::from(session.status_message())];
    if let Some(notice) = app.notice() {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let status = Paragraph::new(lines)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[3]);

    let help = Paragraph::new("arrows/1-9 move · enter place · n new · s scores · m mode · q quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

fn draw_scores(frame: &mut Frame, area: Rect, session: &GameSession, oracle_name: &str) {
    let scores = session.scoreboard();
    let o_label = match session.mode() {
        GameMode::HumanVsAi => format!("AI ({}) (O)", oracle_name),
        GameMode::HumanVsHuman => "Player (O)".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!("Player (X): {}", scores.x_wins()),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(format!("Draws: {}", scores.draws()), Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled(
            format!("{}: {}", o_label, scores.o_wins()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    ]);

    let paragraph = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(match session.mode() {
            GameMode::HumanVsAi => " vs. AI ",
            GameMode::HumanVsHuman => " vs. Player ",
        }));
    frame.render_widget(paragraph, area);
}

fn draw_board(frame: &mut Frame, area: Rect, session: &GameSession, cursor: usize) {
    // Center the board
    let board_area = center_rect(area, 40, 11);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(board_area);

    for (row, chunk) in [0, 2, 4].into_iter().enumerate() {
        draw_row(frame, rows[chunk], session, cursor, row * 3);
        if chunk < 4 {
            draw_separator(frame, rows[chunk + 1]);
        }
    }
}

fn draw_row(frame: &mut Frame, area: Rect, session: &GameSession, cursor: usize, first: usize) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
        ])
        .split(area);

    draw_cell(frame, cols[0], session, cursor, first);
    draw_separator_vertical(frame, cols[1]);
    draw_cell(frame, cols[2], session, cursor, first + 1);
    draw_separator_vertical(frame, cols[3]);
    draw_cell(frame, cols[4], session, cursor, first + 2);
}

fn draw_cell(frame: &mut Frame, area: Rect, session: &GameSession, cursor: usize, index: usize) {
    let (symbol, base_style) = match session.board().get(index) {
        Some(Cell::Marked(Seat::X)) => (
            " X ".to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Some(Cell::Marked(Seat::O)) => (
            " O ".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        _ => (format!(" {} ", index + 1), Style::default().fg(Color::DarkGray)),
    };

    let winning = session
        .winning_line()
        .is_some_and(|line| line.contains(&index));

    let style = if winning {
        base_style.bg(Color::Green).fg(Color::Black)
    } else if index == cursor && !session.result().is_terminal() {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(symbol, style)))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn draw_separator(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new("──────────────────────────────────────")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, area);
}

fn draw_separator_vertical(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new("│").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
