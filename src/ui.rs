use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::{App, DIFFICULTIES, TIME_LIMITS};
use crate::game::Screen;
use crate::policy::TimeLimit;

const HORIZONTAL_MARGIN: u16 = 4;
const VERTICAL_MARGIN: u16 = 1;

/// On-screen keyboard rows; together they cover the valid alphabet exactly.
pub const KEY_ROWS: [&str; 4] = ["1234567890-=", "qwertyuiop[]", "asdfghjkl;'", "zxcvbnm,."];

pub fn render(app: &App, f: &mut Frame) {
    match app.screen {
        Screen::Config => render_config(app, f),
        Screen::Countdown => render_countdown(app, f),
        Screen::Playing => render_playing(app, f),
        Screen::GameOver => render_game_over(app, f),
        Screen::Instructions => render_instructions(f),
    }
}

fn render_config(app: &App, f: &mut Frame) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let selected = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let mut difficulty_spans = vec![Span::styled("difficulty  ", dim)];
    for (idx, d) in DIFFICULTIES.iter().enumerate() {
        let style = if idx == app.difficulty_idx { selected } else { dim };
        difficulty_spans.push(Span::styled(format!(" {} ", d.label()), style));
    }

    let mut time_spans = vec![Span::styled("time limit  ", dim)];
    for (idx, t) in TIME_LIMITS.iter().enumerate() {
        let style = if idx == app.time_idx { selected } else { dim };
        let label = match t {
            TimeLimit::Seconds(s) => format!(" {}s ", s),
            TimeLimit::Infinite => " infinite ".to_string(),
        };
        time_spans.push(Span::styled(label, style));
    }

    let lines = vec![
        Line::from(Span::styled("klak", bold.fg(Color::Green))),
        Line::from(Span::styled(
            "hit the highlighted key before it decays",
            dim,
        )),
        Line::default(),
        Line::from(difficulty_spans).alignment(Alignment::Center),
        Line::from(time_spans).alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            "←/→ difficulty   ↑/↓ time   (enter) start   (i) instructions   (esc) quit",
            dim.add_modifier(Modifier::ITALIC),
        )),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(paragraph, centered_vertically(f.area(), 7));
}

fn render_countdown(app: &App, f: &mut Frame) {
    let digit = Paragraph::new(Span::styled(
        app.countdown.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(digit, centered_vertically(f.area(), 1));
}

fn render_playing(app: &App, f: &mut Frame) {
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // score / session timer
            Constraint::Length(1),
            Constraint::Length(KEY_ROWS.len() as u16 + 2), // keyboard
            Constraint::Length(1),
            Constraint::Length(1), // decay gauge
            Constraint::Min(0),
        ])
        .split(f.area());

    let header = Line::from(vec![
        Span::styled(format!("Score: {}", app.score), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(format!("Time: {}", app.time_remaining), dim),
    ]);
    f.render_widget(Paragraph::new(header).alignment(Alignment::Center), chunks[0]);

    let keyboard: Vec<Line> = KEY_ROWS
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut spans = vec![Span::raw(" ".repeat(row_idx))];
            for c in row.chars() {
                spans.push(key_span(app, c));
                spans.push(Span::raw(" "));
            }
            Line::from(spans).alignment(Alignment::Center)
        })
        .collect();
    f.render_widget(
        Paragraph::new(keyboard).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );

    if let Some(fraction) = app.progress {
        let color = if fraction > 0.5 {
            Color::Green
        } else if fraction > 0.2 {
            Color::Yellow
        } else {
            Color::Red
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(fraction.clamp(0.0, 1.0))
            .label("");
        f.render_widget(gauge, chunks[4]);
    }
}

fn key_span(app: &App, c: char) -> Span<'static> {
    let text = format!(" {} ", c);
    if app.flash.map(|flash| flash.key) == Some(c) {
        return Span::styled(
            text,
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        );
    }
    if app.target == Some(c) {
        return Span::styled(
            text,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    }
    Span::styled(text, Style::default().add_modifier(Modifier::DIM))
}

fn render_game_over(app: &App, f: &mut Frame) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled("Game Over", bold.fg(Color::Red))),
        Line::default(),
    ];

    if let Some(stats) = &app.stats {
        let time_label = match stats.time_limit {
            TimeLimit::Seconds(s) => format!("{}s", s),
            TimeLimit::Infinite => "Infinite".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!("Final Score: {}", stats.display_score),
            bold,
        )));
        lines.push(Line::from(format!("Keystrokes: {}", stats.keystrokes)));
        lines.push(Line::from(format!("Keystrokes/min: {}", stats.kpm)));
        lines.push(Line::from(format!("Difficulty: {}", stats.difficulty)));
        lines.push(Line::from(format!("Time: {}", time_label)));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(r)estart   (esc) quit",
        dim.add_modifier(Modifier::ITALIC),
    )));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(paragraph, centered_vertically(f.area(), 9));
}

fn render_instructions(f: &mut Frame) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let lines = vec![
        Line::from(Span::styled(
            "How to play",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("A key lights up on the keyboard below. Press it before"),
        Line::from("its bar runs out. Faster presses earn a bigger bonus:"),
        Line::from("1 point for the hit plus up to 1 more for speed."),
        Line::default(),
        Line::from("zen has no decay and no pressure. hell gives you half a second."),
        Line::default(),
        Line::from(Span::styled("(b)ack   (esc) back", dim.add_modifier(Modifier::ITALIC))),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(paragraph, centered_vertically(f.area(), 9));
}

/// Shrink `area` to `height` lines, vertically centered.
fn centered_vertically(area: Rect, height: u16) -> Rect {
    let pad = area.height.saturating_sub(height) / 2;
    Rect {
        x: area.x,
        y: area.y + pad,
        width: area.width,
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Difficulty, VALID_CHARS};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn key_rows_cover_the_alphabet_exactly() {
        let mut from_rows: Vec<char> = KEY_ROWS.iter().flat_map(|r| r.chars()).collect();
        let mut alphabet: Vec<char> = VALID_CHARS.chars().collect();
        from_rows.sort_unstable();
        alphabet.sort_unstable();
        assert_eq!(from_rows, alphabet);
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn renders_config_screen() {
        let app = App::from_seed(1, Difficulty::Medium, TimeLimit::Seconds(60));
        let content = draw(&app);
        assert!(content.contains("klak"));
        assert!(content.contains("difficulty"));
    }

    #[test]
    fn renders_countdown_screen() {
        let mut app = App::from_seed(1, Difficulty::Medium, TimeLimit::Seconds(60));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.screen, Screen::Countdown);
        assert!(draw(&app).contains('3'));
    }

    #[test]
    fn renders_playing_screen_with_keyboard() {
        let mut app = App::from_seed(1, Difficulty::Medium, TimeLimit::Seconds(60));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        for _ in 0..60 {
            app.on_tick(50);
        }
        assert_eq!(app.screen, Screen::Playing);
        let content = draw(&app);
        assert!(content.contains("Score:"));
        assert!(content.contains('q'));
        assert!(content.contains(';'));
    }

    #[test]
    fn renders_game_over_screen_with_stats() {
        let mut app = App::from_seed(1, Difficulty::Medium, TimeLimit::Seconds(60));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        for _ in 0..60 {
            app.on_tick(50);
        }
        let target = app.target.unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char(target), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));

        let content = draw(&app);
        assert!(content.contains("Game Over"));
        assert!(content.contains("Final Score: 2"));
        assert!(content.contains("Keystrokes: 1"));
    }

    #[test]
    fn renders_instructions_screen() {
        let mut app = App::from_seed(1, Difficulty::Medium, TimeLimit::Seconds(60));
        app.handle_key(KeyEvent::new(KeyCode::Char('i'), KeyModifiers::NONE));
        assert!(draw(&app).contains("How to play"));
    }
}
