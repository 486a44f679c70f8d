use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{self, climbs, community, profile, stats};
use super::{App, LoadState, View};
use crate::models::Theme;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

// Accent for the active tab; light terminals get a darker one
fn accent(app: &App) -> Color {
    match app.dashboard().map(|d| d.profile.theme) {
        Some(Theme::Light) => Color::Blue,
        _ => Color::Yellow,
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = View::ALL.iter().map(View::title).collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let title = match app.dashboard() {
        Some(d) => format!(" Boulderlog · {} ", d.profile.display_name()),
        None => " Boulderlog ".to_string(),
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(accent(app))
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    let dashboard = match &app.state {
        LoadState::Ready(d) => d,
        LoadState::Failed(message) => {
            widgets::draw_load_error(f, message, area);
            return;
        }
    };

    match app.view {
        View::Stats => stats::draw(f, dashboard, area),
        View::Climbs => climbs::draw(f, dashboard, area),
        View::Profile => profile::draw(f, dashboard, area),
        View::Community => community::draw(f, dashboard, area),
    }
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Cyan);

    let mut spans = vec![
        Span::styled("h/l", key),
        Span::raw(" Tabs  "),
    ];

    if app.view == View::Climbs {
        spans.extend(vec![
            Span::styled("j/k", key),
            Span::raw(" Nav  "),
            Span::styled("g/G", key),
            Span::raw(" Top/Bot  "),
        ]);
    }

    spans.extend(vec![
        Span::styled("^r", key),
        Span::raw(" Reload  "),
        Span::styled("q", key),
        Span::raw(" Quit"),
    ]);

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
