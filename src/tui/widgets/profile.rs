use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use super::titled_block;
use crate::stats::highest_grade_label;
use crate::tui::Dashboard;

pub fn draw(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[0]);

    draw_card(f, dashboard, top[0]);
    draw_quick_stats(f, dashboard, top[1]);
    draw_achievements(f, dashboard, chunks[1]);
}

fn draw_card(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let profile = &dashboard.profile;
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);

    let mut text = vec![
        Line::from(Span::styled(
            profile.display_name().to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Climbing since: ", label),
            Span::styled(profile.start_date.format("%b %d, %Y").to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Favorite gym: ", label),
            Span::styled(dashboard.favorite_gym.as_deref().unwrap_or("-"), value),
        ]),
        Line::from(vec![
            Span::styled("Logging at: ", label),
            Span::styled(dashboard.selected_gym.as_deref().unwrap_or("-"), value),
        ]),
    ];

    if !profile.goals.is_empty() {
        text.push(Line::from(Span::styled("Goals:", label)));
        text.extend(
            profile
                .goals
                .iter()
                .map(|g| Line::from(Span::styled(format!("  • {}", g), value))),
        );
    }

    let paragraph = Paragraph::new(text).block(titled_block("Profile", Color::Yellow));
    f.render_widget(paragraph, area);
}

fn draw_quick_stats(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let analytics = &dashboard.analytics;
    let row = |name: &'static str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<16}", name), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };

    let text = vec![
        row("Total climbs", analytics.summary.total.to_string(), Color::Cyan),
        row(
            "Highest grade",
            highest_grade_label(analytics.highest_grade).to_string(),
            Color::Magenta,
        ),
        row("Climbing days", dashboard.climbing_days.to_string(), Color::Green),
        row(
            "Achievements",
            analytics.achievements.len().to_string(),
            Color::Yellow,
        ),
    ];

    let paragraph = Paragraph::new(text).block(titled_block("Quick Stats", Color::Cyan));
    f.render_widget(paragraph, area);
}

fn draw_achievements(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let mut items: Vec<ListItem> = dashboard
        .analytics
        .achievements
        .iter()
        .map(|a| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", a.icon)),
                Span::styled(
                    format!("{:<20}", a.title),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(a.description.clone(), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    if items.is_empty() {
        items.push(ListItem::new(Span::styled(
            "Log your first climb to unlock achievements",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let list = List::new(items).block(titled_block("Achievements", Color::Magenta));
    f.render_widget(list, area);
}
