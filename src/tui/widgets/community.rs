use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, List, ListItem, Paragraph},
    Frame,
};

use super::titled_block;
use crate::text::truncate;
use crate::stats::highest_grade_label;
use crate::tui::Dashboard;

pub fn draw(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(area);

    draw_leaderboard(f, dashboard, chunks[0]);
    draw_challenge(f, dashboard, chunks[1]);
}

fn draw_leaderboard(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let header = ListItem::new(Line::from(Span::styled(
        format!("{:<6}{:<28}{:>8}  {}", "Rank", "Climber", "Climbs", "Best"),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )));

    let rows = dashboard.leaderboard.iter().map(|r| {
        let c = &r.climber;
        let rank_color = match r.rank {
            1 => Color::Yellow,
            2 => Color::Gray,
            3 => Color::LightRed,
            _ => Color::DarkGray,
        };
        let name_style = if c.is_you {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let mut spans = vec![
            Span::styled(format!("#{:<5}", r.rank), Style::default().fg(rank_color)),
            Span::styled(
                format!("{:<28}", truncate(&format!("{} {}", c.avatar, c.name), 26)),
                name_style,
            ),
            Span::styled(
                format!("{:>8}", c.total_climbs),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("  {:<6}", highest_grade_label(c.highest_grade)),
                Style::default().fg(Color::Magenta),
            ),
        ];
        if let Some(activity) = &c.recent_activity {
            spans.push(Span::styled(
                truncate(activity, 40),
                Style::default().fg(Color::DarkGray),
            ));
        }
        ListItem::new(Line::from(spans))
    });

    let items: Vec<ListItem> = std::iter::once(header).chain(rows).collect();
    let list = List::new(items).block(titled_block("Leaderboard", Color::Cyan));
    f.render_widget(list, area);
}

fn draw_challenge(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let challenge = &dashboard.challenge;
    let block = titled_block(challenge.name, Color::Yellow);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .split(inner);

    let status = if challenge.completed {
        Span::styled(
            "  Complete!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("")
    };
    let description = Paragraph::new(Line::from(vec![
        Span::styled(challenge.description, Style::default().fg(Color::White)),
        status,
    ]));
    f.render_widget(description, rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
        .percent(challenge.percent.min(100) as u16)
        .label(format!("{}/{} flashes", challenge.progress, challenge.target));
    f.render_widget(gauge, rows[1]);
}
