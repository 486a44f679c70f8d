use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, List, ListItem, Paragraph},
    Frame,
};

use super::titled_block;
use crate::text::{bar, truncate};
use crate::stats::{highest_grade_label, CategoryCount};
use crate::tui::Dashboard;

pub fn draw(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Summary cards
            Constraint::Length(12), // Grades + route types
            Constraint::Min(0),     // Monthly trend
        ])
        .split(area);

    draw_cards(f, dashboard, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    draw_grades(f, dashboard, middle[0]);
    draw_breakdown(f, "Route Types", &dashboard.analytics.route_types, middle[1]);
    draw_trend(f, dashboard, chunks[2]);
}

fn draw_cards(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let analytics = &dashboard.analytics;
    let summary = &analytics.summary;

    let cards = [
        (
            "Total Climbs",
            summary.total.to_string(),
            format!("{} this week", analytics.recent_climbs),
            Color::Cyan,
        ),
        (
            "Success Rate",
            format!("{}%", summary.success_rate),
            format!("{} completed", summary.completed),
            Color::Green,
        ),
        (
            "Flash Rate",
            format!("{}%", summary.flash_rate),
            format!("{} flashed", summary.flashed),
            Color::Yellow,
        ),
        (
            "Highest Grade",
            highest_grade_label(analytics.highest_grade).to_string(),
            "personal best".to_string(),
            Color::Magenta,
        ),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, value, caption, color), column) in cards.into_iter().zip(columns.iter()) {
        let text = vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(caption, Style::default().fg(Color::DarkGray))),
        ];
        let paragraph = Paragraph::new(text).block(titled_block(title, Color::Gray));
        f.render_widget(paragraph, *column);
    }
}

fn draw_grades(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let grades = &dashboard.analytics.grades;
    let block = titled_block("Grade Distribution", Color::Cyan);

    if grades.is_empty() {
        let paragraph = Paragraph::new("No completed climbs yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let data: Vec<(&str, u64)> = grades
        .iter()
        .map(|g| (g.grade.label(), g.count as u64))
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(chart, area);
}

fn draw_breakdown(f: &mut Frame, title: &str, rows: &[CategoryCount], area: Rect) {
    let max = rows.iter().map(|r| r.count).max().unwrap_or(0);

    let mut items: Vec<ListItem> = rows
        .iter()
        .map(|r| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<13}", truncate(&r.label, 12)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(bar(r.count, max, 10), Style::default().fg(Color::Green)),
                Span::styled(
                    format!(" {:>3}%", r.percentage),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();

    if items.is_empty() {
        items.push(ListItem::new(Span::styled(
            "Nothing tagged yet",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let list = List::new(items).block(titled_block(title, Color::Green));
    f.render_widget(list, area);
}

fn draw_trend(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let trend = dashboard.analytics.monthly.trend();
    let max = trend.iter().map(|m| m.total).max().unwrap_or(0);

    let mut items: Vec<ListItem> = vec![ListItem::new(Line::from(Span::styled(
        format!("{:<9}{:<22}{:>6}{:>6}{:>7}", "Month", "", "Total", "Sent", "Flash"),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )))];

    items.extend(trend.iter().map(|m| {
        ListItem::new(Line::from(vec![
            Span::styled(format!("{:<9}", m.month.to_string()), Style::default().fg(Color::White)),
            Span::styled(bar(m.total, max, 20), Style::default().fg(Color::Magenta)),
            Span::raw("  "),
            Span::styled(format!("{:>6}", m.total), Style::default().fg(Color::White)),
            Span::styled(format!("{:>6}", m.completed), Style::default().fg(Color::Green)),
            Span::styled(format!("{:>7}", m.flashed), Style::default().fg(Color::Yellow)),
        ]))
    }));

    if trend.is_empty() {
        items.push(ListItem::new(Span::styled(
            "Log climbs to see monthly progress",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let list = List::new(items).block(titled_block("Monthly Progress", Color::Magenta));
    f.render_widget(list, area);
}
