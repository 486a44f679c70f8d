use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{status_color, titled_block};
use crate::text::truncate;
use crate::models::{Catalogue, Climb};
use crate::tui::Dashboard;

pub fn draw(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(area);

    draw_list(f, dashboard, chunks[0]);
    draw_selected(f, dashboard, chunks[1]);
}

fn draw_list(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let items: Vec<ListItem> = dashboard
        .climbs
        .items
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", c.date.format("%b %d")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<6}", c.grade.as_str()),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<28}", truncate(&c.route_name, 26)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<11}", c.status.label()),
                    Style::default().fg(status_color(c.status)),
                ),
                Span::styled(
                    truncate(dashboard.gym_name(c.gym_id), 20),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let title = format!("Climbs ({})", dashboard.climbs.items.len());
    let block = titled_block(&title, Color::Cyan);

    if items.is_empty() {
        let paragraph = Paragraph::new("No climbs logged yet. Use `boulderlog climb log`.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(dashboard.climbs.selected);

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_selected(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let climb = dashboard
        .climbs
        .selected
        .and_then(|i| dashboard.climbs.items.get(i));

    let text = match climb {
        Some(c) => detail_lines(c),
        None => vec![Line::from("")],
    };

    let paragraph = Paragraph::new(text)
        .block(titled_block("Details", Color::Yellow))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn detail_lines(c: &Climb) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);

    let route_type = c
        .route_type
        .as_ref()
        .map(|r| r.label().to_string())
        .unwrap_or_else(|| "-".to_string());
    let wall = c
        .wall_angle
        .as_ref()
        .map(|w| w.label().to_string())
        .unwrap_or_else(|| "-".to_string());
    let holds = if c.hold_types.is_empty() {
        "-".to_string()
    } else {
        c.hold_types
            .iter()
            .map(|h| h.label().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    vec![
        Line::from(vec![
            Span::styled("Attempts: ", label),
            Span::styled(c.attempts.to_string(), value),
            Span::styled("  Style: ", label),
            Span::styled(route_type, value),
            Span::styled("  Wall: ", label),
            Span::styled(wall, value),
        ]),
        Line::from(vec![
            Span::styled("Holds: ", label),
            Span::styled(holds, value),
        ]),
        Line::from(vec![
            Span::styled("Notes: ", label),
            Span::styled(c.notes.clone().unwrap_or_default(), value),
        ]),
    ]
}
