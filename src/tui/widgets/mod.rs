pub mod climbs;
pub mod community;
pub mod profile;
pub mod stats;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::ClimbStatus;

pub fn status_color(status: ClimbStatus) -> Color {
    match status {
        ClimbStatus::Flash => Color::Yellow,
        ClimbStatus::Completed => Color::Green,
        ClimbStatus::Attempted => Color::DarkGray,
    }
}

pub fn titled_block(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(color))
}

/// Shown in place of a tab when the store could not be read.
pub fn draw_load_error(f: &mut Frame, message: &str, area: Rect) {
    let text = format!(
        "Could not load climbing data.\n\n{}\n\nDetails are in boulderlog.log beside the database. Press ^r to retry.",
        message
    );
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .block(titled_block("Error", Color::Red))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
