//! Shared panel widgets for the dashboard

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Visual urgency of a subsystem card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTone {
    /// Subsystem has no devices behind it
    Unavailable,
    /// Normal operation
    Ok,
    /// Needs attention but not an emergency
    Warn,
    /// Active alarm/alert
    Alert,
}

impl CardTone {
    fn border_style(self) -> Style {
        match self {
            CardTone::Unavailable => Style::default().fg(Color::DarkGray),
            CardTone::Ok => Style::default().fg(Color::Gray),
            CardTone::Warn => Style::default().fg(Color::Yellow),
            CardTone::Alert => Style::default().fg(Color::Red),
        }
    }

    fn text_style(self) -> Style {
        match self {
            CardTone::Unavailable => Style::default().fg(Color::DarkGray),
            CardTone::Ok => Style::default(),
            CardTone::Warn => Style::default().fg(Color::Yellow),
            CardTone::Alert => Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// Render one subsystem card: title border + status line
pub fn render_card(frame: &mut Frame, area: Rect, title: &str, status: &str, tone: CardTone) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(tone.border_style())
        .title(format!(" {title} "));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(status.to_string(), tone.text_style()))),
        inner,
    );
}

/// Centered popup rect sized as a fraction of the surrounding area
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

/// Footer line of key hints
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &str) {
    frame.render_widget(
        Paragraph::new(Span::styled(
            hints.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        area,
    );
}
