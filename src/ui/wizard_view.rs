//! Wizard screen: renders the controller's current step.
//!
//! The view owns nothing: breadcrumbs come from the controller's
//! overview, the form and error text come from the step itself.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::wizard::{StageStatus, WizardController};

use super::panels::render_hints;

/// Render the signup wizard. `status` is a transient message from the
/// app (e.g. the unsatisfied hint after a refused `next()`).
pub fn render(frame: &mut Frame, controller: &mut WizardController, status: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(2), // breadcrumbs
            Constraint::Length(5), // body
            Constraint::Min(6),    // form
            Constraint::Length(2), // error/status
            Constraint::Length(1), // hints
        ])
        .split(frame.area());

    if controller.is_complete() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "All set! Your home is ready.",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            chunks[0],
        );
        render_hints(frame, chunks[5], "Enter return to dashboard");
        return;
    }

    let title = controller
        .current()
        .map(|step| step.stage().title())
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("Sign up — {title}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    // Breadcrumbs: one glyph per stage in registry order
    let crumbs: Vec<Span> = controller
        .overview()
        .into_iter()
        .map(|(stage, state)| match state {
            StageStatus::Current => Span::styled(
                format!("▶ {} ", stage.title()),
                Style::default().fg(Color::Cyan),
            ),
            StageStatus::Done => Span::styled("● ", Style::default().fg(Color::Green)),
            StageStatus::Bypassed => Span::styled("◌ ", Style::default().fg(Color::DarkGray)),
            StageStatus::Pending => Span::styled("○ ", Style::default().fg(Color::Gray)),
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(crumbs)), chunks[1]);

    let (body, error) = match controller.current() {
        Some(step) => (step.body(), step.form_error().map(String::from)),
        None => (Vec::new(), None),
    };
    let body_lines: Vec<Line> = body.into_iter().map(Line::from).collect();
    frame.render_widget(Paragraph::new(body_lines), chunks[2]);

    if let Some(step) = controller.current_mut() {
        if let Some(form) = step.form_mut() {
            form.render(frame, chunks[3]);
        }
    }

    let footer = if let Some(error) = error {
        Line::from(Span::styled(error, Style::default().fg(Color::Red)))
    } else if let Some(status) = status {
        Line::from(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(footer), chunks[4]);

    render_hints(
        frame,
        chunks[5],
        "Enter continue • Esc back • Tab/Shift-Tab fields • arrows edit",
    );
}
