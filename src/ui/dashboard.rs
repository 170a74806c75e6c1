//! Dashboard screen: place header, subsystem status cards, device list

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::state::AppState;
use crate::subsystems::SubsystemKind;

use super::panels::{render_card, render_hints, CardTone};

pub struct Dashboard {
    device_state: ListState,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        let mut device_state = ListState::default();
        device_state.select(Some(0));
        Self { device_state }
    }

    pub fn select_next_device(&mut self, device_count: usize) {
        if device_count == 0 {
            return;
        }
        let i = self
            .device_state
            .selected()
            .map_or(0, |i| (i + 1) % device_count);
        self.device_state.select(Some(i));
    }

    pub fn select_prev_device(&mut self, device_count: usize) {
        if device_count == 0 {
            return;
        }
        let i = self
            .device_state
            .selected()
            .map_or(0, |i| if i == 0 { device_count - 1 } else { i - 1 });
        self.device_state.select(Some(i));
    }

    pub fn render(&mut self, frame: &mut Frame, state: &AppState, status: Option<&str>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),  // header
                Constraint::Length(8),  // subsystem cards (2 rows)
                Constraint::Min(4),     // devices
                Constraint::Length(1),  // status/hints
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], state);
        self.render_cards(frame, chunks[1], state);
        self.render_devices(frame, chunks[2], state);
        match status {
            Some(status) => frame.render_widget(
                Paragraph::new(Span::styled(
                    status.to_string(),
                    Style::default().fg(Color::Yellow),
                )),
                chunks[3],
            ),
            None => render_hints(
                frame,
                chunks[3],
                "j/k devices • p switch place • s signup • r refresh • q quit",
            ),
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let place = state
            .active_place()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "No active place".to_string());
        let mut spans = vec![
            Span::styled(place, Style::default().add_modifier(Modifier::BOLD)),
        ];
        if let Some(refreshed) = state.devices_refreshed_at() {
            spans.push(Span::styled(
                format!("  refreshed {}", refreshed.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(4)])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[1]);

        let subsystems = state.subsystems();
        let cards: [(SubsystemKind, String, CardTone); 6] = [
            {
                let alarm = subsystems.alarm();
                let tone = if !alarm.available {
                    CardTone::Unavailable
                } else if alarm.is_alerting() {
                    CardTone::Alert
                } else {
                    CardTone::Ok
                };
                (SubsystemKind::Alarm, alarm.status_line(), tone)
            },
            {
                let climate = subsystems.climate();
                let tone = if climate.available {
                    CardTone::Ok
                } else {
                    CardTone::Unavailable
                };
                (SubsystemKind::Climate, climate.status_line(), tone)
            },
            {
                let cameras = subsystems.cameras();
                let tone = if !cameras.available {
                    CardTone::Unavailable
                } else if cameras.offline > 0 {
                    CardTone::Warn
                } else {
                    CardTone::Ok
                };
                (SubsystemKind::Cameras, cameras.status_line(), tone)
            },
            {
                let care = subsystems.care();
                let tone = if !care.available {
                    CardTone::Unavailable
                } else if care.triggered {
                    CardTone::Alert
                } else {
                    CardTone::Ok
                };
                (SubsystemKind::Care, care.status_line(), tone)
            },
            {
                let water = subsystems.water();
                let tone = if !water.available {
                    CardTone::Unavailable
                } else if water.continuous_use {
                    CardTone::Warn
                } else {
                    CardTone::Ok
                };
                (SubsystemKind::Water, water.status_line(), tone)
            },
            {
                let weather = subsystems.weather();
                let tone = if !weather.available {
                    CardTone::Unavailable
                } else if weather.is_alerting() {
                    CardTone::Alert
                } else {
                    CardTone::Ok
                };
                (SubsystemKind::Weather, weather.status_line(), tone)
            },
        ];

        for (i, (kind, status, tone)) in cards.iter().enumerate() {
            let slot = if i < 3 { top[i] } else { bottom[i - 3] };
            render_card(frame, slot, kind.label(), status, *tone);
        }
    }

    fn render_devices(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let items: Vec<ListItem> = state
            .devices()
            .iter()
            .map(|device| {
                let (glyph, style) = if device.online {
                    ("●", Style::default().fg(Color::Green))
                } else {
                    ("○", Style::default().fg(Color::DarkGray))
                };
                let mut spans = vec![
                    Span::styled(format!("{glyph} "), style),
                    Span::raw(device.name.clone()),
                ];
                if let Some(product) = &device.product_name {
                    spans.push(Span::styled(
                        format!("  {product}"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let title = format!(" Devices ({}) ", state.devices().len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut self.device_state);
    }
}
