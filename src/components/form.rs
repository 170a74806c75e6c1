//! Reusable form field widgets composed into wizard steps.
//!
//! Steps share behavior by embedding these fields, not by subclassing a
//! base view-model: each step owns a [`Form`] and derives its
//! satisfaction predicate from the field values.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

/// One option in a chooser field
#[derive(Debug, Clone)]
pub struct ChooserItem {
    pub label: String,
    pub detail: String,
    /// Disabled items render dimmed and cannot be selected
    pub enabled: bool,
}

impl ChooserItem {
    pub fn new(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A single input widget
pub enum FormField {
    /// Free text input
    TextInput {
        value: String,
        cursor_pos: usize,
        placeholder: String,
        max_length: Option<usize>,
    },
    /// Digits only, fixed maximum length (ZIP, PIN, card fields)
    DigitInput {
        value: String,
        max_len: usize,
        /// Render as `••••` (PIN, CVV)
        masked: bool,
    },
    /// Pick one of several options
    Chooser {
        items: Vec<ChooserItem>,
        selected: usize,
        list_state: ListState,
    },
    /// Boolean toggle
    Toggle {
        value: bool,
        true_label: String,
        false_label: String,
    },
}

impl FormField {
    pub fn text(placeholder: impl Into<String>) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor_pos: 0,
            placeholder: placeholder.into(),
            max_length: None,
        }
    }

    pub fn text_with_max(placeholder: impl Into<String>, max_length: usize) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor_pos: 0,
            placeholder: placeholder.into(),
            max_length: Some(max_length),
        }
    }

    pub fn digits(max_len: usize) -> Self {
        FormField::DigitInput {
            value: String::new(),
            max_len,
            masked: false,
        }
    }

    pub fn masked_digits(max_len: usize) -> Self {
        FormField::DigitInput {
            value: String::new(),
            max_len,
            masked: true,
        }
    }

    pub fn chooser(items: Vec<ChooserItem>) -> Self {
        let selected = items.iter().position(|i| i.enabled).unwrap_or(0);
        let mut list_state = ListState::default();
        list_state.select(Some(selected));
        FormField::Chooser {
            items,
            selected,
            list_state,
        }
    }

    pub fn toggle(true_label: impl Into<String>, false_label: impl Into<String>) -> Self {
        FormField::Toggle {
            value: false,
            true_label: true_label.into(),
            false_label: false_label.into(),
        }
    }

    /// Current value as a string (chooser yields the selected label)
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::DigitInput { value, .. } => value.clone(),
            FormField::Chooser {
                items, selected, ..
            } => items.get(*selected).map(|i| i.label.clone()).unwrap_or_default(),
            FormField::Toggle { value, .. } => value.to_string(),
        }
    }

    pub fn set_text(&mut self, new_value: &str) {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => {
                *value = new_value.to_string();
                *cursor_pos = value.len();
            }
            FormField::DigitInput { value, max_len, .. } => {
                *value = new_value
                    .chars()
                    .filter(char::is_ascii_digit)
                    .take(*max_len)
                    .collect();
            }
            FormField::Chooser {
                items,
                selected,
                list_state,
            } => {
                if let Some(idx) = items.iter().position(|i| i.label == new_value) {
                    *selected = idx;
                    list_state.select(Some(idx));
                }
            }
            FormField::Toggle { value, .. } => {
                *value = new_value == "true";
            }
        }
    }

    /// Selected index of a chooser field
    pub fn selected_index(&self) -> Option<usize> {
        match self {
            FormField::Chooser { selected, .. } => Some(*selected),
            _ => None,
        }
    }

    /// Select a chooser index, skipping forward past disabled items
    pub fn select_index(&mut self, index: usize) {
        if let FormField::Chooser {
            items,
            selected,
            list_state,
        } = self
        {
            let mut idx = index.min(items.len().saturating_sub(1));
            while idx < items.len() && !items[idx].enabled {
                idx += 1;
            }
            if idx < items.len() {
                *selected = idx;
                list_state.select(Some(idx));
            }
        }
    }

    /// Toggle state, if this is a toggle field
    pub fn is_on(&self) -> bool {
        matches!(self, FormField::Toggle { value: true, .. })
    }

    /// Handle a key event; returns true if consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                max_length,
                ..
            } => match key {
                KeyCode::Char(c) => {
                    if max_length.map(|m| value.len() < m).unwrap_or(true) {
                        value.insert(*cursor_pos, c);
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Backspace => {
                    if *cursor_pos > 0 {
                        *cursor_pos -= 1;
                        value.remove(*cursor_pos);
                    }
                    true
                }
                KeyCode::Left => {
                    if *cursor_pos > 0 {
                        *cursor_pos -= 1;
                    }
                    true
                }
                KeyCode::Right => {
                    if *cursor_pos < value.len() {
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Home => {
                    *cursor_pos = 0;
                    true
                }
                KeyCode::End => {
                    *cursor_pos = value.len();
                    true
                }
                _ => false,
            },
            FormField::DigitInput { value, max_len, .. } => match key {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if value.len() < *max_len {
                        value.push(c);
                    }
                    true
                }
                KeyCode::Backspace => {
                    value.pop();
                    true
                }
                _ => false,
            },
            FormField::Chooser {
                items,
                selected,
                list_state,
            } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    let mut idx = *selected;
                    while idx > 0 {
                        idx -= 1;
                        if items[idx].enabled {
                            *selected = idx;
                            list_state.select(Some(idx));
                            break;
                        }
                    }
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let mut idx = *selected;
                    while idx + 1 < items.len() {
                        idx += 1;
                        if items[idx].enabled {
                            *selected = idx;
                            list_state.select(Some(idx));
                            break;
                        }
                    }
                    true
                }
                _ => false,
            },
            FormField::Toggle { value, .. } => match key {
                KeyCode::Char(' ') => {
                    *value = !*value;
                    true
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    *value = false;
                    true
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    *value = true;
                    true
                }
                _ => false,
            },
        }
    }

    /// Rows needed to render this field
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextInput { .. } => 1,
            FormField::DigitInput { .. } => 1,
            FormField::Chooser { items, .. } => (items.len() as u16).min(6),
            FormField::Toggle { .. } => 1,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
                ..
            } => {
                let line = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    let mut text = value.clone();
                    if focused {
                        if *cursor_pos < text.len() {
                            text.insert(*cursor_pos, '|');
                        } else {
                            text.push('|');
                        }
                    }
                    Line::from(text)
                };
                let style = Style::default().fg(if focused { Color::White } else { Color::Gray });
                frame.render_widget(Paragraph::new(line).style(style), area);
            }
            FormField::DigitInput {
                value,
                max_len,
                masked,
            } => {
                let shown: String = if *masked {
                    "•".repeat(value.len())
                } else {
                    value.clone()
                };
                let remaining = "_".repeat(max_len.saturating_sub(value.len()));
                let line = Line::from(vec![
                    Span::raw(shown),
                    Span::styled(remaining, Style::default().fg(Color::DarkGray)),
                ]);
                let style = Style::default().fg(if focused { Color::White } else { Color::Gray });
                frame.render_widget(Paragraph::new(line).style(style), area);
            }
            FormField::Chooser {
                items, list_state, ..
            } => {
                let rows: Vec<ListItem> = items
                    .iter()
                    .map(|item| {
                        let style = if item.enabled {
                            Style::default()
                        } else {
                            Style::default().fg(Color::DarkGray)
                        };
                        ListItem::new(Line::from(vec![
                            Span::styled(item.label.clone(), style),
                            Span::styled(
                                format!("  {}", item.detail),
                                Style::default().fg(Color::DarkGray),
                            ),
                        ]))
                    })
                    .collect();
                let list = List::new(rows)
                    .highlight_style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol("> ");
                frame.render_stateful_widget(list, area, list_state);
            }
            FormField::Toggle {
                value,
                true_label,
                false_label,
            } => {
                let on_style = if *value {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let off_style = if *value {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                };
                let line = Line::from(vec![
                    Span::styled(format!("[{true_label}]"), on_style),
                    Span::raw(" / "),
                    Span::styled(format!("[{false_label}]"), off_style),
                ]);
                frame.render_widget(Paragraph::new(line), area);
            }
        }
    }
}

/// An ordered set of labeled fields with one focused at a time
pub struct Form {
    entries: Vec<(String, FormField)>,
    focused: usize,
}

impl Form {
    pub fn new(entries: Vec<(&str, FormField)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, field)| (label.to_string(), field))
                .collect(),
            focused: 0,
        }
    }

    pub fn field(&self, label: &str) -> Option<&FormField> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, f)| f)
    }

    pub fn field_mut(&mut self, label: &str) -> Option<&mut FormField> {
        self.entries
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, f)| f)
    }

    /// Value of a named field
    pub fn value(&self, label: &str) -> String {
        self.field(label).map(FormField::value).unwrap_or_default()
    }

    pub fn focused_label(&self) -> Option<&str> {
        self.entries.get(self.focused).map(|(l, _)| l.as_str())
    }

    pub fn next_field(&mut self) {
        if self.focused + 1 < self.entries.len() {
            self.focused += 1;
        }
    }

    pub fn prev_field(&mut self) {
        if self.focused > 0 {
            self.focused -= 1;
        }
    }

    /// Route a key to the focused field
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.entries.get_mut(self.focused) {
            Some((_, field)) => field.handle_key(key),
            None => false,
        }
    }

    /// Total rows needed: label + widget per field, one blank between
    pub fn render_height(&self) -> u16 {
        self.entries
            .iter()
            .map(|(_, f)| f.render_height() + 2)
            .sum()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut y = area.y;
        for (i, (label, field)) in self.entries.iter_mut().enumerate() {
            if y >= area.bottom() {
                break;
            }
            let focused = i == self.focused;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let label_area = Rect::new(area.x, y, area.width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(label.clone(), label_style)),
                label_area,
            );
            y += 1;

            let height = field.render_height().min(area.bottom().saturating_sub(y));
            if height == 0 {
                break;
            }
            let field_area = Rect::new(area.x + 2, y, area.width.saturating_sub(2), height);
            field.render(frame, field_area, focused);
            y += height + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_input_ignores_letters_and_caps_length() {
        let mut field = FormField::digits(5);
        for c in "9a7b2c1d0e4".chars() {
            field.handle_key(KeyCode::Char(c));
        }
        assert_eq!(field.value(), "97210");

        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "9721");
    }

    #[test]
    fn test_chooser_skips_disabled_items() {
        let mut field = FormField::chooser(vec![
            ChooserItem::new("Basic", ""),
            ChooserItem::new("Premium", "").disabled(),
            ChooserItem::new("Premium + Pro", ""),
        ]);
        assert_eq!(field.selected_index(), Some(0));

        field.handle_key(KeyCode::Down);
        assert_eq!(field.selected_index(), Some(2));

        field.handle_key(KeyCode::Up);
        assert_eq!(field.selected_index(), Some(0));
    }

    #[test]
    fn test_select_index_lands_on_enabled_item() {
        let mut field = FormField::chooser(vec![
            ChooserItem::new("Basic", ""),
            ChooserItem::new("Premium + Pro", "").disabled(),
        ]);
        field.select_index(1);
        // The disabled tail leaves the selection where it was
        assert_eq!(field.selected_index(), Some(0));
    }

    #[test]
    fn test_form_focus_navigation_and_values() {
        let mut form = Form::new(vec![
            ("ZIP code", FormField::digits(5)),
            ("Ready", FormField::toggle("Yes", "No")),
        ]);
        assert_eq!(form.focused_label(), Some("ZIP code"));

        form.handle_key(KeyCode::Char('9'));
        form.handle_key(KeyCode::Char('7'));
        form.next_field();
        form.handle_key(KeyCode::Char(' '));

        assert_eq!(form.value("ZIP code"), "97");
        assert!(form.field("Ready").unwrap().is_on());

        form.prev_field();
        assert_eq!(form.focused_label(), Some("ZIP code"));
    }
}
