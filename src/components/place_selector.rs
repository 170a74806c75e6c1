//! Place selector: the popup list for switching the active place

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

use crate::services::PlaceDescriptor;

/// Available places, kept sorted case-insensitively by name
pub struct PlaceSelector {
    places: Vec<PlaceDescriptor>,
    list_state: ListState,
}

impl Default for PlaceSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceSelector {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            places: Vec::new(),
            list_state,
        }
    }

    /// Replace the list; ordering is case-insensitive by place name
    pub fn set_places(&mut self, mut places: Vec<PlaceDescriptor>) {
        places.sort_by_key(|p| p.name.to_lowercase());
        self.places = places;
        self.list_state.select(Some(0));
    }

    pub fn places(&self) -> &[PlaceDescriptor] {
        &self.places
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn selected_place(&self) -> Option<&PlaceDescriptor> {
        self.list_state.selected().and_then(|i| self.places.get(i))
    }

    /// Move the selection onto a place id, if present
    pub fn select_place(&mut self, place_id: &str) {
        if let Some(idx) = self.places.iter().position(|p| p.place_id == place_id) {
            self.list_state.select(Some(idx));
        }
    }

    pub fn select_next(&mut self) {
        let len = self.places.len();
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % len);
        self.list_state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        let len = self.places.len();
        if len == 0 {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.list_state.select(Some(i));
    }

    /// Render as a centered popup
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let items: Vec<ListItem> = self
            .places
            .iter()
            .map(|place| {
                let mut spans = vec![Span::raw(place.name.clone())];
                if let Some(city) = &place.city {
                    spans.push(Span::styled(
                        format!("  {city}"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                if place.role == "OWNER" {
                    spans.push(Span::styled(
                        "  (owner)",
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Switch place "),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, name: &str) -> PlaceDescriptor {
        PlaceDescriptor {
            place_id: id.to_string(),
            name: name.to_string(),
            role: "OWNER".to_string(),
            city: None,
        }
    }

    #[test]
    fn test_places_sorted_case_insensitively() {
        let mut selector = PlaceSelector::new();
        selector.set_places(vec![
            place("p-1", "Main house"),
            place("p-2", "downstairs"),
            place("p-3", "Cabin"),
        ]);

        let names: Vec<&str> = selector.places().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cabin", "downstairs", "Main house"]);
        assert_eq!(selector.places()[1].name, "downstairs");
    }

    #[test]
    fn test_selection_wraps() {
        let mut selector = PlaceSelector::new();
        selector.set_places(vec![place("p-1", "A"), place("p-2", "B")]);

        selector.select_next();
        assert_eq!(selector.selected_place().unwrap().name, "B");
        selector.select_next();
        assert_eq!(selector.selected_place().unwrap().name, "A");
        selector.select_prev();
        assert_eq!(selector.selected_place().unwrap().name, "B");
    }

    #[test]
    fn test_select_place_by_id() {
        let mut selector = PlaceSelector::new();
        selector.set_places(vec![place("p-1", "A"), place("p-2", "B")]);
        selector.select_place("p-2");
        assert_eq!(selector.selected_place().unwrap().place_id, "p-2");
    }
}
