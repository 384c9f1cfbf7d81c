use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::theme::Theme;

/// One row of a [`SelectableList`].
#[derive(Debug, Clone)]
pub struct Item<T> {
    pub value: T,
    pub label: String,
    pub detail: Option<String>,
    /// Text the filter matches against (label by default).
    pub search_text: String,
    pub disabled: bool,
}

impl<T> Item<T> {
    pub fn new(value: T, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value,
            search_text: label.clone(),
            label,
            detail: None,
            disabled: false,
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    #[cfg(test)]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Cursor-driven list with an optional case-insensitive filter.
///
/// `cursor` indexes the visible (filtered) rows and stays below their count
/// whenever any row is visible.
#[derive(Debug, Clone)]
pub struct SelectableList<T> {
    items: Vec<Item<T>>,
    visible: Vec<usize>,
    cursor: usize,
    filter: String,
}

impl<T> SelectableList<T> {
    pub fn new(items: Vec<Item<T>>) -> Self {
        let mut list = Self {
            visible: (0..items.len()).collect(),
            items,
            cursor: 0,
            filter: String::new(),
        };
        list.skip_disabled_forward();
        list
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn selected_item(&self) -> Option<&Item<T>> {
        self.visible.get(self.cursor).map(|&i| &self.items[i])
    }

    /// Value under the cursor, unless the list is empty or the row is disabled.
    pub fn selected(&self) -> Option<&T> {
        self.selected_item()
            .filter(|item| !item.disabled)
            .map(|item| &item.value)
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &Item<T>> {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.skip_disabled_forward();
    }

    pub fn next(&mut self) {
        self.step(1);
    }

    pub fn prev(&mut self) {
        self.step(self.visible.len().saturating_sub(1));
    }

    /// Move by `offset` (mod len), wrapping and skipping disabled rows.
    /// Stays put when nothing is selectable.
    fn step(&mut self, offset: usize) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let mut candidate = self.cursor;
        for _ in 0..len {
            candidate = (candidate + offset) % len;
            if !self.items[self.visible[candidate]].disabled {
                self.cursor = candidate;
                return;
            }
        }
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.apply_filter();
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.apply_filter();
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                needle.is_empty() || item.search_text.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();
        self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
        if self
            .selected_item()
            .is_some_and(|item| item.disabled)
        {
            self.skip_disabled_forward();
        }
    }

    fn skip_disabled_forward(&mut self) {
        if self.selected_item().is_some_and(|item| item.disabled) {
            self.step(1);
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, theme: &Theme) {
        let rows: Vec<ListItem> = self
            .visible_items()
            .map(|item| {
                let label_style = if item.disabled {
                    theme.dim_style()
                } else {
                    Style::default().fg(theme.text)
                };
                let mut spans = vec![Span::styled(item.label.clone(), label_style)];
                if let Some(detail) = &item.detail {
                    spans.push(Span::styled(format!("  {detail}"), theme.dim_style()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let mut title = format!(" {title} ");
        if !self.filter.is_empty() {
            title.push_str(&format!("[filter: {}] ", self.filter));
        }
        let list = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(Span::styled(
                        title,
                        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                    )),
            )
            .highlight_style(theme.highlight_style())
            .highlight_symbol("\u{25B6} ");

        let mut state = ListState::default();
        if !self.is_empty() {
            state.select(Some(self.cursor));
        }
        f.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(labels: &[&str]) -> SelectableList<usize> {
        SelectableList::new(
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| Item::new(i, *l))
                .collect(),
        )
    }

    #[test]
    fn cursor_wraps() {
        let mut l = list(&["a", "b", "c"]);
        l.prev();
        assert_eq!(l.cursor, 2);
        l.next();
        assert_eq!(l.cursor, 0);
    }

    #[test]
    fn cursor_stays_in_bounds_for_any_sequence() {
        let mut l = list(&["a", "b", "c", "d"]);
        // Deterministic pseudo-random walk.
        let mut state = 17u32;
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if state & 0x100 == 0 {
                l.next();
            } else {
                l.prev();
            }
            assert!(l.cursor < l.len());
        }
    }

    #[test]
    fn empty_list_is_a_no_op() {
        let mut l = list(&[]);
        l.next();
        l.prev();
        assert_eq!(l.cursor, 0);
        assert!(l.selected().is_none());
    }

    #[test]
    fn disabled_rows_are_skipped() {
        let mut l = SelectableList::new(vec![
            Item::new(0, "a").disabled(true),
            Item::new(1, "b"),
            Item::new(2, "c").disabled(true),
        ]);
        assert_eq!(l.selected(), Some(&1));
        l.next();
        assert_eq!(l.selected(), Some(&1));
        l.prev();
        assert_eq!(l.selected(), Some(&1));
    }

    #[test]
    fn all_disabled_keeps_cursor_put() {
        let mut l = SelectableList::new(vec![
            Item::new(0, "a").disabled(true),
            Item::new(1, "b").disabled(true),
        ]);
        l.next();
        assert_eq!(l.cursor, 0);
        assert!(l.selected().is_none());
    }

    #[test]
    fn filter_is_case_insensitive_and_clamps_cursor() {
        let mut l = list(&["Rust ownership", "Python", "rust reference"]);
        l.next();
        l.next();
        l.set_filter("PYTH");
        assert_eq!(l.len(), 1);
        assert_eq!(l.cursor, 0);
        assert_eq!(l.selected(), Some(&1));

        l.set_filter("zzz");
        assert!(l.is_empty());
        assert!(l.selected().is_none());

        l.set_filter("");
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn typing_refilters_every_keystroke() {
        let mut l = list(&["alpha", "beta", "alphabet"]);
        l.push_filter('a');
        assert_eq!(l.len(), 3);
        l.push_filter('l');
        assert_eq!(l.len(), 2);
        l.pop_filter();
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn filter_matches_search_text() {
        let mut l = SelectableList::new(vec![
            Item::new(0, "[note] A").search_text("A about borrowing"),
            Item::new(1, "[link] B"),
        ]);
        l.set_filter("borrow");
        assert_eq!(l.selected(), Some(&0));
    }
}
