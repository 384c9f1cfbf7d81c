//! Multi-field text form with per-field validation.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::theme::Theme;
use crate::tui_event::Key;
use crate::widgets::text_input::TextInput;

pub const REQUIRED_MESSAGE: &str = "This field is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Required,
    /// Must start with `http://` or `https://`.
    Url,
    MaxLength(usize),
}

impl Validator {
    pub fn check(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        match self {
            Validator::Required if value.is_empty() => Err(REQUIRED_MESSAGE.to_string()),
            Validator::Url if value.is_empty() => Err("URL is required".to_string()),
            Validator::Url if !(value.starts_with("http://") || value.starts_with("https://")) => {
                Err("URL must start with http:// or https://".to_string())
            }
            Validator::MaxLength(max) if value.chars().count() > *max => {
                Err(format!("Must be at most {max} characters"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub input: TextInput,
    pub required: bool,
    pub multiline: bool,
    pub validators: Vec<Validator>,
    pub error: Option<String>,
}

impl Field {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            input: TextInput::new(),
            required: false,
            multiline: false,
            validators: Vec::new(),
            error: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Blank optional fields skip their validators.
    fn check(&self) -> Result<(), String> {
        if self.input.is_blank() {
            return if self.required {
                Err(REQUIRED_MESSAGE.to_string())
            } else {
                Ok(())
            };
        }
        self.validators
            .iter()
            .try_for_each(|v| v.check(self.input.value()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// Still editing (including a submit that failed validation).
    Editing,
    Submitted,
}

#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<Field>,
    focus: usize,
}

impl Form {
    /// A form needs at least one field; an empty list gets a placeholder so
    /// the focus index always points at something.
    pub fn new(mut fields: Vec<Field>) -> Self {
        if fields.is_empty() {
            fields.push(Field::new("Value"));
        }
        Self { fields, focus: 0 }
    }

    #[cfg(test)]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(Field::value).unwrap_or("")
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.error.is_some())
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Validate every field, recording errors. Focus moves to the first
    /// invalid field on failure.
    pub fn submit(&mut self) -> bool {
        for field in &mut self.fields {
            field.error = field.check().err();
        }
        match self.fields.iter().position(|f| f.error.is_some()) {
            Some(first) => {
                self.focus = first;
                false
            }
            None => true,
        }
    }

    pub fn handle_key(&mut self, key: Key) -> FormOutcome {
        let last = self.focus + 1 == self.fields.len();
        let multiline = self.fields[self.focus].multiline;
        match key {
            Key::Tab | Key::Down => self.focus_next(),
            Key::BackTab | Key::Up => self.focus_prev(),
            Key::Ctrl('s') => return self.submit_outcome(),
            Key::Enter if multiline => self.edit(|input| {
                input.insert('\n');
                true
            }),
            Key::Enter if last => return self.submit_outcome(),
            Key::Enter => self.focus_next(),
            other => self.edit(|input| input.handle_key(other)),
        }
        FormOutcome::Editing
    }

    fn submit_outcome(&mut self) -> FormOutcome {
        if self.submit() {
            FormOutcome::Submitted
        } else {
            FormOutcome::Editing
        }
    }

    /// Apply an edit to the focused field; a changed value clears its error.
    fn edit(&mut self, apply: impl FnOnce(&mut TextInput) -> bool) {
        let field = &mut self.fields[self.focus];
        if apply(&mut field.input) {
            field.error = None;
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let constraints: Vec<Constraint> = self
            .fields
            .iter()
            .flat_map(|field| {
                let body = if field.multiline {
                    Constraint::Min(5)
                } else {
                    Constraint::Length(3)
                };
                [body, Constraint::Length(1)]
            })
            .collect();
        let rows = Layout::vertical(constraints).split(area);

        for (i, field) in self.fields.iter().enumerate() {
            let focused = i == self.focus;
            let box_area = rows[i * 2];
            let error_area = rows[i * 2 + 1];

            let mut title = vec![Span::styled(
                format!(" {} ", field.label),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )];
            if field.required {
                title.push(Span::styled("* ", Style::default().fg(theme.warning)));
            }
            let border = if field.error.is_some() {
                Style::default().fg(theme.error)
            } else if focused {
                theme.focused_border_style()
            } else {
                theme.border_style()
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(Line::from(title));

            let text = Paragraph::new(field.value().to_string())
                .style(Style::default().fg(theme.text))
                .block(block);
            let text = if field.multiline {
                text.wrap(Wrap { trim: false })
            } else {
                text
            };
            f.render_widget(text, box_area);

            if let Some(error) = &field.error {
                f.render_widget(
                    Paragraph::new(Span::styled(format!(" {error}"), theme.error_style())),
                    error_area,
                );
            }

            if focused {
                let before = field.input.before_cursor();
                let row = before.matches('\n').count() as u16;
                let col = before
                    .rsplit('\n')
                    .next()
                    .map(|line| line.chars().count())
                    .unwrap_or(0) as u16;
                let x = (box_area.x + 1 + col).min(box_area.right().saturating_sub(2));
                let y = (box_area.y + 1 + row).min(box_area.bottom().saturating_sub(2));
                f.set_cursor_position(Position::new(x, y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.handle_key(Key::Char(c));
        }
    }

    fn link_form() -> Form {
        Form::new(vec![
            Field::new("URL").required().validate(Validator::Url),
            Field::new("Title").validate(Validator::MaxLength(200)),
        ])
    }

    // ── focus ──────────────────────────────────────────────────────

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = link_form();
        form.handle_key(Key::BackTab);
        assert_eq!(form.focus, 1);
        form.handle_key(Key::Tab);
        assert_eq!(form.focus, 0);
        form.handle_key(Key::Down);
        form.handle_key(Key::Down);
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn empty_form_still_has_a_focusable_field() {
        let mut form = Form::new(Vec::new());
        form.handle_key(Key::Tab);
        assert_eq!(form.focus, 0);
        assert_eq!(form.fields().len(), 1);
    }

    // ── validation ─────────────────────────────────────────────────

    #[test]
    fn ftp_url_is_rejected() {
        let mut form = link_form();
        type_text(&mut form, "ftp://x");
        form.handle_key(Key::Enter);
        assert_eq!(form.handle_key(Key::Enter), FormOutcome::Editing);
        assert_eq!(
            form.fields()[0].error.as_deref(),
            Some("URL must start with http:// or https://")
        );
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn optional_blank_field_passes() {
        let mut form = link_form();
        type_text(&mut form, "https://example.com");
        form.handle_key(Key::Enter);
        assert_eq!(form.handle_key(Key::Enter), FormOutcome::Submitted);
        assert!(!form.has_errors());
    }

    #[test]
    fn whitespace_only_required_field_fails() {
        let mut form = Form::new(vec![Field::new("Name").required()]);
        type_text(&mut form, "   ");
        assert_eq!(form.handle_key(Key::Enter), FormOutcome::Editing);
        assert_eq!(form.fields()[0].error.as_deref(), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn max_length_counts_chars() {
        assert!(Validator::MaxLength(3).check("äöü").is_ok());
        assert_eq!(
            Validator::MaxLength(3).check("abcd"),
            Err("Must be at most 3 characters".to_string())
        );
    }

    #[test]
    fn editing_clears_the_field_error() {
        let mut form = Form::new(vec![Field::new("Name").required()]);
        form.handle_key(Key::Enter);
        assert!(form.has_errors());
        form.handle_key(Key::Char('a'));
        assert!(!form.has_errors());
    }

    // ── multiline ──────────────────────────────────────────────────

    #[test]
    fn enter_in_multiline_inserts_newline_and_ctrl_s_submits() {
        let mut form = Form::new(vec![
            Field::new("Title").required(),
            Field::new("Content").required().multiline(),
        ]);
        type_text(&mut form, "T");
        form.handle_key(Key::Enter);
        type_text(&mut form, "line one");
        assert_eq!(form.handle_key(Key::Enter), FormOutcome::Editing);
        type_text(&mut form, "line two");
        assert_eq!(form.value(1), "line one\nline two");
        assert_eq!(form.handle_key(Key::Ctrl('s')), FormOutcome::Submitted);
    }

    #[test]
    fn failed_submit_focuses_first_invalid_field() {
        let mut form = Form::new(vec![
            Field::new("Front").required(),
            Field::new("Back").required(),
        ]);
        form.handle_key(Key::Tab);
        type_text(&mut form, "A");
        assert_eq!(form.handle_key(Key::Ctrl('s')), FormOutcome::Editing);
        assert_eq!(form.focus, 0);
        assert!(form.fields()[1].error.is_none());
    }
}
