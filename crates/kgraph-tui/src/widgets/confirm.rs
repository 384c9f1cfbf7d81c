use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::tui_event::Key;
use crate::view::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    pub fn is_yes(self) -> bool {
        self == Choice::Yes
    }

    fn toggled(self) -> Self {
        match self {
            Choice::Yes => Choice::No,
            Choice::No => Choice::Yes,
        }
    }
}

/// Yes/No prompt. Highlights Yes initially; once resolved it ignores keys
/// until [`Confirmation::reset`].
#[derive(Debug, Clone)]
pub struct Confirmation {
    prompt: String,
    highlighted: Choice,
    resolved: Option<Choice>,
}

impl Confirmation {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            highlighted: Choice::Yes,
            resolved: None,
        }
    }

    pub fn reset(&mut self) {
        self.highlighted = Choice::Yes;
        self.resolved = None;
    }

    /// Returns the choice on the key that resolves the prompt.
    pub fn handle_key(&mut self, key: Key) -> Option<Choice> {
        if self.resolved.is_some() {
            return None;
        }
        match key {
            Key::Left | Key::Char('h') => self.highlighted = Choice::Yes,
            Key::Right | Key::Char('l') => self.highlighted = Choice::No,
            Key::Tab | Key::BackTab => self.highlighted = self.highlighted.toggled(),
            Key::Enter | Key::Char(' ') => self.resolved = Some(self.highlighted),
            Key::Char('y') | Key::Char('Y') => self.resolved = Some(Choice::Yes),
            Key::Char('n') | Key::Char('N') => self.resolved = Some(Choice::No),
            _ => {}
        }
        self.resolved
    }

    /// Render as a centered dialog inside `area`.
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let width = (self.prompt.chars().count() as u16 + 8).clamp(30, area.width.max(30));
        let popup = centered_rect(width.min(area.width), 7, area);

        let button = |label: &'static str, choice: Choice| {
            let style = if self.highlighted == choice {
                theme.highlight_style().fg(theme.active)
            } else {
                theme.dim_style()
            };
            Span::styled(label, style)
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.prompt.clone(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                button("[ Yes ]", Choice::Yes),
                Span::raw("   "),
                button("[ No ]", Choice::No),
            ]),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.focused_border_style())
                    .title(" Confirm "),
            );

        f.render_widget(Clear, popup);
        f.render_widget(paragraph, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_yes() {
        let mut c = Confirmation::new("Proceed?");
        assert_eq!(c.highlighted, Choice::Yes);
        assert_eq!(c.handle_key(Key::Enter), Some(Choice::Yes));
    }

    #[test]
    fn arrows_and_tab_move_highlight() {
        let mut c = Confirmation::new("Proceed?");
        assert_eq!(c.handle_key(Key::Right), None);
        assert_eq!(c.highlighted, Choice::No);
        c.handle_key(Key::Tab);
        assert_eq!(c.highlighted, Choice::Yes);
        c.handle_key(Key::Char('l'));
        assert_eq!(c.handle_key(Key::Char(' ')), Some(Choice::No));
    }

    #[test]
    fn direct_keys_resolve() {
        let mut c = Confirmation::new("Proceed?");
        assert_eq!(c.handle_key(Key::Char('n')), Some(Choice::No));
        let mut c = Confirmation::new("Proceed?");
        c.handle_key(Key::Right);
        assert_eq!(c.handle_key(Key::Char('y')), Some(Choice::Yes));
    }

    #[test]
    fn resolved_ignores_keys_until_reset() {
        let mut c = Confirmation::new("Proceed?");
        c.handle_key(Key::Char('y'));
        assert_eq!(c.handle_key(Key::Char('n')), None);
        assert_eq!(c.resolved, Some(Choice::Yes));
        c.reset();
        assert_eq!(c.resolved, None);
        assert_eq!(c.handle_key(Key::Char('n')), Some(Choice::No));
    }
}
