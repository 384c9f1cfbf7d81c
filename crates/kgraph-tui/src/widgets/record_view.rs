use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use kgraph_core::{Payload, Record};

use crate::theme::Theme;
use crate::tui_event::Key;
use crate::view::{labeled_line, section_header};

const PAGE: u16 = 10;

/// Scrollable read-only rendering of one record.
#[derive(Debug, Clone)]
pub struct RecordView {
    record: Record,
    scroll: u16,
}

impl RecordView {
    pub fn new(record: Record) -> Self {
        Self { record, scroll: 0 }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Scroll keys. Returns `false` for anything else.
    pub fn handle_key(&mut self, key: Key) -> bool {
        let max = self.line_count().saturating_sub(1);
        self.scroll = match key {
            Key::Up | Key::Char('k') => self.scroll.saturating_sub(1),
            Key::Down | Key::Char('j') => self.scroll.saturating_add(1),
            Key::PageUp => self.scroll.saturating_sub(PAGE),
            Key::PageDown => self.scroll.saturating_add(PAGE),
            Key::Home | Key::Char('g') => 0,
            Key::End | Key::Char('G') => max,
            _ => return false,
        }
        .min(max);
        true
    }

    fn line_count(&self) -> u16 {
        // Theme only affects styling, not the number of lines.
        self.lines(&Theme::hacker()).len() as u16
    }

    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let r = &self.record;
        let mut lines = vec![
            section_header("Basic Information", theme),
            labeled_line("ID", r.id.to_string(), theme),
            Line::from(vec![
                Span::styled(format!("  {:<12}", "Type"), theme.dim_style()),
                Span::styled(
                    r.kind().label(),
                    Style::default()
                        .fg(theme.kind_color(r.kind()))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            labeled_line("Title", r.title.clone(), theme),
            labeled_line("Visibility", r.visibility.label(), theme),
            labeled_line(
                "Created",
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
                theme,
            ),
            labeled_line(
                "Updated",
                r.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                theme,
            ),
            Line::from(""),
            section_header(&format!("{} Data", r.kind().label()), theme),
        ];

        match &r.payload {
            Payload::Note { content } => {
                lines.extend(content.lines().map(|l| Line::from(format!("  {l}"))));
            }
            Payload::Link { url } => lines.push(labeled_line("URL", url.clone(), theme)),
            Payload::Tag { name } => lines.push(labeled_line("Name", name.clone(), theme)),
            Payload::Flashcard { front, back } => {
                lines.push(labeled_line("Front", front.clone(), theme));
                lines.push(labeled_line("Back", back.clone(), theme));
            }
        }

        lines.push(Line::from(""));
        lines.push(section_header("Raw JSON", theme));
        lines.extend(
            r.to_json_pretty()
                .lines()
                .map(|l| Line::from(Span::styled(format!("  {l}"), theme.dim_style()))),
        );
        lines
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let paragraph = Paragraph::new(self.lines(theme))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(format!(" {} ", self.record.display_name())),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(paragraph, area);
    }
}
