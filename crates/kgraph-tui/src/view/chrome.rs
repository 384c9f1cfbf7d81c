//! Header bar and key-hint footer around the active screen.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::screens::Hint;
use crate::theme::Theme;

pub fn render_header(f: &mut Frame, area: Rect, path: &[String], theme: &Theme) {
    let mut spans = vec![Span::styled(" KGRAPH ", theme.header_style())];
    for (i, part) in path.iter().enumerate() {
        spans.push(Span::styled(" > ", theme.dim_style()));
        let style = if i + 1 == path.len() {
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        spans.push(Span::styled(part.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_footer(f: &mut Frame, area: Rect, hints: &[Hint], theme: &Theme) {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for h in hints {
        spans.push(Span::styled(
            format!(" {}", h.key),
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!(":{} ", h.action), theme.footer_style()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
