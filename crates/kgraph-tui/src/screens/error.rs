use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::{Hint, Screen, ScreenKind, Transition, hint};
use crate::theme::Theme;
use crate::tui_event::Event;
use crate::view::centered_rect;

pub struct ErrorScreen {
    message: String,
}

impl ErrorScreen {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl Screen for ErrorScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Error
    }

    fn handle(&mut self, event: Event) -> Transition {
        match event {
            Event::Key(_) => Transition::main_menu(),
            _ => Transition::stay(),
        }
    }

    fn view(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let popup = centered_rect(area.width.min(60), 7, area);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", self.message), theme.error_style())),
            Line::from(""),
            Line::from(Span::styled("  Press any key to return to the menu", theme.dim_style())),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.error_style())
                .title(" Error "),
        );
        f.render_widget(Clear, popup);
        f.render_widget(paragraph, popup);
    }

    fn hints(&self) -> Vec<Hint> {
        vec![hint("any key", "menu")]
    }
}
