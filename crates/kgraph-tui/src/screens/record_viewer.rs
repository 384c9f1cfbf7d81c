use ratatui::Frame;
use ratatui::layout::Rect;

use kgraph_core::Record;

use super::{Hint, Screen, ScreenKind, Transition, hint};
use crate::theme::Theme;
use crate::tui_event::{Event, Key};
use crate::widgets::RecordView;

pub struct RecordViewerScreen {
    view: RecordView,
}

impl RecordViewerScreen {
    pub fn new(record: Record) -> Self {
        Self {
            view: RecordView::new(record),
        }
    }
}

impl Screen for RecordViewerScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::RecordViewer
    }

    fn handle(&mut self, event: Event) -> Transition {
        match event {
            Event::Key(Key::Esc | Key::Char('q')) => Transition::main_menu(),
            Event::Key(key) => {
                self.view.handle_key(key);
                Transition::stay()
            }
            _ => Transition::stay(),
        }
    }

    fn view(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        self.view.render(f, area, theme);
    }

    fn hints(&self) -> Vec<Hint> {
        vec![
            hint("\u{2191}\u{2193}/PgUp/PgDn", "scroll"),
            hint("Esc/q", "menu"),
        ]
    }

    fn breadcrumb(&self) -> Vec<String> {
        vec![
            self.kind().title().to_string(),
            self.view.record().display_name(),
        ]
    }
}
