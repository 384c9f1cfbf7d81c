use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use kgraph_core::RecordId;

use super::{Destination, Hint, Screen, ScreenKind, TagSource, Transition, hint, unexpected};
use crate::theme::Theme;
use crate::tui_event::{Command, CommandPayload, CommandRequest, CommandTag, Event, Key};
use crate::view::spinner_line;

/// Fetches one record on entry, then opens it in the viewer.
pub struct LoadingScreen {
    tags: TagSource,
    message: String,
    record_id: RecordId,
    pending: Option<CommandTag>,
    tick: usize,
}

impl LoadingScreen {
    pub fn new(tags: TagSource, message: String, record_id: RecordId) -> Self {
        Self {
            tags,
            message,
            record_id,
            pending: None,
            tick: 0,
        }
    }
}

impl Screen for LoadingScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Loading
    }

    fn enter(&mut self) -> Vec<Command> {
        let command = self
            .tags
            .command(CommandRequest::GetRecord(self.record_id.clone()));
        self.pending = Some(command.tag);
        vec![command]
    }

    fn handle(&mut self, event: Event) -> Transition {
        match event {
            Event::Key(Key::Esc) => Transition::main_menu(),
            Event::Tick => {
                self.tick = self.tick.wrapping_add(1);
                Transition::stay()
            }
            Event::CommandCompleted(completion) if self.pending == Some(completion.tag) => {
                self.pending = None;
                match completion.outcome {
                    Ok(CommandPayload::Fetched(record)) => {
                        Transition::navigate(Destination::RecordViewer { record })
                    }
                    Ok(_) => unexpected(self.kind(), "non-record payload"),
                    Err(e) => Transition::navigate(Destination::Error {
                        message: e.to_string(),
                    }),
                }
            }
            _ => Transition::stay(),
        }
    }

    fn view(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let lines = vec![Line::from(""), spinner_line(self.tick, &self.message, theme)];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn hints(&self) -> Vec<Hint> {
        vec![hint("Esc", "menu")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::Next;
    use crate::screens::testing::{complete, note, render, tags};
    use kgraph_core::ServiceError;

    fn screen() -> LoadingScreen {
        LoadingScreen::new(tags(), "Loading record...".into(), RecordId::new("rec-003"))
    }

    #[test]
    fn enter_fetches_the_record() {
        let mut screen = screen();
        let commands = screen.enter();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].request,
            CommandRequest::GetRecord(RecordId::new("rec-003"))
        );
        assert!(render(&screen).contains("Loading record..."));
    }

    #[test]
    fn found_record_opens_viewer() {
        let mut screen = screen();
        let command = screen.enter().remove(0);
        let record = note("rec-003", "found");
        let t = complete(&mut screen, &command, Ok(CommandPayload::Fetched(record.clone())));
        assert_eq!(t.next, Next::Navigate(Destination::RecordViewer { record }));
    }

    #[test]
    fn not_found_opens_error() {
        let mut screen = screen();
        let command = screen.enter().remove(0);
        let t = complete(
            &mut screen,
            &command,
            Err(ServiceError::NotFound {
                id: RecordId::new("rec-003"),
            }),
        );
        assert_eq!(
            t.next,
            Next::Navigate(Destination::Error {
                message: "record not found: rec-003".into()
            })
        );
    }
}
