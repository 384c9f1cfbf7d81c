//! Screen state machines.
//!
//! Each screen owns a workflow step enum whose variants carry the data valid
//! in that step. The router talks to screens only through [`Screen`].

mod create_record;
mod error;
mod generate;
mod loading;
mod main_menu;
mod publish;
mod record_viewer;
mod review;
mod search;

pub use create_record::CreateRecordScreen;
pub use error::ErrorScreen;
pub use generate::GenerateScreen;
pub use loading::LoadingScreen;
pub use main_menu::MainMenuScreen;
pub use publish::PublishScreen;
pub use record_viewer::RecordViewerScreen;
pub use review::ReviewScreen;
pub use search::SearchScreen;

use ratatui::Frame;
use ratatui::layout::Rect;

use kgraph_core::{Flashcard, Record, RecordId};

use crate::theme::Theme;
use crate::tui_event::{Command, CommandRequest, CommandTag, Event, ScreenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    MainMenu,
    CreateRecord,
    Search,
    GenerateFlashcards,
    FlashcardReview,
    PublishSite,
    RecordViewer,
    Loading,
    Error,
}

impl ScreenKind {
    pub fn title(self) -> &'static str {
        match self {
            ScreenKind::MainMenu => "Main Menu",
            ScreenKind::CreateRecord => "Create Record",
            ScreenKind::Search => "Search Records",
            ScreenKind::GenerateFlashcards => "Generate Flashcards",
            ScreenKind::FlashcardReview => "Review Flashcards",
            ScreenKind::PublishSite => "Publish Site",
            ScreenKind::RecordViewer => "Record Viewer",
            ScreenKind::Loading => "Loading",
            ScreenKind::Error => "Error",
        }
    }
}

/// Where a navigation goes, with the data the target needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    MainMenu,
    CreateRecord,
    Search,
    GenerateFlashcards,
    PublishSite,
    FlashcardReview { cards: Vec<Flashcard> },
    RecordViewer { record: Record },
    Loading { message: String, record_id: RecordId },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Next {
    Stay,
    Navigate(Destination),
    Quit,
}

/// Result of handling one event: what happens next plus any commands to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: Next,
    pub commands: Vec<Command>,
}

impl Transition {
    pub fn stay() -> Self {
        Self {
            next: Next::Stay,
            commands: Vec::new(),
        }
    }

    pub fn navigate(destination: Destination) -> Self {
        Self {
            next: Next::Navigate(destination),
            commands: Vec::new(),
        }
    }

    pub fn main_menu() -> Self {
        Self::navigate(Destination::MainMenu)
    }

    pub fn quit() -> Self {
        Self {
            next: Next::Quit,
            commands: Vec::new(),
        }
    }

    pub fn issue(command: Command) -> Self {
        Self {
            next: Next::Stay,
            commands: vec![command],
        }
    }
}

/// One footer key hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub key: &'static str,
    pub action: &'static str,
}

pub const fn hint(key: &'static str, action: &'static str) -> Hint {
    Hint { key, action }
}

/// Issues command tags for one screen instance.
#[derive(Debug, Clone)]
pub struct TagSource {
    screen: ScreenId,
    next_seq: u64,
}

impl TagSource {
    pub fn new(screen: ScreenId) -> Self {
        Self {
            screen,
            next_seq: 0,
        }
    }

    pub fn command(&mut self, request: CommandRequest) -> Command {
        let tag = CommandTag {
            screen: self.screen,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        Command { tag, request }
    }
}

pub trait Screen {
    fn kind(&self) -> ScreenKind;

    /// Commands to run as the router activates this screen.
    fn enter(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn handle(&mut self, event: Event) -> Transition;

    fn view(&self, f: &mut Frame, area: Rect, theme: &Theme);

    /// Footer hints for the current step.
    fn hints(&self) -> Vec<Hint>;

    /// Header path, outermost first.
    fn breadcrumb(&self) -> Vec<String> {
        vec![self.kind().title().to_string()]
    }
}

/// Construct the screen for `destination`.
pub fn build(destination: Destination, id: ScreenId) -> Box<dyn Screen> {
    let tags = TagSource::new(id);
    match destination {
        Destination::MainMenu => Box::new(MainMenuScreen::new()),
        Destination::CreateRecord => Box::new(CreateRecordScreen::new(tags)),
        Destination::Search => Box::new(SearchScreen::new(tags)),
        Destination::GenerateFlashcards => Box::new(GenerateScreen::new(tags)),
        Destination::PublishSite => Box::new(PublishScreen::new(tags)),
        Destination::FlashcardReview { cards } => Box::new(ReviewScreen::new(tags, cards)),
        Destination::RecordViewer { record } => Box::new(RecordViewerScreen::new(record)),
        Destination::Loading { message, record_id } => {
            Box::new(LoadingScreen::new(tags, message, record_id))
        }
        Destination::Error { message } => Box::new(ErrorScreen::new(message)),
    }
}

/// Log and drop a completion whose payload does not fit the waiting step.
pub(crate) fn unexpected(kind: ScreenKind, what: &str) -> Transition {
    tracing::warn!(screen = kind.title(), payload = what, "unexpected completion payload");
    Transition::stay()
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use kgraph_core::{Payload, Record, RecordId, ServiceError, Visibility};

    use super::*;
    use crate::tui_event::{CommandPayload, Completion, Key};
    use crate::view::testing::buffer_text;

    pub const ID: ScreenId = ScreenId(1);

    pub fn tags() -> TagSource {
        TagSource::new(ID)
    }

    pub fn press(screen: &mut dyn Screen, key: Key) -> Transition {
        screen.handle(Event::Key(key))
    }

    pub fn type_text(screen: &mut dyn Screen, text: &str) {
        for c in text.chars() {
            let t = press(screen, Key::Char(c));
            assert_eq!(t.next, Next::Stay, "typing {c:?} navigated away");
        }
    }

    /// The single command in `t`, panicking otherwise.
    pub fn only_command(t: &Transition) -> Command {
        assert_eq!(t.commands.len(), 1, "expected one command, got {:?}", t.commands);
        t.commands[0].clone()
    }

    pub fn complete(
        screen: &mut dyn Screen,
        command: &Command,
        outcome: Result<CommandPayload, ServiceError>,
    ) -> Transition {
        screen.handle(Event::CommandCompleted(Completion {
            tag: command.tag,
            outcome,
        }))
    }

    pub fn record(id: &str, title: &str, payload: Payload) -> Record {
        let now = Utc::now();
        Record {
            id: RecordId::new(id),
            title: title.to_string(),
            visibility: Visibility::Public,
            created_at: now,
            updated_at: now,
            payload,
        }
    }

    pub fn note(id: &str, title: &str) -> Record {
        record(
            id,
            title,
            Payload::Note {
                content: format!("{title} body"),
            },
        )
    }

    pub fn render(screen: &dyn Screen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let theme = Theme::hacker();
        terminal
            .draw(|f| {
                let area = f.area();
                screen.view(f, area, &theme);
            })
            .unwrap();
        buffer_text(&terminal)
    }
}
