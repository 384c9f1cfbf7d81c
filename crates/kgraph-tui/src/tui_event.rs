use kgraph_core::{
    Flashcard, NewRecord, PublishSummary, Record, RecordId, SearchHit, ServiceError,
};

/// Everything the event loop reacts to. Each event is delivered exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(Key),
    Resize(u16, u16),
    CommandCompleted(Completion),
    Tick,
}

/// Named keys, decoupled from crossterm so screens can be driven in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// Control chord, always lowercase (`Ctrl('c')`).
    Ctrl(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Router-assigned identity of one screen instance. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub u64);

/// Identifies the screen instance that issued a command and which issue it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandTag {
    pub screen: ScreenId,
    pub seq: u64,
}

/// Work a screen asks the scheduler to run against the backing service.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub tag: CommandTag,
    pub request: CommandRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandRequest {
    CreateRecord(NewRecord),
    /// Created in order; the first failure aborts the batch.
    CreateRecords(Vec<NewRecord>),
    Search(String),
    GetRecord(RecordId),
    GenerateFlashcards(RecordId),
    Publish,
}

impl CommandRequest {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CommandRequest::CreateRecord(_) => "create_record",
            CommandRequest::CreateRecords(_) => "create_records",
            CommandRequest::Search(_) => "search",
            CommandRequest::GetRecord(_) => "get_record",
            CommandRequest::GenerateFlashcards(_) => "generate_flashcards",
            CommandRequest::Publish => "publish",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandPayload {
    Created(Record),
    CreatedMany(Vec<Record>),
    Hits(Vec<SearchHit>),
    Fetched(Record),
    Flashcards(Vec<Flashcard>),
    Published(PublishSummary),
}

/// Result of a finished command, routed back by its tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub tag: CommandTag,
    pub outcome: Result<CommandPayload, ServiceError>,
}
