use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod mock;
pub mod service;

// Re-export for convenience
pub use mock::{Latency, MockService, Operation};
pub use service::{BackingService, ServiceError};

/// The four kinds of knowledge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Note,
    Link,
    Tag,
    Flashcard,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Note,
        RecordKind::Link,
        RecordKind::Tag,
        RecordKind::Flashcard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Note => "Note",
            RecordKind::Link => "Link",
            RecordKind::Tag => "Tag",
            RecordKind::Flashcard => "Flashcard",
        }
    }

    /// One-line description shown next to the kind in pickers.
    pub fn description(self) -> &'static str {
        match self {
            RecordKind::Note => "A text-based knowledge entry",
            RecordKind::Link => "A URL reference",
            RecordKind::Tag => "A category label",
            RecordKind::Flashcard => "A study card",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_public(public: bool) -> Self {
        if public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }

    pub fn label(self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        }
    }
}

/// Identifier assigned by the backing service (`rec-001`, `rec-002`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind-specific record data. The record's kind is derived from this, so a
/// record can never carry a payload that disagrees with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Note { content: String },
    Link { url: String },
    Tag { name: String },
    Flashcard { front: String, back: String },
}

impl Payload {
    pub fn kind(&self) -> RecordKind {
        match self {
            Payload::Note { .. } => RecordKind::Note,
            Payload::Link { .. } => RecordKind::Link,
            Payload::Tag { .. } => RecordKind::Tag,
            Payload::Flashcard { .. } => RecordKind::Flashcard,
        }
    }

    /// The field a list preview shows for this kind.
    pub fn preview_source(&self) -> &str {
        match self {
            Payload::Note { content } => content,
            Payload::Link { url } => url,
            Payload::Tag { name } => name,
            Payload::Flashcard { front, .. } => front,
        }
    }

    /// Title used when the creator leaves it blank.
    pub fn default_title(&self) -> String {
        let fallback = |value: &str, untitled: &str| {
            if value.trim().is_empty() {
                untitled.to_string()
            } else {
                value.trim().to_string()
            }
        };
        match self {
            Payload::Note { .. } => "Untitled Note".to_string(),
            Payload::Link { url } => fallback(url, "Untitled Link"),
            Payload::Tag { name } => fallback(name, "Untitled Tag"),
            Payload::Flashcard { front, .. } => fallback(front, "Untitled Flashcard"),
        }
    }
}

/// A knowledge record as returned by the backing service.
///
/// Records are values: screens hold clones and never modify them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payload: Payload,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        self.payload.kind()
    }

    /// Short preview of the kind-specific content (at most 50 characters).
    pub fn preview(&self) -> String {
        const MAX: usize = 50;
        let source = self.payload.preview_source();
        if source.chars().count() > MAX {
            let head: String = source.chars().take(MAX).collect();
            format!("{head}...")
        } else {
            source.to_string()
        }
    }

    /// `[kind] title`, used by list rows and viewer titles.
    pub fn display_name(&self) -> String {
        format!("[{}] {}", self.kind().label().to_lowercase(), self.title)
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("<record could not be serialized: {e}>"))
    }
}

/// Request to create a record. A blank or missing title is replaced by
/// [`Payload::default_title`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub title: Option<String>,
    pub payload: Payload,
    pub visibility: Visibility,
}

impl NewRecord {
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => self.payload.default_title(),
        }
    }
}

/// One search match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub record: Record,
    /// Excerpt around the match.
    pub snippet: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    /// Creation request for saving this card as a record.
    pub fn to_new_record(&self, visibility: Visibility) -> NewRecord {
        NewRecord {
            title: None,
            payload: Payload::Flashcard {
                front: self.front.clone(),
                back: self.back.clone(),
            },
            visibility,
        }
    }
}

/// Result of a site publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSummary {
    pub files_generated: usize,
    pub output_dir: String,
}
