//! In-memory backing service with simulated latency.
//!
//! Used by the terminal UI in place of a real store, and by tests with
//! [`Latency::none`] plus per-operation fault injection.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use crate::service::{BackingService, ServiceError};
use crate::{
    Flashcard, NewRecord, Payload, PublishSummary, Record, RecordId, SearchHit, Visibility,
};

const SNIPPET_CONTEXT: usize = 20;
const SNIPPET_MAX: usize = 100;
const PUBLISH_DIR: &str = "./public";

/// Backing-service operations, used to address latency and injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Search,
    Get,
    Generate,
    Publish,
}

/// Simulated per-operation delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub create: Duration,
    pub search: Duration,
    pub get: Duration,
    pub generate: Duration,
    pub publish: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            create: Duration::from_millis(100),
            search: Duration::from_millis(200),
            get: Duration::from_millis(50),
            generate: Duration::from_secs(2),
            publish: Duration::from_secs(3),
        }
    }
}

impl Latency {
    pub fn none() -> Self {
        Self {
            create: Duration::ZERO,
            search: Duration::ZERO,
            get: Duration::ZERO,
            generate: Duration::ZERO,
            publish: Duration::ZERO,
        }
    }

    /// Largest accepted multiplier; a publish then takes five minutes.
    pub const MAX_SCALE: f64 = 100.0;

    /// Default delays multiplied by `factor`, clamped to `0..=MAX_SCALE`.
    /// A NaN factor means no scaling.
    pub fn scaled(factor: f64) -> Self {
        let factor = if factor.is_nan() {
            1.0
        } else {
            factor.clamp(0.0, Self::MAX_SCALE)
        };
        let d = Self::default();
        Self {
            create: d.create.mul_f64(factor),
            search: d.search.mul_f64(factor),
            get: d.get.mul_f64(factor),
            generate: d.generate.mul_f64(factor),
            publish: d.publish.mul_f64(factor),
        }
    }

    fn of(&self, op: Operation) -> Duration {
        match op {
            Operation::Create => self.create,
            Operation::Search => self.search,
            Operation::Get => self.get,
            Operation::Generate => self.generate,
            Operation::Publish => self.publish,
        }
    }
}

pub struct MockService {
    records: Mutex<Vec<Record>>,
    faults: Mutex<HashMap<Operation, String>>,
    latency: Latency,
}

impl MockService {
    /// Empty store.
    pub fn new(latency: Latency) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            faults: Mutex::new(HashMap::new()),
            latency,
        }
    }

    /// Store seeded with a handful of demonstration records.
    pub fn with_samples(latency: Latency) -> Self {
        let service = Self::new(latency);
        *lock(&service.records) = sample_records();
        service
    }

    /// Make every subsequent call of `op` fail with `message`.
    pub fn fail(&self, op: Operation, message: impl Into<String>) {
        lock(&self.faults).insert(op, message.into());
    }

    pub fn clear_fault(&self, op: Operation) {
        lock(&self.faults).remove(&op);
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Vec<Record> {
        lock(&self.records).clone()
    }

    /// Sleep for the operation's latency, then report an injected fault if any.
    fn begin(&self, op: Operation) -> Result<(), ServiceError> {
        let delay = self.latency.of(op);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        match lock(&self.faults).get(&op) {
            Some(message) => {
                tracing::debug!(?op, %message, "injected fault");
                Err(ServiceError::Failed(message.clone()))
            }
            None => Ok(()),
        }
    }

    fn find(&self, id: &RecordId) -> Result<Record, ServiceError> {
        lock(&self.records)
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound { id: id.clone() })
    }
}

impl BackingService for MockService {
    fn create_record(&self, request: NewRecord) -> Result<Record, ServiceError> {
        self.begin(Operation::Create)?;
        let now = Utc::now();
        let title = request.resolved_title();
        let mut records = lock(&self.records);
        let record = Record {
            id: RecordId::new(format!("rec-{:03}", records.len() + 1)),
            title,
            visibility: request.visibility,
            created_at: now,
            updated_at: now,
            payload: request.payload,
        };
        records.push(record.clone());
        tracing::debug!(id = %record.id, kind = %record.kind(), "record created");
        Ok(record)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        self.begin(Operation::Search)?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let mut hits: Vec<SearchHit> = lock(&self.records)
            .iter()
            .filter_map(|record| score_record(record, &needle))
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        tracing::debug!(query, hits = hits.len(), "search complete");
        Ok(hits)
    }

    fn get_record(&self, id: &RecordId) -> Result<Record, ServiceError> {
        self.begin(Operation::Get)?;
        self.find(id)
    }

    fn generate_flashcards(&self, id: &RecordId) -> Result<Vec<Flashcard>, ServiceError> {
        self.begin(Operation::Generate)?;
        let record = self.find(id)?;
        let mut cards = vec![
            Flashcard::new(
                format!("What is the main topic of '{}'?", record.title),
                format!(
                    "The main topic is the {} described in its content.",
                    record.kind().label().to_lowercase()
                ),
            ),
            Flashcard::new(
                format!("When was '{}' created?", record.title),
                format!("It was created on {}.", record.created_at.format("%B %-d, %Y")),
            ),
        ];
        match &record.payload {
            Payload::Note { content } if content.chars().count() > 50 => {
                let head: String = content.chars().take(100).collect();
                cards.push(Flashcard::new(
                    "What are the key points from this note?",
                    format!("{head}..."),
                ));
            }
            Payload::Link { url } if !url.is_empty() => {
                cards.push(Flashcard::new(
                    format!("What is the URL for '{}'?", record.title),
                    url.clone(),
                ));
            }
            _ => {}
        }
        Ok(cards)
    }

    fn publish(&self) -> Result<PublishSummary, ServiceError> {
        self.begin(Operation::Publish)?;
        let public = lock(&self.records)
            .iter()
            .filter(|r| r.visibility.is_public())
            .count();
        // One page per public record plus the index page and stylesheet.
        Ok(PublishSummary {
            files_generated: public + 2,
            output_dir: PUBLISH_DIR.to_string(),
        })
    }
}

/// A poisoned lock only means another caller panicked mid-call; the data is
/// still a valid `Vec`/`HashMap`, so keep serving it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn score_record(record: &Record, needle: &str) -> Option<SearchHit> {
    let mut score = 0.0;
    let mut snippet = None;

    if record.title.to_lowercase().contains(needle) {
        score += 0.8;
        snippet = Some(record.title.clone());
    }
    let (weight, field) = match &record.payload {
        Payload::Note { content } => (0.6, content.as_str()),
        Payload::Link { url } => (0.7, url.as_str()),
        Payload::Tag { name } => (0.9, name.as_str()),
        Payload::Flashcard { front, .. } => (0.7, front.as_str()),
    };
    if !field.is_empty() && field.to_lowercase().contains(needle) {
        score += weight;
        snippet = Some(highlight_snippet(field, needle));
    }

    snippet.map(|snippet| SearchHit {
        record: record.clone(),
        snippet,
        score,
    })
}

/// Excerpt of `content` around the first case-insensitive match of `needle`
/// (already lowercased), capped at [`SNIPPET_MAX`] characters.
pub fn highlight_snippet(content: &str, needle: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let lowered: Vec<char> = chars.iter().flat_map(|c| c.to_lowercase()).collect();
    let needle_chars: Vec<char> = needle.chars().collect();

    // Lowercasing can change the length of exotic characters; only use the
    // match position when it maps one-to-one.
    let position = if lowered.len() == chars.len() && !needle_chars.is_empty() {
        lowered
            .windows(needle_chars.len())
            .position(|w| w == needle_chars.as_slice())
    } else {
        None
    };

    let excerpt: String = match position {
        Some(pos) => {
            let start = pos.saturating_sub(SNIPPET_CONTEXT);
            let end = (pos + needle_chars.len() + SNIPPET_CONTEXT).min(chars.len());
            chars[start..end].iter().collect()
        }
        None => content.to_string(),
    };

    if excerpt.chars().count() > SNIPPET_MAX {
        let head: String = excerpt.chars().take(SNIPPET_MAX).collect();
        format!("{head}...")
    } else {
        excerpt
    }
}

fn sample_records() -> Vec<Record> {
    let now = Utc::now();
    let days_ago = |days: i64| now - ChronoDuration::days(days);
    let record = |id: &str, title: &str, visibility, age: i64, payload| Record {
        id: RecordId::new(id),
        title: title.to_string(),
        visibility,
        created_at: days_ago(age),
        updated_at: days_ago(age),
        payload,
    };

    vec![
        record(
            "rec-001",
            "Ownership in Rust",
            Visibility::Public,
            35,
            Payload::Note {
                content: "Every value in Rust has a single owner. When the owner goes out of scope \
                          the value is dropped, which is how memory is reclaimed without a garbage collector."
                    .to_string(),
            },
        ),
        record(
            "rec-002",
            "The Rust Reference",
            Visibility::Public,
            33,
            Payload::Link {
                url: "https://doc.rust-lang.org/reference/".to_string(),
            },
        ),
        record(
            "rec-003",
            "programming",
            Visibility::Private,
            60,
            Payload::Tag {
                name: "programming".to_string(),
            },
        ),
        record(
            "rec-004",
            "What is a borrow?",
            Visibility::Public,
            1,
            Payload::Flashcard {
                front: "What is a borrow?".to_string(),
                back: "A reference that lets code use a value without taking ownership of it."
                    .to_string(),
            },
        ),
        record(
            "rec-005",
            "Elm architecture in terminal apps",
            Visibility::Private,
            2,
            Payload::Note {
                content: "State lives in a model, a pure update function turns messages into new \
                          state plus commands, and the view is a function of the model."
                    .to_string(),
            },
        ),
        record(
            "rec-006",
            "Ratatui",
            Visibility::Public,
            7,
            Payload::Link {
                url: "https://ratatui.rs".to_string(),
            },
        ),
        record(
            "rec-007",
            "What does Drop do?",
            Visibility::Public,
            3,
            Payload::Flashcard {
                front: "What does the Drop trait do?".to_string(),
                back: "It runs custom cleanup code when a value goes out of scope.".to_string(),
            },
        ),
    ]
}
