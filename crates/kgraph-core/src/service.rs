use thiserror::Error;

use crate::{Flashcard, NewRecord, PublishSummary, Record, RecordId, SearchHit};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("record not found: {id}")]
    NotFound { id: RecordId },
    #[error("{0}")]
    Failed(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// Store and generator operations behind the terminal UI.
///
/// Every call may take observable time. Implementors are plain blocking
/// code; the UI never calls them on its event loop but hands them to the
/// command scheduler, which runs them on a blocking thread.
pub trait BackingService: Send + Sync {
    /// Create a record. A blank title is replaced by the payload's default.
    fn create_record(&self, request: NewRecord) -> Result<Record, ServiceError>;

    /// Case-insensitive search over titles and kind-specific content,
    /// best match first. An empty query yields no hits.
    fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError>;

    fn get_record(&self, id: &RecordId) -> Result<Record, ServiceError>;

    /// Derive study cards from an existing record.
    fn generate_flashcards(&self, id: &RecordId) -> Result<Vec<Flashcard>, ServiceError>;

    /// Render every public record into a static site.
    fn publish(&self) -> Result<PublishSummary, ServiceError>;
}
