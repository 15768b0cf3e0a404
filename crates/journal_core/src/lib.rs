//! Core domain logic for the journal store.
//! Notes, tasks and events are wrapped in owner-tagged journal items that
//! form a parent/children forest.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::content::{
    ContentEntity, ContentId, ContentRef, ContentValidationError, Event, ItemType, Note, Task,
    TITLE_MAX_CHARS,
};
pub use model::journal_item::{JournalItem, JournalItemId, NewJournalItem};
pub use model::user::{User, UserId};
pub use repo::content_repo::{ContentRepository, SqliteContentRepository};
pub use repo::journal_repo::{
    JournalItemQuery, JournalItemRepository, SqliteJournalItemRepository,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::content_service::ContentService;
pub use service::journal_service::{JournalService, JournalServiceError, JournalServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
