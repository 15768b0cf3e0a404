//! Content entity model: notes, tasks and events.
//!
//! # Responsibility
//! - Define the three journal content shapes and their tagged union.
//! - Define the `ItemType` discriminator shared with journal items.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another content entity.
//! - `title` is at most `TITLE_MAX_CHARS` characters.
//! - A `ContentRef` kind always names the table the id lives in.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one note, task or event row.
pub type ContentId = Uuid;

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Discriminator naming which content variant a journal item wraps.
///
/// Serialized and stored as the single-letter codes `N`, `T` and `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "N")]
    Note,
    #[serde(rename = "T")]
    Task,
    #[serde(rename = "E")]
    Event,
}

impl ItemType {
    /// All discriminators, in display order.
    pub const ALL: [ItemType; 3] = [ItemType::Note, ItemType::Task, ItemType::Event];

    /// Single-letter storage code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Note => "N",
            Self::Task => "T",
            Self::Event => "E",
        }
    }

    /// Parses a storage code back into a discriminator.
    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "N" => Some(Self::Note),
            "T" => Some(Self::Task),
            "E" => Some(Self::Event),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Task => "Task",
            Self::Event => "Event",
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Field-level validation failures for content entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValidationError {
    NilUuid,
    TitleTooLong { len: usize, max: usize },
}

impl Display for ContentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "content uuid must not be nil"),
            Self::TitleTooLong { len, max } => {
                write!(f, "title has {len} characters, at most {max} allowed")
            }
        }
    }
}

impl Error for ContentValidationError {}

/// Free-form note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub uuid: ContentId,
    pub title: String,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
        }
    }
}

/// Actionable task with an optional deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: ContentId,
    pub title: String,
    /// Defaults to `false` on creation.
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub deadline: Option<i64>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            deadline: None,
        }
    }
}

/// Calendar event with optional start/end.
///
/// Start and end are stored as given; no ordering between them is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub uuid: ContentId,
    pub title: String,
    /// Unix epoch milliseconds.
    pub start_date: Option<i64>,
    /// Unix epoch milliseconds.
    pub end_date: Option<i64>,
}

impl Event {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            start_date: None,
            end_date: None,
        }
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.uuid, self.title)
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.uuid, self.title)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.uuid, self.title)
    }
}

/// Tagged union over every content shape a journal item can wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentEntity {
    Note(Note),
    Task(Task),
    Event(Event),
}

impl ContentEntity {
    /// Runtime variant of this entity as a discriminator.
    pub fn kind(&self) -> ItemType {
        match self {
            Self::Note(_) => ItemType::Note,
            Self::Task(_) => ItemType::Task,
            Self::Event(_) => ItemType::Event,
        }
    }

    pub fn id(&self) -> ContentId {
        match self {
            Self::Note(note) => note.uuid,
            Self::Task(task) => task.uuid,
            Self::Event(event) => event.uuid,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Note(note) => note.title.as_str(),
            Self::Task(task) => task.title.as_str(),
            Self::Event(event) => event.title.as_str(),
        }
    }

    /// The `(type, id)` pair a journal item stores to point at this entity.
    pub fn content_ref(&self) -> ContentRef {
        ContentRef {
            kind: self.kind(),
            id: self.id(),
        }
    }

    /// Validates field-type constraints before persistence.
    pub fn validate(&self) -> Result<(), ContentValidationError> {
        if self.id().is_nil() {
            return Err(ContentValidationError::NilUuid);
        }
        let len = self.title().chars().count();
        if len > TITLE_MAX_CHARS {
            return Err(ContentValidationError::TitleTooLong {
                len,
                max: TITLE_MAX_CHARS,
            });
        }
        Ok(())
    }
}

impl Display for ContentEntity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note(note) => note.fmt(f),
            Self::Task(task) => task.fmt(f),
            Self::Event(event) => event.fmt(f),
        }
    }
}

impl From<Note> for ContentEntity {
    fn from(value: Note) -> Self {
        Self::Note(value)
    }
}

impl From<Task> for ContentEntity {
    fn from(value: Task) -> Self {
        Self::Task(value)
    }
}

impl From<Event> for ContentEntity {
    fn from(value: Event) -> Self {
        Self::Event(value)
    }
}

/// Polymorphic pointer to one content row: discriminator plus id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    #[serde(rename = "content_type")]
    pub kind: ItemType,
    #[serde(rename = "object_id")]
    pub id: ContentId,
}

impl ContentRef {
    pub fn new(kind: ItemType, id: ContentId) -> Self {
        Self { kind, id }
    }
}

impl Display for ContentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.code(), self.id)
    }
}
