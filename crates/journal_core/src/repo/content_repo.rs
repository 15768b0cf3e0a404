//! Content repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `notes`, `tasks` and `events` tables.
//! - Map an `ItemType` tag to its table and typed row parser.
//! - Cascade content deletion into the journal items that reference it.
//!
//! # Invariants
//! - Writes call `ContentEntity::validate()` before SQL mutations.
//! - A content row and every item subtree pointing at it disappear together.

use crate::model::content::{ContentEntity, ContentRef, Event, ItemType, Note, Task};
use crate::repo::journal_repo::delete_item_subtrees;
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Tag-to-table accessor for one content variant.
struct ContentTable {
    table: &'static str,
    entity: &'static str,
    columns: &'static str,
    parse: fn(&Row<'_>) -> RepoResult<ContentEntity>,
}

static NOTE_TABLE: ContentTable = ContentTable {
    table: "notes",
    entity: "note",
    columns: "uuid, title",
    parse: parse_note_row,
};

static TASK_TABLE: ContentTable = ContentTable {
    table: "tasks",
    entity: "task",
    columns: "uuid, title, completed, deadline",
    parse: parse_task_row,
};

static EVENT_TABLE: ContentTable = ContentTable {
    table: "events",
    entity: "event",
    columns: "uuid, title, start_date, end_date",
    parse: parse_event_row,
};

fn content_table(kind: ItemType) -> &'static ContentTable {
    match kind {
        ItemType::Note => &NOTE_TABLE,
        ItemType::Task => &TASK_TABLE,
        ItemType::Event => &EVENT_TABLE,
    }
}

/// Repository interface for content entity CRUD.
pub trait ContentRepository {
    /// Inserts one content entity and returns its reference.
    fn create_content(&self, content: &ContentEntity) -> RepoResult<ContentRef>;
    /// Replaces every field of an existing entity of the same variant.
    fn update_content(&self, content: &ContentEntity) -> RepoResult<()>;
    /// Loads one entity through its `(type, id)` reference.
    fn get_content(&self, content_ref: ContentRef) -> RepoResult<Option<ContentEntity>>;
    /// Lists all entities of one variant in insertion order.
    fn list_content(&self, kind: ItemType) -> RepoResult<Vec<ContentEntity>>;
    /// Deletes one entity and the item subtrees referencing it.
    ///
    /// Returns the number of journal items removed by the cascade.
    fn delete_content(&self, content_ref: ContentRef) -> RepoResult<usize>;
}

/// SQLite-backed content repository.
pub struct SqliteContentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["notes", "tasks", "events", "journal_items"])?;
        Ok(Self { conn })
    }
}

impl ContentRepository for SqliteContentRepository<'_> {
    fn create_content(&self, content: &ContentEntity) -> RepoResult<ContentRef> {
        insert_content(self.conn, content)
    }

    fn update_content(&self, content: &ContentEntity) -> RepoResult<()> {
        content.validate()?;

        let changed = match content {
            ContentEntity::Note(note) => self.conn.execute(
                "UPDATE notes
                 SET title = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![note.uuid.to_string(), note.title.as_str()],
            )?,
            ContentEntity::Task(task) => self.conn.execute(
                "UPDATE tasks
                 SET title = ?2,
                     completed = ?3,
                     deadline = ?4,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![
                    task.uuid.to_string(),
                    task.title.as_str(),
                    bool_to_int(task.completed),
                    task.deadline,
                ],
            )?,
            ContentEntity::Event(event) => self.conn.execute(
                "UPDATE events
                 SET title = ?2,
                     start_date = ?3,
                     end_date = ?4,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![
                    event.uuid.to_string(),
                    event.title.as_str(),
                    event.start_date,
                    event.end_date,
                ],
            )?,
        };

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: content_table(content.kind()).entity,
                id: content.id(),
            });
        }
        Ok(())
    }

    fn get_content(&self, content_ref: ContentRef) -> RepoResult<Option<ContentEntity>> {
        load_content(self.conn, content_ref)
    }

    fn list_content(&self, kind: ItemType) -> RepoResult<Vec<ContentEntity>> {
        let table = content_table(kind);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY created_at ASC, rowid ASC;",
            table.columns, table.table
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push((table.parse)(row)?);
        }
        Ok(items)
    }

    fn delete_content(&self, content_ref: ContentRef) -> RepoResult<usize> {
        let table = content_table(content_ref.kind);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let removed_items = delete_item_subtrees(
            &tx,
            "content_type = ?1 AND object_uuid = ?2",
            params![content_ref.kind.code(), content_ref.id.to_string()],
        )?;

        let changed = tx.execute(
            &format!("DELETE FROM {} WHERE uuid = ?1;", table.table),
            [content_ref.id.to_string()],
        )?;
        if changed == 0 {
            // Dropping the transaction rolls back the item cascade.
            return Err(RepoError::NotFound {
                entity: table.entity,
                id: content_ref.id,
            });
        }

        tx.commit()?;
        Ok(removed_items)
    }
}

pub(crate) fn insert_content(conn: &Connection, content: &ContentEntity) -> RepoResult<ContentRef> {
    content.validate()?;

    match content {
        ContentEntity::Note(note) => conn.execute(
            "INSERT INTO notes (uuid, title) VALUES (?1, ?2);",
            params![note.uuid.to_string(), note.title.as_str()],
        )?,
        ContentEntity::Task(task) => conn.execute(
            "INSERT INTO tasks (uuid, title, completed, deadline) VALUES (?1, ?2, ?3, ?4);",
            params![
                task.uuid.to_string(),
                task.title.as_str(),
                bool_to_int(task.completed),
                task.deadline,
            ],
        )?,
        ContentEntity::Event(event) => conn.execute(
            "INSERT INTO events (uuid, title, start_date, end_date) VALUES (?1, ?2, ?3, ?4);",
            params![
                event.uuid.to_string(),
                event.title.as_str(),
                event.start_date,
                event.end_date,
            ],
        )?,
    };

    Ok(content.content_ref())
}

pub(crate) fn load_content(
    conn: &Connection,
    content_ref: ContentRef,
) -> RepoResult<Option<ContentEntity>> {
    let table = content_table(content_ref.kind);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} WHERE uuid = ?1;",
        table.columns, table.table
    ))?;
    let mut rows = stmt.query([content_ref.id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some((table.parse)(row)?));
    }
    Ok(None)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<ContentEntity> {
    let uuid_text: String = row.get("uuid")?;
    Ok(ContentEntity::Note(Note {
        uuid: parse_uuid(&uuid_text, "notes.uuid")?,
        title: row.get("title")?,
    }))
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<ContentEntity> {
    let uuid_text: String = row.get("uuid")?;
    Ok(ContentEntity::Task(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        title: row.get("title")?,
        completed: int_to_bool(row.get("completed")?, "tasks.completed")?,
        deadline: row.get("deadline")?,
    }))
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<ContentEntity> {
    let uuid_text: String = row.get("uuid")?;
    Ok(ContentEntity::Event(Event {
        uuid: parse_uuid(&uuid_text, "events.uuid")?,
        title: row.get("title")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
    }))
}
