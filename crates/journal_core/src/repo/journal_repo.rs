//! Journal item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist journal items and their polymorphic `(content_type, object_uuid)` pointer.
//! - Provide parent/children reads and the descendant traversal query.
//! - Delete whole item subtrees in one statement.
//!
//! # Invariants
//! - Child listing order is insertion order: `created_at ASC, rowid ASC`.
//! - Subtree deletion never leaves an orphaned descendant behind.
//! - This layer does not check discriminator consistency or cycles; the
//!   service layer owns those rules.

use crate::model::content::{ContentEntity, ContentRef, ItemType};
use crate::model::journal_item::{JournalItem, JournalItemId, NewJournalItem};
use crate::model::user::UserId;
use crate::repo::content_repo::{insert_content, load_content};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::types::{ToSql, Value};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    item_type,
    owner_uuid,
    content_type,
    object_uuid,
    parent_uuid,
    created_at,
    updated_at
FROM journal_items";

/// Filter options for listing journal items. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalItemQuery {
    pub owner_uuid: Option<UserId>,
    pub item_type: Option<ItemType>,
    /// Exact `(content_type, object_id)` match.
    pub content: Option<ContentRef>,
    /// Only items without a parent.
    pub roots_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for journal items and their tree links.
pub trait JournalItemRepository {
    /// Inserts one item with a generated id.
    fn create_item(&self, item: &NewJournalItem) -> RepoResult<JournalItem>;
    /// Inserts a content entity and the item wrapping it, all-or-nothing.
    fn create_item_with_content(
        &self,
        content: &ContentEntity,
        item: &NewJournalItem,
    ) -> RepoResult<JournalItem>;
    fn get_item(&self, id: JournalItemId) -> RepoResult<Option<JournalItem>>;
    fn list_items(&self, query: &JournalItemQuery) -> RepoResult<Vec<JournalItem>>;
    /// Direct children of one item.
    fn list_children(&self, parent_uuid: JournalItemId) -> RepoResult<Vec<JournalItem>>;
    /// Every transitive descendant of one item, excluding the item itself.
    fn list_descendants(&self, root_uuid: JournalItemId) -> RepoResult<Vec<JournalItem>>;
    /// Re-points `parent_uuid`; `None` makes the item a root.
    fn set_parent(
        &self,
        id: JournalItemId,
        parent_uuid: Option<JournalItemId>,
    ) -> RepoResult<()>;
    /// Deletes one item and all its descendants. Returns removed row count.
    fn delete_item(&self, id: JournalItemId) -> RepoResult<usize>;
    /// Loads the content row a reference points to, if present.
    fn load_content(&self, content_ref: ContentRef) -> RepoResult<Option<ContentEntity>>;
}

/// SQLite-backed journal item repository.
pub struct SqliteJournalItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalItemRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &["users", "notes", "tasks", "events", "journal_items"],
        )?;
        Ok(Self { conn })
    }
}

impl JournalItemRepository for SqliteJournalItemRepository<'_> {
    fn create_item(&self, item: &NewJournalItem) -> RepoResult<JournalItem> {
        let id = insert_item(self.conn, item)?;
        load_required_item(self.conn, id)
    }

    fn create_item_with_content(
        &self,
        content: &ContentEntity,
        item: &NewJournalItem,
    ) -> RepoResult<JournalItem> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_content(&tx, content)?;
        let id = insert_item(&tx, item)?;
        let created = load_required_item(&tx, id)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_item(&self, id: JournalItemId) -> RepoResult<Option<JournalItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn list_items(&self, query: &JournalItemQuery) -> RepoResult<Vec<JournalItem>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_uuid) = query.owner_uuid {
            sql.push_str(" AND owner_uuid = ?");
            bind_values.push(Value::Text(owner_uuid.to_string()));
        }
        if let Some(item_type) = query.item_type {
            sql.push_str(" AND item_type = ?");
            bind_values.push(Value::Text(item_type.code().to_string()));
        }
        if let Some(content) = query.content {
            sql.push_str(" AND content_type = ? AND object_uuid = ?");
            bind_values.push(Value::Text(content.kind.code().to_string()));
            bind_values.push(Value::Text(content.id.to_string()));
        }
        if query.roots_only {
            sql.push_str(" AND parent_uuid IS NULL");
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        collect_items(&mut rows)
    }

    fn list_children(&self, parent_uuid: JournalItemId) -> RepoResult<Vec<JournalItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE parent_uuid = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([parent_uuid.to_string()])?;
        collect_items(&mut rows)
    }

    fn list_descendants(&self, root_uuid: JournalItemId) -> RepoResult<Vec<JournalItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "WITH RECURSIVE subtree(uuid) AS (
                SELECT uuid
                FROM journal_items
                WHERE parent_uuid = ?1
                UNION
                SELECT child.uuid
                FROM journal_items child
                INNER JOIN subtree parent ON child.parent_uuid = parent.uuid
            )
            {ITEM_SELECT_SQL}
            WHERE uuid IN (SELECT uuid FROM subtree)
              AND uuid <> ?1
            ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([root_uuid.to_string()])?;
        collect_items(&mut rows)
    }

    fn set_parent(
        &self,
        id: JournalItemId,
        parent_uuid: Option<JournalItemId>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE journal_items
             SET parent_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), parent_uuid.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "journal item",
                id,
            });
        }
        Ok(())
    }

    fn delete_item(&self, id: JournalItemId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = delete_item_subtrees(&tx, "uuid = ?1", params![id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: "journal item",
                id,
            });
        }
        tx.commit()?;
        Ok(removed)
    }

    fn load_content(&self, content_ref: ContentRef) -> RepoResult<Option<ContentEntity>> {
        load_content(self.conn, content_ref)
    }
}

/// Deletes every item matching `seed_where` together with all descendants.
///
/// `seed_where` is a trusted SQL fragment over `journal_items` columns.
/// Returns the number of distinct items removed.
pub(crate) fn delete_item_subtrees(
    conn: &Connection,
    seed_where: &str,
    seed_params: &[&dyn ToSql],
) -> RepoResult<usize> {
    let subtree_cte = format!(
        "WITH RECURSIVE subtree(uuid) AS (
            SELECT uuid
            FROM journal_items
            WHERE {seed_where}
            UNION
            SELECT child.uuid
            FROM journal_items child
            INNER JOIN subtree parent ON child.parent_uuid = parent.uuid
        )"
    );

    // Counted up front: parent_uuid cascades remove some rows before the
    // DELETE statement reaches them, so its change count undercounts.
    let removed: i64 = conn.query_row(
        &format!("{subtree_cte} SELECT COUNT(*) FROM subtree;"),
        seed_params,
        |row| row.get(0),
    )?;
    if removed == 0 {
        return Ok(0);
    }

    conn.execute(
        &format!(
            "{subtree_cte}
            DELETE FROM journal_items
            WHERE uuid IN (SELECT uuid FROM subtree);"
        ),
        seed_params,
    )?;

    usize::try_from(removed)
        .map_err(|_| RepoError::InvalidData(format!("invalid subtree size `{removed}`")))
}

fn insert_item(conn: &Connection, item: &NewJournalItem) -> RepoResult<JournalItemId> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO journal_items (
            uuid,
            item_type,
            owner_uuid,
            content_type,
            object_uuid,
            parent_uuid
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            id.to_string(),
            item.item_type.code(),
            item.owner_uuid.to_string(),
            item.content.kind.code(),
            item.content.id.to_string(),
            item.parent_uuid.map(|value| value.to_string()),
        ],
    )?;
    Ok(id)
}

fn load_required_item(conn: &Connection, id: JournalItemId) -> RepoResult<JournalItem> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_item_row(row);
    }
    Err(RepoError::NotFound {
        entity: "journal item",
        id,
    })
}

fn collect_items(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<JournalItem>> {
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_item_row(row)?);
    }
    Ok(items)
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<JournalItem> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    let object_text: String = row.get("object_uuid")?;
    let parent_uuid = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "journal_items.parent_uuid"))
        .transpose()?;

    Ok(JournalItem {
        uuid: parse_uuid(&uuid_text, "journal_items.uuid")?,
        item_type: parse_item_type(row, "item_type")?,
        owner_uuid: parse_uuid(&owner_text, "journal_items.owner_uuid")?,
        content: ContentRef {
            kind: parse_item_type(row, "content_type")?,
            id: parse_uuid(&object_text, "journal_items.object_uuid")?,
        },
        parent_uuid,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_item_type(row: &Row<'_>, column: &'static str) -> RepoResult<ItemType> {
    let value: String = row.get(column)?;
    ItemType::from_code(&value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid item type `{value}` in journal_items.{column}"
        ))
    })
}
