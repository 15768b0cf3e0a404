//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a user removes every item it owns plus those items' subtrees.

use crate::model::user::{User, UserId};
use crate::repo::journal_repo::delete_item_subtrees;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT uuid, username, created_at FROM users";

/// Repository interface for journal owners.
pub trait UserRepository {
    /// Inserts one user with a generated id. `username` is stored as given.
    fn create_user(&self, username: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Deletes one user and cascades into owned items.
    ///
    /// Returns the number of journal items removed by the cascade.
    fn delete_user(&self, id: UserId) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users", "journal_items"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, username: &str) -> RepoResult<User> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO users (uuid, username) VALUES (?1, ?2);",
            params![uuid.to_string(), username],
        )?;
        self.get_user(uuid)?.ok_or(RepoError::NotFound {
            entity: "user",
            id: uuid,
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                raw_user_row,
            )
            .optional()?
            .map(parse_user)
            .transpose()
    }

    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [username],
                raw_user_row,
            )
            .optional()?
            .map(parse_user)
            .transpose()
    }

    fn delete_user(&self, id: UserId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let removed_items =
            delete_item_subtrees(&tx, "owner_uuid = ?1", params![id.to_string()])?;
        let changed = tx.execute("DELETE FROM users WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id,
            });
        }

        tx.commit()?;
        Ok(removed_items)
    }
}

fn raw_user_row(row: &Row<'_>) -> rusqlite::Result<(String, String, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn parse_user((uuid_text, username, created_at): (String, String, i64)) -> RepoResult<User> {
    Ok(User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        username,
        created_at,
    })
}
