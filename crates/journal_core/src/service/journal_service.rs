//! Journal item use-case service.
//!
//! # Responsibility
//! - Wrap persisted content in owner-tagged journal items.
//! - Resolve an item's polymorphic reference back to typed content.
//! - Maintain the parent/children forest.
//!
//! # Invariants
//! - Owner and content must exist before an item is created.
//! - `item_type` always matches the variant of the referenced content.
//! - Attach never creates a parent-child cycle.
//! - Callers pass the owner explicitly; there is no ambient current user.

use crate::model::content::{ContentEntity, ContentRef, ItemType};
use crate::model::journal_item::{JournalItem, JournalItemId, NewJournalItem};
use crate::model::user::{User, UserId};
use crate::repo::journal_repo::{JournalItemQuery, JournalItemRepository};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from journal service operations.
#[derive(Debug)]
pub enum JournalServiceError {
    /// Username is blank after trim.
    InvalidUsername,
    DuplicateUsername(String),
    OwnerNotFound(UserId),
    /// Referenced content row does not exist.
    ContentNotFound(ContentRef),
    ItemNotFound(JournalItemId),
    /// Stored reference points at a content row that no longer exists.
    DanglingReference {
        item_uuid: JournalItemId,
        content: ContentRef,
    },
    /// Declared discriminator disagrees with the referenced content variant.
    TypeMismatch {
        item_uuid: Option<JournalItemId>,
        declared: ItemType,
        actual: ItemType,
    },
    /// Attach would make an item its own ancestor.
    CycleDetected {
        child_uuid: JournalItemId,
        parent_uuid: JournalItemId,
    },
    Repo(RepoError),
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername => write!(f, "username must not be blank"),
            Self::DuplicateUsername(name) => write!(f, "username already taken: {name}"),
            Self::OwnerNotFound(id) => write!(f, "owner not found: {id}"),
            Self::ContentNotFound(content) => write!(f, "content not found: {content}"),
            Self::ItemNotFound(id) => write!(f, "journal item not found: {id}"),
            Self::DanglingReference { item_uuid, content } => write!(
                f,
                "journal item {item_uuid} references missing content {content}"
            ),
            Self::TypeMismatch {
                item_uuid: Some(item_uuid),
                declared,
                actual,
            } => write!(
                f,
                "journal item {item_uuid} is declared {declared} but references {actual}"
            ),
            Self::TypeMismatch {
                item_uuid: None,
                declared,
                actual,
            } => write!(f, "item type {declared} does not match content type {actual}"),
            Self::CycleDetected {
                child_uuid,
                parent_uuid,
            } => write!(
                f,
                "attach would create cycle: item {child_uuid} under parent {parent_uuid}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for JournalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "journal item",
                id,
            } => Self::ItemNotFound(id),
            RepoError::NotFound { entity: "user", id } => Self::OwnerNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type JournalServiceResult<T> = Result<T, JournalServiceError>;

/// Journal item service facade over user and item repositories.
pub struct JournalService<U: UserRepository, J: JournalItemRepository> {
    users: U,
    items: J,
}

impl<U: UserRepository, J: JournalItemRepository> JournalService<U, J> {
    pub fn new(users: U, items: J) -> Self {
        Self { users, items }
    }

    /// Registers one owner. Username is trimmed and must be unique.
    pub fn register_user(&self, username: impl Into<String>) -> JournalServiceResult<User> {
        let username = username.into();
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(JournalServiceError::InvalidUsername);
        }
        if self.users.find_user_by_username(trimmed)?.is_some() {
            return Err(JournalServiceError::DuplicateUsername(trimmed.to_string()));
        }
        Ok(self.users.create_user(trimmed)?)
    }

    pub fn get_user(&self, id: UserId) -> JournalServiceResult<Option<User>> {
        Ok(self.users.get_user(id)?)
    }

    /// Deletes one owner and every item subtree it owns.
    pub fn remove_user(&self, id: UserId) -> JournalServiceResult<usize> {
        let removed_items = self.users.delete_user(id)?;
        info!(
            "event=user_delete module=service status=ok removed_items={}",
            removed_items
        );
        Ok(removed_items)
    }

    /// Wraps already-persisted content in a new journal item.
    ///
    /// # Errors
    /// - `OwnerNotFound` / `ContentNotFound` / `ItemNotFound` (parent) when absent.
    /// - `TypeMismatch` when `item_type` disagrees with the stored content variant.
    pub fn create_item(
        &self,
        owner_uuid: UserId,
        item_type: ItemType,
        content: &ContentEntity,
        parent_uuid: Option<JournalItemId>,
    ) -> JournalServiceResult<JournalItem> {
        self.ensure_owner_exists(owner_uuid)?;

        let content_ref = content.content_ref();
        let stored = self
            .items
            .load_content(content_ref)?
            .ok_or(JournalServiceError::ContentNotFound(content_ref))?;
        if stored.kind() != item_type {
            warn!(
                "event=journal_item_create module=service status=error error_code=type_mismatch declared={} actual={}",
                item_type.code(),
                stored.kind().code()
            );
            return Err(JournalServiceError::TypeMismatch {
                item_uuid: None,
                declared: item_type,
                actual: stored.kind(),
            });
        }

        if let Some(parent_uuid) = parent_uuid {
            self.require_item(parent_uuid)?;
        }

        let item = self.items.create_item(&NewJournalItem {
            owner_uuid,
            item_type,
            content: content_ref,
            parent_uuid,
        })?;
        info!(
            "event=journal_item_create module=service status=ok item_type={} has_parent={}",
            item.item_type.code(),
            item.parent_uuid.is_some()
        );
        Ok(item)
    }

    /// Persists new content and the item wrapping it in one transaction.
    ///
    /// The discriminator is derived from the content variant, so the
    /// result is always consistent.
    pub fn create_entry(
        &self,
        owner_uuid: UserId,
        content: &ContentEntity,
        parent_uuid: Option<JournalItemId>,
    ) -> JournalServiceResult<JournalItem> {
        self.ensure_owner_exists(owner_uuid)?;
        if let Some(parent_uuid) = parent_uuid {
            self.require_item(parent_uuid)?;
        }

        let item = self.items.create_item_with_content(
            content,
            &NewJournalItem {
                owner_uuid,
                item_type: content.kind(),
                content: content.content_ref(),
                parent_uuid,
            },
        )?;
        info!(
            "event=journal_item_create module=service status=ok mode=entry item_type={} has_parent={}",
            item.item_type.code(),
            item.parent_uuid.is_some()
        );
        Ok(item)
    }

    /// Loads one item or fails with `ItemNotFound`.
    pub fn get_item(&self, id: JournalItemId) -> JournalServiceResult<JournalItem> {
        self.require_item(id)
    }

    /// Resolves the item's `(type, id)` pointer to the concrete content entity.
    ///
    /// # Errors
    /// - `TypeMismatch` when the stored discriminator disagrees with the reference.
    /// - `DanglingReference` when the referenced row is gone.
    pub fn resolve_content(&self, item: &JournalItem) -> JournalServiceResult<ContentEntity> {
        if !item.is_consistent() {
            return Err(JournalServiceError::TypeMismatch {
                item_uuid: Some(item.uuid),
                declared: item.item_type,
                actual: item.content.kind,
            });
        }

        let content = self.items.load_content(item.content)?.ok_or(
            JournalServiceError::DanglingReference {
                item_uuid: item.uuid,
                content: item.content,
            },
        )?;

        if content.kind() != item.item_type || content.id() != item.content.id {
            return Err(JournalServiceError::TypeMismatch {
                item_uuid: Some(item.uuid),
                declared: item.item_type,
                actual: content.kind(),
            });
        }
        Ok(content)
    }

    /// Places `child_uuid` under `parent_uuid`.
    ///
    /// # Errors
    /// - `ItemNotFound` when either item is absent.
    /// - `CycleDetected` when `child_uuid` is `parent_uuid` or one of its ancestors.
    pub fn attach(
        &self,
        parent_uuid: JournalItemId,
        child_uuid: JournalItemId,
    ) -> JournalServiceResult<()> {
        self.require_item(child_uuid)?;
        self.require_item(parent_uuid)?;

        if self.would_create_cycle(child_uuid, parent_uuid)? {
            warn!(
                "event=journal_item_attach module=service status=error error_code=cycle_detected"
            );
            return Err(JournalServiceError::CycleDetected {
                child_uuid,
                parent_uuid,
            });
        }

        self.items.set_parent(child_uuid, Some(parent_uuid))?;
        info!("event=journal_item_attach module=service status=ok");
        Ok(())
    }

    /// Turns `child_uuid` back into a root item.
    pub fn detach(&self, child_uuid: JournalItemId) -> JournalServiceResult<()> {
        self.items.set_parent(child_uuid, None)?;
        Ok(())
    }

    /// Direct children of one item.
    pub fn list_children(&self, item_uuid: JournalItemId) -> JournalServiceResult<Vec<JournalItem>> {
        self.require_item(item_uuid)?;
        Ok(self.items.list_children(item_uuid)?)
    }

    /// All transitive descendants of one item, excluding the item.
    pub fn list_descendants(
        &self,
        item_uuid: JournalItemId,
    ) -> JournalServiceResult<Vec<JournalItem>> {
        self.require_item(item_uuid)?;
        Ok(self.items.list_descendants(item_uuid)?)
    }

    pub fn list_items(&self, query: &JournalItemQuery) -> JournalServiceResult<Vec<JournalItem>> {
        Ok(self.items.list_items(query)?)
    }

    /// Deletes one item and its whole subtree. Returns removed item count.
    pub fn delete_item(&self, item_uuid: JournalItemId) -> JournalServiceResult<usize> {
        let removed = self.items.delete_item(item_uuid)?;
        info!(
            "event=journal_item_delete module=service status=ok removed_items={}",
            removed
        );
        Ok(removed)
    }

    fn ensure_owner_exists(&self, owner_uuid: UserId) -> JournalServiceResult<()> {
        self.users
            .get_user(owner_uuid)?
            .ok_or(JournalServiceError::OwnerNotFound(owner_uuid))?;
        Ok(())
    }

    fn require_item(&self, item_uuid: JournalItemId) -> JournalServiceResult<JournalItem> {
        self.items
            .get_item(item_uuid)?
            .ok_or(JournalServiceError::ItemNotFound(item_uuid))
    }

    fn would_create_cycle(
        &self,
        child_uuid: JournalItemId,
        candidate_parent_uuid: JournalItemId,
    ) -> JournalServiceResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_uuid);
        while let Some(current) = cursor {
            if current == child_uuid {
                return Ok(true);
            }
            if !visited.insert(current) {
                return Ok(true);
            }
            cursor = self.require_item(current)?.parent_uuid;
        }
        Ok(false)
    }
}
