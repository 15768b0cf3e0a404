//! Journal item model: polymorphic wrapper plus tree position.
//!
//! # Responsibility
//! - Bind an owner, a discriminator and a content reference together.
//! - Carry the optional parent link that places an item in the forest.
//!
//! # Invariants
//! - `item_type` must equal `content.kind` for a consistent item.
//! - `parent_uuid` never points at the item itself or one of its descendants.

use crate::model::content::{ContentRef, ItemType};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable journal item identifier.
pub type JournalItemId = Uuid;

/// Persisted journal item read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalItem {
    pub uuid: JournalItemId,
    /// Declared discriminator of the wrapped content.
    pub item_type: ItemType,
    /// Author of the item.
    pub owner_uuid: UserId,
    /// `(content_type, object_id)` pointer into one content table.
    #[serde(flatten)]
    pub content: ContentRef,
    /// `None` means root-level item.
    pub parent_uuid: Option<JournalItemId>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl JournalItem {
    /// Returns whether the declared discriminator agrees with the reference.
    pub fn is_consistent(&self) -> bool {
        self.item_type == self.content.kind
    }

    pub fn is_root(&self) -> bool {
        self.parent_uuid.is_none()
    }
}

impl Display for JournalItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} item {}", self.item_type.label(), self.uuid)
    }
}

/// Insert request for one journal item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewJournalItem {
    pub owner_uuid: UserId,
    pub item_type: ItemType,
    pub content: ContentRef,
    pub parent_uuid: Option<JournalItemId>,
}
