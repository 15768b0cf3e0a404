//! Journal owner model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
pub type UserId = Uuid;

/// Author that owns journal items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    /// Unique, trimmed, never blank.
    pub username: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}
