//! Domain model for journal content and the items that wrap it.
//!
//! # Responsibility
//! - Define content entities (note/task/event) as one tagged union.
//! - Define the journal item wrapper and its owner.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - A journal item's discriminator matches the variant it references.

pub mod content;
pub mod journal_item;
pub mod user;
