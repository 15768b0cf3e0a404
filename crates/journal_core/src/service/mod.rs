//! Use-case services for journal content and items.
//!
//! # Responsibility
//! - Enforce journal invariants above the repository layer.
//! - Keep services storage-agnostic through repository traits.

pub mod content_service;
pub mod journal_service;
