//! Content use-case service.
//!
//! # Responsibility
//! - Provide create/read/update/delete entry points for notes, tasks and events.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - New tasks start with `completed = false`.

use crate::model::content::{ContentEntity, ContentId, ContentRef, Event, ItemType, Note, Task};
use crate::repo::content_repo::ContentRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Use-case service wrapper for content CRUD.
pub struct ContentService<R: ContentRepository> {
    repo: R,
}

impl<R: ContentRepository> ContentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists an already-built content entity.
    pub fn create_content(&self, content: &ContentEntity) -> RepoResult<ContentRef> {
        self.repo.create_content(content)
    }

    pub fn create_note(&self, title: impl Into<String>) -> RepoResult<Note> {
        let note = Note::new(title);
        self.repo.create_content(&ContentEntity::Note(note.clone()))?;
        Ok(note)
    }

    /// Creates an open task with an optional deadline (epoch ms).
    pub fn create_task(&self, title: impl Into<String>, deadline: Option<i64>) -> RepoResult<Task> {
        let mut task = Task::new(title);
        task.deadline = deadline;
        self.repo.create_content(&ContentEntity::Task(task.clone()))?;
        Ok(task)
    }

    /// Creates an event; point events leave `end_date` empty.
    pub fn create_event(
        &self,
        title: impl Into<String>,
        start_date: Option<i64>,
        end_date: Option<i64>,
    ) -> RepoResult<Event> {
        let mut event = Event::new(title);
        event.start_date = start_date;
        event.end_date = end_date;
        self.repo.create_content(&ContentEntity::Event(event.clone()))?;
        Ok(event)
    }

    pub fn get_content(&self, content_ref: ContentRef) -> RepoResult<Option<ContentEntity>> {
        self.repo.get_content(content_ref)
    }

    /// Replaces an existing entity. Returns `NotFound` when no row matches.
    pub fn update_content(&self, content: &ContentEntity) -> RepoResult<()> {
        self.repo.update_content(content)
    }

    /// Flips the completion flag of one task and returns the stored task.
    pub fn set_task_completed(&self, id: ContentId, completed: bool) -> RepoResult<Task> {
        let mut task = match self.repo.get_content(ContentRef::new(ItemType::Task, id))? {
            Some(ContentEntity::Task(task)) => task,
            Some(other) => {
                return Err(RepoError::InvalidData(format!(
                    "tasks table returned {} content for {id}",
                    other.kind()
                )))
            }
            None => {
                return Err(RepoError::NotFound {
                    entity: "task",
                    id,
                })
            }
        };

        task.completed = completed;
        self.repo
            .update_content(&ContentEntity::Task(task.clone()))?;
        Ok(task)
    }

    pub fn list_content(&self, kind: ItemType) -> RepoResult<Vec<ContentEntity>> {
        self.repo.list_content(kind)
    }

    /// Deletes one entity and every journal item subtree referencing it.
    ///
    /// Returns the number of journal items removed by the cascade.
    pub fn delete_content(&self, content_ref: ContentRef) -> RepoResult<usize> {
        let removed_items = self.repo.delete_content(content_ref)?;
        info!(
            "event=content_delete module=service status=ok content_type={} removed_items={}",
            content_ref.kind.code(),
            removed_items
        );
        Ok(removed_items)
    }
}
