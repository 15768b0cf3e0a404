use journal_core::db::open_db_in_memory;
use journal_core::{
    ContentEntity, ContentRef, ContentRepository, ContentService, ItemType, Note, RepoError,
    SqliteContentRepository, TITLE_MAX_CHARS,
};
use uuid::Uuid;

#[test]
fn create_and_get_each_variant() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::try_new(&conn).unwrap());

    let note = service.create_note("Avoid Main St.").unwrap();
    let task = service
        .create_task("Walk the dog", Some(1_700_000_000_000))
        .unwrap();
    let event = service
        .create_event("Saw a raccoon!", Some(1_700_000_000_000), None)
        .unwrap();

    let loaded_note = service
        .get_content(ContentRef::new(ItemType::Note, note.uuid))
        .unwrap()
        .unwrap();
    assert_eq!(loaded_note, ContentEntity::Note(note));

    let loaded_task = service
        .get_content(ContentRef::new(ItemType::Task, task.uuid))
        .unwrap()
        .unwrap();
    match loaded_task {
        ContentEntity::Task(loaded) => {
            assert_eq!(loaded.title, "Walk the dog");
            assert!(!loaded.completed);
            assert_eq!(loaded.deadline, Some(1_700_000_000_000));
        }
        other => panic!("unexpected variant: {other:?}"),
    }

    let loaded_event = service
        .get_content(ContentRef::new(ItemType::Event, event.uuid))
        .unwrap()
        .unwrap();
    assert_eq!(loaded_event, ContentEntity::Event(event));
}

#[test]
fn lookup_with_wrong_tag_finds_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::try_new(&conn).unwrap());

    let note = service.create_note("Bring flashlight").unwrap();

    let loaded = service
        .get_content(ContentRef::new(ItemType::Event, note.uuid))
        .unwrap();
    assert!(loaded.is_none());
}

#[test]
fn update_replaces_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::try_new(&conn).unwrap());

    let mut event = service.create_event("Standup", None, None).unwrap();
    event.title = "Standup (moved)".to_string();
    event.start_date = Some(1_700_000_000_000);
    event.end_date = Some(1_700_000_900_000);
    service
        .update_content(&ContentEntity::Event(event.clone()))
        .unwrap();

    let loaded = service
        .get_content(ContentRef::new(ItemType::Event, event.uuid))
        .unwrap()
        .unwrap();
    assert_eq!(loaded, ContentEntity::Event(event));
}

#[test]
fn update_missing_row_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::try_new(&conn).unwrap();

    let ghost = Note::new("never stored");
    let ghost_id = ghost.uuid;
    let err = repo.update_content(&ContentEntity::Note(ghost)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { entity: "note", id } if id == ghost_id
    ));
}

#[test]
fn set_task_completed_persists_flag() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::try_new(&conn).unwrap());

    let task = service.create_task("Walk the dog", None).unwrap();
    let updated = service.set_task_completed(task.uuid, true).unwrap();
    assert!(updated.completed);

    let loaded = service
        .get_content(ContentRef::new(ItemType::Task, task.uuid))
        .unwrap()
        .unwrap();
    assert!(matches!(loaded, ContentEntity::Task(task) if task.completed));

    let missing = Uuid::new_v4();
    let err = service.set_task_completed(missing, true).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "task", id } if id == missing));
}

#[test]
fn create_rejects_title_over_limit() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::try_new(&conn).unwrap());

    let err = service
        .create_note("n".repeat(TITLE_MAX_CHARS + 1))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(service.list_content(ItemType::Note).unwrap().is_empty());
}

#[test]
fn list_content_returns_only_requested_variant_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::try_new(&conn).unwrap());

    let first = service.create_note("Avoid Main St.").unwrap();
    service.create_task("Walk the dog", None).unwrap();
    let second = service.create_note("Bring flashlight").unwrap();

    let notes = service.list_content(ItemType::Note).unwrap();
    let ids = notes.iter().map(ContentEntity::id).collect::<Vec<_>>();
    assert_eq!(ids, vec![first.uuid, second.uuid]);
    assert_eq!(service.list_content(ItemType::Task).unwrap().len(), 1);
    assert!(service.list_content(ItemType::Event).unwrap().is_empty());
}

#[test]
fn delete_missing_content_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::try_new(&conn).unwrap());

    let missing = ContentRef::new(ItemType::Event, Uuid::new_v4());
    let err = service.delete_content(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "event", .. }));
}
