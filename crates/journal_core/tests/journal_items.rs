use journal_core::db::open_db_in_memory;
use journal_core::{
    ContentEntity, ContentRef, ContentService, Event, ItemType, JournalItemQuery,
    JournalItemRepository, JournalService, JournalServiceError, NewJournalItem, Note, RepoError,
    SqliteContentRepository, SqliteJournalItemRepository, SqliteUserRepository, Task, User,
};
use rusqlite::{params, Connection};
use uuid::Uuid;

type SqliteJournalService<'conn> =
    JournalService<SqliteUserRepository<'conn>, SqliteJournalItemRepository<'conn>>;

fn journal(conn: &Connection) -> SqliteJournalService<'_> {
    JournalService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteJournalItemRepository::try_new(conn).unwrap(),
    )
}

fn content(conn: &Connection) -> ContentService<SqliteContentRepository<'_>> {
    ContentService::new(SqliteContentRepository::try_new(conn).unwrap())
}

fn owner(service: &SqliteJournalService<'_>) -> User {
    service.register_user("alice").unwrap()
}

#[test]
fn create_item_wraps_persisted_content() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);

    let task = ContentEntity::from(content(&conn).create_task("Walk the dog", None).unwrap());
    let item = service
        .create_item(alice.uuid, ItemType::Task, &task, None)
        .unwrap();

    assert_eq!(item.item_type, ItemType::Task);
    assert_eq!(item.owner_uuid, alice.uuid);
    assert_eq!(item.content, task.content_ref());
    assert!(item.is_root());
    assert_eq!(service.get_item(item.uuid).unwrap(), item);
}

#[test]
fn resolve_returns_content_matching_item_type() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);
    let contents = content(&conn);

    let entities = [
        ContentEntity::from(contents.create_note("Avoid Main St.").unwrap()),
        ContentEntity::from(contents.create_task("Walk the dog", None).unwrap()),
        ContentEntity::from(contents.create_event("Saw a raccoon!", None, None).unwrap()),
    ];

    for entity in &entities {
        let item = service
            .create_item(alice.uuid, entity.kind(), entity, None)
            .unwrap();
        let resolved = service.resolve_content(&item).unwrap();
        assert_eq!(resolved.kind(), item.item_type);
        assert_eq!(&resolved, entity);
    }
}

#[test]
fn create_item_with_mismatched_type_reports_type_mismatch() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);

    let note = ContentEntity::from(content(&conn).create_note("Avoid Main St.").unwrap());
    let err = service
        .create_item(alice.uuid, ItemType::Event, &note, None)
        .unwrap_err();

    assert!(matches!(
        err,
        JournalServiceError::TypeMismatch {
            item_uuid: None,
            declared: ItemType::Event,
            actual: ItemType::Note,
        }
    ));
    assert!(service
        .list_items(&JournalItemQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn create_item_requires_owner_and_content() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);

    let stored = ContentEntity::from(content(&conn).create_note("stored").unwrap());
    let missing_owner = Uuid::new_v4();
    let err = service
        .create_item(missing_owner, ItemType::Note, &stored, None)
        .unwrap_err();
    assert!(matches!(err, JournalServiceError::OwnerNotFound(id) if id == missing_owner));

    let unsaved = ContentEntity::from(Note::new("never stored"));
    let err = service
        .create_item(alice.uuid, ItemType::Note, &unsaved, None)
        .unwrap_err();
    assert!(matches!(
        err,
        JournalServiceError::ContentNotFound(content_ref) if content_ref == unsaved.content_ref()
    ));

    let missing_parent = Uuid::new_v4();
    let err = service
        .create_item(alice.uuid, ItemType::Note, &stored, Some(missing_parent))
        .unwrap_err();
    assert!(matches!(err, JournalServiceError::ItemNotFound(id) if id == missing_parent));
}

#[test]
fn resolve_reports_dangling_reference_when_cascade_is_bypassed() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);

    let event = ContentEntity::from(Event::new("Saw a raccoon!"));
    let item = service.create_entry(alice.uuid, &event, None).unwrap();

    conn.execute(
        "DELETE FROM events WHERE uuid = ?1;",
        params![event.id().to_string()],
    )
    .unwrap();

    let err = service.resolve_content(&item).unwrap_err();
    assert!(matches!(
        err,
        JournalServiceError::DanglingReference { item_uuid, content }
            if item_uuid == item.uuid && content == event.content_ref()
    ));
}

#[test]
fn resolve_reports_type_mismatch_for_inconsistent_row() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);

    let note = ContentEntity::from(Note::new("Avoid Main St."));
    let item = service.create_entry(alice.uuid, &note, None).unwrap();

    conn.execute(
        "UPDATE journal_items SET item_type = 'E' WHERE uuid = ?1;",
        params![item.uuid.to_string()],
    )
    .unwrap();

    let corrupted = service.get_item(item.uuid).unwrap();
    assert!(!corrupted.is_consistent());
    let err = service.resolve_content(&corrupted).unwrap_err();
    assert!(matches!(
        err,
        JournalServiceError::TypeMismatch {
            item_uuid: Some(id),
            declared: ItemType::Event,
            actual: ItemType::Note,
        } if id == item.uuid
    ));
}

#[test]
fn create_entry_derives_discriminator_from_variant() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);

    let mut task = Task::new("Walk the dog");
    task.deadline = Some(1_700_000_000_000);
    let entity = ContentEntity::from(task);
    let item = service.create_entry(alice.uuid, &entity, None).unwrap();

    assert_eq!(item.item_type, ItemType::Task);
    assert_eq!(service.resolve_content(&item).unwrap(), entity);
}

#[test]
fn create_item_with_content_rolls_back_on_failure() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteJournalItemRepository::try_new(&conn).unwrap();

    let note = ContentEntity::from(Note::new("orphan"));
    let err = repo
        .create_item_with_content(
            &note,
            &NewJournalItem {
                owner_uuid: Uuid::new_v4(),
                item_type: ItemType::Note,
                content: note.content_ref(),
                parent_uuid: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    assert!(repo.load_content(note.content_ref()).unwrap().is_none());
}

#[test]
fn deleting_content_cascades_to_referencing_items() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);

    let note = ContentEntity::from(Note::new("Avoid Main St."));
    let first = service.create_entry(alice.uuid, &note, None).unwrap();
    let second = service
        .create_item(alice.uuid, ItemType::Note, &note, None)
        .unwrap();
    let survivor = service
        .create_entry(alice.uuid, &ContentEntity::from(Note::new("keep")), None)
        .unwrap();

    let removed = content(&conn).delete_content(note.content_ref()).unwrap();
    assert_eq!(removed, 2);

    assert!(matches!(
        service.get_item(first.uuid),
        Err(JournalServiceError::ItemNotFound(_))
    ));
    assert!(matches!(
        service.get_item(second.uuid),
        Err(JournalServiceError::ItemNotFound(_))
    ));
    assert_eq!(service.get_item(survivor.uuid).unwrap(), survivor);
}

#[test]
fn list_items_filters_by_owner_type_and_content() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);
    let bob = service.register_user("bob").unwrap();

    let task = ContentEntity::from(Task::new("Walk the dog"));
    let task_item = service.create_entry(alice.uuid, &task, None).unwrap();
    let note_item = service
        .create_entry(alice.uuid, &ContentEntity::from(Note::new("Avoid Main St.")), None)
        .unwrap();
    let bob_item = service
        .create_entry(bob.uuid, &ContentEntity::from(Note::new("Bob's note")), None)
        .unwrap();

    let alice_items = service
        .list_items(&JournalItemQuery {
            owner_uuid: Some(alice.uuid),
            ..JournalItemQuery::default()
        })
        .unwrap();
    assert_eq!(alice_items.len(), 2);

    let notes = service
        .list_items(&JournalItemQuery {
            item_type: Some(ItemType::Note),
            ..JournalItemQuery::default()
        })
        .unwrap();
    let note_ids = notes.iter().map(|item| item.uuid).collect::<Vec<_>>();
    assert_eq!(note_ids, vec![note_item.uuid, bob_item.uuid]);

    let by_content = service
        .list_items(&JournalItemQuery {
            content: Some(task.content_ref()),
            item_type: Some(ItemType::Task),
            ..JournalItemQuery::default()
        })
        .unwrap();
    assert_eq!(by_content, vec![task_item]);

    let paged = service
        .list_items(&JournalItemQuery {
            limit: Some(1),
            offset: 1,
            ..JournalItemQuery::default()
        })
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].uuid, note_item.uuid);
}

#[test]
fn removing_owner_cascades_to_owned_items() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);
    let alice = owner(&service);
    let bob = service.register_user("bob").unwrap();

    service
        .create_entry(alice.uuid, &ContentEntity::from(Note::new("mine")), None)
        .unwrap();
    let bob_item = service
        .create_entry(bob.uuid, &ContentEntity::from(Note::new("bob's")), None)
        .unwrap();

    assert_eq!(service.remove_user(alice.uuid).unwrap(), 1);
    assert!(service.get_user(alice.uuid).unwrap().is_none());

    let remaining = service.list_items(&JournalItemQuery::default()).unwrap();
    assert_eq!(remaining, vec![bob_item]);

    let err = service.remove_user(alice.uuid).unwrap_err();
    assert!(matches!(err, JournalServiceError::OwnerNotFound(id) if id == alice.uuid));
}

#[test]
fn register_user_trims_and_rejects_blank_or_duplicate_names() {
    let conn = open_db_in_memory().unwrap();
    let service = journal(&conn);

    let alice = service.register_user("  alice ").unwrap();
    assert_eq!(alice.username, "alice");

    assert!(matches!(
        service.register_user("   "),
        Err(JournalServiceError::InvalidUsername)
    ));
    assert!(matches!(
        service.register_user("alice"),
        Err(JournalServiceError::DuplicateUsername(name)) if name == "alice"
    ));
}

#[test]
fn unknown_content_ref_resolves_to_none_in_repository() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteJournalItemRepository::try_new(&conn).unwrap();

    let missing = ContentRef::new(ItemType::Task, Uuid::new_v4());
    assert!(repo.load_content(missing).unwrap().is_none());
}
