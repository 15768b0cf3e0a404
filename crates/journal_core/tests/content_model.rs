use journal_core::{
    ContentEntity, ContentRef, ContentValidationError, Event, ItemType, JournalItem, Note, Task,
    TITLE_MAX_CHARS,
};
use uuid::Uuid;

#[test]
fn new_task_defaults_to_open_without_deadline() {
    let task = Task::new("Walk the dog");

    assert!(!task.uuid.is_nil());
    assert_eq!(task.title, "Walk the dog");
    assert!(!task.completed);
    assert_eq!(task.deadline, None);
}

#[test]
fn content_entity_reports_variant_and_reference() {
    let event = Event::new("Saw a raccoon!");
    let event_id = event.uuid;
    let entity = ContentEntity::from(event);

    assert_eq!(entity.kind(), ItemType::Event);
    assert_eq!(entity.id(), event_id);
    assert_eq!(entity.title(), "Saw a raccoon!");
    assert_eq!(entity.content_ref(), ContentRef::new(ItemType::Event, event_id));
}

#[test]
fn item_type_codes_round_trip() {
    for kind in ItemType::ALL {
        assert_eq!(ItemType::from_code(kind.code()), Some(kind));
    }
    assert_eq!(ItemType::from_code("X"), None);
    assert_eq!(ItemType::Task.code(), "T");
}

#[test]
fn display_uses_id_and_title() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let note = Note {
        uuid: id,
        title: "Avoid Main St.".to_string(),
    };

    assert_eq!(
        note.to_string(),
        "11111111-2222-4333-8444-555555555555. Avoid Main St."
    );
    assert_eq!(ContentEntity::Note(note.clone()).to_string(), note.to_string());
}

#[test]
fn validate_rejects_nil_uuid_and_long_title() {
    let mut note = Note::new("ok");
    note.uuid = Uuid::nil();
    assert_eq!(
        ContentEntity::Note(note).validate(),
        Err(ContentValidationError::NilUuid)
    );

    let long_title = "x".repeat(TITLE_MAX_CHARS + 1);
    assert_eq!(
        ContentEntity::from(Task::new(long_title)).validate(),
        Err(ContentValidationError::TitleTooLong {
            len: TITLE_MAX_CHARS + 1,
            max: TITLE_MAX_CHARS,
        })
    );

    let exact_title = "y".repeat(TITLE_MAX_CHARS);
    assert!(ContentEntity::from(Task::new(exact_title)).validate().is_ok());
}

#[test]
fn journal_item_serialization_uses_expected_wire_fields() {
    let item_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let owner_id = Uuid::parse_str("22222222-3333-4444-8555-666666666666").unwrap();
    let object_id = Uuid::parse_str("33333333-4444-4555-8666-777777777777").unwrap();
    let item = JournalItem {
        uuid: item_id,
        item_type: ItemType::Task,
        owner_uuid: owner_id,
        content: ContentRef::new(ItemType::Task, object_id),
        parent_uuid: None,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_500,
    };

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["uuid"], item_id.to_string());
    assert_eq!(json["item_type"], "T");
    assert_eq!(json["owner_uuid"], owner_id.to_string());
    assert_eq!(json["content_type"], "T");
    assert_eq!(json["object_id"], object_id.to_string());
    assert!(json["parent_uuid"].is_null());

    let decoded: JournalItem = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, item);
    assert_eq!(
        decoded.to_string(),
        "Task item 11111111-2222-4333-8444-555555555555"
    );
}

#[test]
fn content_entity_serialization_is_tagged_by_variant() {
    let mut task = Task::new("Walk the dog");
    task.deadline = Some(1_700_000_360_000);

    let json = serde_json::to_value(ContentEntity::Task(task.clone())).unwrap();
    assert_eq!(json["type"], "task");
    assert_eq!(json["title"], "Walk the dog");
    assert_eq!(json["completed"], false);
    assert_eq!(json["deadline"], 1_700_000_360_000_i64);

    let decoded: ContentEntity = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, ContentEntity::Task(task));
}
