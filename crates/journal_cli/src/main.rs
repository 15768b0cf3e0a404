//! CLI demo entry point.
//!
//! # Responsibility
//! - Verify `journal_core` linkage with a deterministic walkthrough.
//! - Build a small task/note/event item tree and print how it resolves.
//!
//! Usage: `journal_cli [DB_PATH]`. Without a path an in-memory database is
//! used. Set `JOURNAL_LOG_DIR` (absolute) to enable file logging; the level
//! comes from `JOURNAL_LOG_LEVEL` or the build default.

use journal_core::db::{open_db, open_db_in_memory};
use journal_core::{
    default_log_level, init_logging, ContentEntity, Event, JournalItem, JournalItemQuery,
    JournalService, JournalServiceError, Note, SqliteJournalItemRepository, SqliteUserRepository,
    Task, UserRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

const DEMO_USERNAME: &str = "journal-demo";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("journal_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("JOURNAL_LOG_DIR") {
        let level = std::env::var("JOURNAL_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, &log_dir)?;
    }

    println!("journal_core version={}", journal_core::core_version());

    let conn = match std::env::args().nth(1) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let service = JournalService::new(
        SqliteUserRepository::try_new(&conn)?,
        SqliteJournalItemRepository::try_new(&conn)?,
    );

    let owner = match service.register_user(DEMO_USERNAME) {
        Ok(user) => user,
        Err(JournalServiceError::DuplicateUsername(_)) => {
            // Re-running against a file database reuses the demo owner.
            SqliteUserRepository::try_new(&conn)?
                .find_user_by_username(DEMO_USERNAME)?
                .ok_or("demo user vanished")?
        }
        Err(err) => return Err(err.into()),
    };
    info!("event=cli_demo module=cli status=start");

    let task = ContentEntity::from(Task::new("Walk the dog"));
    let first_note = ContentEntity::from(Note::new("Avoid Main St."));
    let second_note = ContentEntity::from(Note::new("Bring flashlight"));
    let event = ContentEntity::from(Event::new("Saw a raccoon!"));

    let task_item = service.create_entry(owner.uuid, &task, None)?;
    let first_note_item = service.create_entry(owner.uuid, &first_note, None)?;
    let second_note_item = service.create_entry(owner.uuid, &second_note, None)?;
    let event_item = service.create_entry(owner.uuid, &event, None)?;

    for item in [&task_item, &first_note_item, &second_note_item, &event_item] {
        println!("{item} -> {}", service.resolve_content(item)?);
    }

    service.attach(task_item.uuid, event_item.uuid)?;
    let event_item = service.get_item(event_item.uuid)?;
    println!("parent of event item: {:?}", event_item.parent_uuid);
    print_children(&service, &task_item)?;

    service.attach(task_item.uuid, first_note_item.uuid)?;
    print_children(&service, &task_item)?;

    let task_items = service.list_items(&JournalItemQuery {
        content: Some(task.content_ref()),
        ..JournalItemQuery::default()
    })?;
    println!("items wrapping task {}: {}", task.id(), task_items.len());

    info!("event=cli_demo module=cli status=ok");
    Ok(())
}

fn print_children(
    service: &JournalService<SqliteUserRepository<'_>, SqliteJournalItemRepository<'_>>,
    parent: &JournalItem,
) -> Result<(), Box<dyn Error>> {
    let children = service.list_children(parent.uuid)?;
    let labels = children
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    println!("children of {parent}: [{}]", labels.join(", "));
    Ok(())
}
