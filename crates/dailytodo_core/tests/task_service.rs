use chrono::{TimeZone, Utc};
use dailytodo_core::db::open_db_in_memory;
use dailytodo_core::{
    example_tasks, MemoryKeyValueStore, SqliteKeyValueStore, StoreError, TaskDraft,
    TaskRepository, TaskService, TaskStore,
};
use uuid::Uuid;

fn memory_service() -> TaskService<TaskStore<MemoryKeyValueStore>> {
    TaskService::new(TaskStore::new(MemoryKeyValueStore::new()))
}

#[test]
fn create_task_persists_draft_fields() {
    let service = memory_service();
    let deadline = Utc.with_ymd_and_hms(2024, 12, 24, 17, 0, 0).unwrap();
    let draft = TaskDraft {
        time_estimate: 90,
        deadline: Some(deadline),
        ..TaskDraft::new("Wrap presents", "all of them")
    };

    let id = service.create_task(draft).unwrap();

    let task = service.get_task(id).unwrap().unwrap();
    assert_eq!(task.name, "Wrap presents");
    assert_eq!(task.time_estimate, 90);
    assert_eq!(task.deadline, Some(deadline));
    assert!(!task.done);
}

#[test]
fn create_task_rejects_blank_name_without_writing() {
    let service = memory_service();

    let err = service.create_task(TaskDraft::new("", "desc")).unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn set_done_and_toggle_done_update_the_record() {
    let service = memory_service();
    let id = service.create_task(TaskDraft::new("Workout", "")).unwrap();

    assert!(service.set_done(id, true).unwrap());
    assert!(service.get_task(id).unwrap().unwrap().done);

    assert_eq!(service.toggle_done(id).unwrap(), Some(false));
    assert!(!service.get_task(id).unwrap().unwrap().done);
}

#[test]
fn completion_changes_on_missing_id_are_noops() {
    let service = memory_service();
    service.create_task(TaskDraft::new("Keep", "")).unwrap();
    let before = service.list_tasks().unwrap();

    let missing = Uuid::new_v4();
    assert!(!service.set_done(missing, true).unwrap());
    assert_eq!(service.toggle_done(missing).unwrap(), None);
    assert!(!service.delete_task(missing).unwrap());

    assert_eq!(service.list_tasks().unwrap(), before);
}

#[test]
fn edit_task_keeps_position_and_id() {
    let service = memory_service();
    let first = service.create_task(TaskDraft::new("one", "")).unwrap();
    let second = service.create_task(TaskDraft::new("two", "")).unwrap();

    let mut edited = service.get_task(first).unwrap().unwrap();
    edited.description = "edited".to_string();
    assert!(service.edit_task(&edited).unwrap());

    let ids: Vec<_> = service
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(
        service.get_task(first).unwrap().unwrap().description,
        "edited"
    );
}

#[test]
fn delete_task_reports_removal() {
    let service = memory_service();
    let id = service.create_task(TaskDraft::new("gone", "")).unwrap();

    assert!(service.delete_task(id).unwrap());
    assert!(!service.delete_task(id).unwrap());
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn seeding_examples_creates_them_in_order() {
    let conn = open_db_in_memory().unwrap();
    let store = TaskStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let service = TaskService::new(store);

    let ids = service.seed_tasks(example_tasks()).unwrap();

    let tasks = service.list_tasks().unwrap();
    assert_eq!(ids.len(), 5);
    assert_eq!(
        tasks.iter().map(|task| task.id).collect::<Vec<_>>(),
        ids
    );
    assert_eq!(tasks[0].name, "Clean Apartment");
    assert!(tasks[0].done);
    assert_eq!(tasks[4].name, "Plan Weekend Trip");
    assert_eq!(tasks.iter().filter(|task| task.done).count(), 1);
}

#[test]
fn service_and_store_share_one_persisted_list() {
    let slots = MemoryKeyValueStore::new();
    let service = TaskService::new(TaskStore::new(&slots));
    let id = service.create_task(TaskDraft::new("shared", "")).unwrap();

    let direct = TaskStore::new(&slots);
    assert_eq!(direct.load_all().unwrap()[0].id, id);
}
