use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::thread;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use yatta::{open_database, FileTaskStore, Task, TaskStore, YattaError};

mod common;
use common::{contents, create_temp_file, FlakyDatabase};

fn open_store(path: &Path) -> FileTaskStore {
    FileTaskStore::open(open_database(path).unwrap()).expect("could not load task store")
}

fn task(id: u64, description: &str) -> Task {
    Task { id, description: description.to_string() }
}

#[test]
fn load_store_from_file() {
    let file = create_temp_file(
        r#"[
        {
          "User": "Alice",
          "Tasks": [
            {"ID": 0, "Description": "send message to Bob"},
            {"ID": 1, "Description": "upgrade encryption"},
            {"ID": 2, "Description": "read message from Bob"}
          ]
        },
        {
          "User": "Bob",
          "Tasks": [
            {"ID": 3, "Description": "read message from Alice"},
            {"ID": 4, "Description": "send message to Alice"}
          ]
        }
      ]"#,
    );
    let store = open_store(file.path());

    assert_eq!(
        store.get_tasks("Alice").unwrap(),
        Some(vec![
            task(0, "send message to Bob"),
            task(1, "upgrade encryption"),
            task(2, "read message from Bob"),
        ])
    );
    assert_eq!(
        store.get_tasks("Bob").unwrap(),
        Some(vec![task(3, "read message from Alice"), task(4, "send message to Alice")])
    );
}

#[test]
fn load_store_with_lowercase_field_names() {
    let file = create_temp_file(r#"[{"user": "Alice", "tasks": [{"ID": 7, "Description": "x"}]}]"#);
    let store = open_store(file.path());
    assert_eq!(store.get_tasks("Alice").unwrap(), Some(vec![task(7, "x")]));
}

#[test]
fn get_a_task_by_id() {
    let file = create_temp_file(
        r#"[{"User": "Alice", "Tasks": [
            {"ID": 1, "Description": "send message to Bob"},
            {"ID": 2, "Description": "upgrade encryption"},
            {"ID": 3, "Description": "read message from Bob"}
        ]}]"#,
    );
    let store = open_store(file.path());

    assert_eq!(store.get_task(1).unwrap(), Some(task(1, "send message to Bob")));
    assert_eq!(store.get_task(2).unwrap(), Some(task(2, "upgrade encryption")));
    assert_eq!(store.get_task(3).unwrap(), Some(task(3, "read message from Bob")));
}

#[test]
fn missing_user_and_task_are_absent_not_errors() {
    let file = create_temp_file("");
    let store = open_store(file.path());

    assert_eq!(store.get_tasks("nonexistent-user").unwrap(), None);
    assert_eq!(store.get_task(999999).unwrap(), None);
}

#[test]
fn user_with_empty_list_is_present() {
    let file = create_temp_file(r#"[{"User": "Alice", "Tasks": []}]"#);
    let store = open_store(file.path());
    assert_eq!(store.get_tasks("Alice").unwrap(), Some(vec![]));
}

#[test]
fn user_keys_are_case_sensitive() {
    let file = create_temp_file("");
    let store = open_store(file.path());
    store.add_task("Alice", "find the keys").unwrap();
    assert_eq!(store.get_tasks("alice").unwrap(), None);
}

#[test]
fn add_task_for_existing_user() {
    let file = create_temp_file(r#"[{"User": "Alice", "Tasks": []}]"#);
    let store = open_store(file.path());

    let added = store.add_task("Alice", "find the keys").unwrap();

    assert_eq!(added, task(1, "find the keys"));
    assert_eq!(store.get_tasks("Alice").unwrap(), Some(vec![task(1, "find the keys")]));
}

#[test]
fn add_task_for_new_user_in_empty_file() {
    let file = create_temp_file("");
    let store = open_store(file.path());

    store.add_task("Alice", "find the keys").unwrap();
    assert_eq!(store.get_tasks("Alice").unwrap(), Some(vec![task(1, "find the keys")]));

    store.add_task("Bob", "say a joke").unwrap();
    assert_eq!(store.get_task(2).unwrap(), Some(task(2, "say a joke")));
    assert_eq!(store.get_tasks("Alice").unwrap(), Some(vec![task(1, "find the keys")]));
}

#[test]
fn adding_multiple_tasks_increments_id_across_users() {
    let file = create_temp_file("[]");
    let store = open_store(file.path());

    let cases = [
        (1, "Alice", "find the keys"),
        (2, "Bob", "say a funny joke"),
        (3, "Alice", "lose the keys again"),
    ];
    for (_, user, description) in cases.iter() {
        store.add_task(user, description).unwrap();
    }

    for (id, _, description) in cases.iter() {
        assert_eq!(store.get_task(*id).unwrap(), Some(task(*id, description)));
    }
    assert_eq!(
        store.get_tasks("Alice").unwrap(),
        Some(vec![task(1, "find the keys"), task(3, "lose the keys again")])
    );
}

#[test]
fn ids_continue_after_the_largest_seeded_id() {
    let file = create_temp_file(
        r#"[{"User": "Alice", "Tasks": [{"ID": 9, "Description": "a"}, {"ID": 4, "Description": "b"}]}]"#,
    );
    let store = open_store(file.path());

    assert_eq!(store.add_task("Bob", "c").unwrap().id, 10);
}

#[test]
fn random_adds_always_get_fresh_increasing_ids() {
    let file = create_temp_file("");
    let store = open_store(file.path());
    let users = ["Alice", "Bob", "Carol", "Dave"];
    let mut rng = SmallRng::seed_from_u64(7);

    let mut last = 0;
    for i in 0..200 {
        let user = users[rng.gen_range(0..users.len())];
        let added = store.add_task(user, &format!("task {}", i)).unwrap();
        assert!(added.id > last);
        last = added.id;
    }
}

#[test]
fn added_tasks_survive_reopening() {
    let file = create_temp_file("");
    {
        let store = open_store(file.path());
        store.add_task("Alice", "find the keys").unwrap();
        store.add_task("Bob", "say a joke").unwrap();
    }

    let store = open_store(file.path());
    assert_eq!(store.get_tasks("Alice").unwrap(), Some(vec![task(1, "find the keys")]));
    assert_eq!(store.get_tasks("Bob").unwrap(), Some(vec![task(2, "say a joke")]));
    assert_eq!(store.add_task("Alice", "next").unwrap().id, 3);
}

#[test]
fn file_holds_exactly_one_document_after_each_add() {
    let file = create_temp_file(r#"[{"User": "Alice", "Tasks": [{"ID": 1, "Description": "a long, long description that takes up room"}]}]"#);
    let store = open_store(file.path());

    store.add_task("Bob", "x").unwrap();

    assert_eq!(
        contents(file.path()),
        r#"[{"User":"Alice","Tasks":[{"ID":1,"Description":"a long, long description that takes up room"}]},{"User":"Bob","Tasks":[{"ID":2,"Description":"x"}]}]"#
    );
}

#[test]
fn malformed_file_fails_to_open() {
    let file = create_temp_file("[{\"User\": \"Alice\", ");
    let result = FileTaskStore::open(open_database(file.path()).unwrap());
    assert!(matches!(result, Err(YattaError::Decode { .. })));
}

#[test]
fn failed_flush_leaves_the_mirror_unchanged() {
    let (db, fail_writes) = FlakyDatabase::new(r#"[{"User": "Alice", "Tasks": [{"ID": 1, "Description": "a"}]}]"#);
    let store = FileTaskStore::open(db).unwrap();

    fail_writes.store(true, Ordering::SeqCst);
    assert!(store.add_task("Alice", "b").is_err());
    assert!(store.add_task("Bob", "c").is_err());

    assert_eq!(store.get_tasks("Alice").unwrap(), Some(vec![task(1, "a")]));
    assert_eq!(store.get_tasks("Bob").unwrap(), None);
    assert_eq!(store.get_task(2).unwrap(), None);

    fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(store.add_task("Bob", "c").unwrap(), task(2, "c"));
}

#[test]
fn in_memory_database_works() {
    let store = FileTaskStore::open(Cursor::new(Vec::new())).unwrap();
    store.add_task("Alice", "a").unwrap();
    assert_eq!(store.get_task(1).unwrap(), Some(task(1, "a")));
}

#[test]
fn concurrent_adds_get_distinct_ids() {
    let file = create_temp_file("");
    let store = open_store(file.path());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|i| store.add_task(&format!("user-{}", t), &format!("task {}", i)).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "id {} was handed out twice", id);
        }
    }
    assert_eq!(ids, (1..=200).collect::<HashSet<u64>>());

    let reopened = open_store(file.path());
    for t in 0..8 {
        let user = format!("user-{}", t);
        assert_eq!(reopened.get_tasks(&user).unwrap(), store.get_tasks(&user).unwrap());
    }
}
