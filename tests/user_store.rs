use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::Ordering;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use yatta::{open_database, FileUserStore, PasswordHash, User, UserStore, YattaError};

mod common;
use common::{create_temp_file, FlakyDatabase};

fn open_store(path: &Path) -> FileUserStore {
    FileUserStore::open(open_database(path).unwrap()).expect("could not create FileUserStore")
}

fn user(id: u64, email: &str, password: &str) -> User {
    User {
        id,
        email: email.to_string(),
        password: PasswordHash::from_encoded(password),
    }
}

#[test]
fn load_store_from_file() {
    let file = create_temp_file(
        r#"[
        {"ID": 0, "Email": "alice@example.com", "Password": "averysecretpassword"},
        {"ID": 1, "Email": "bob@example.com", "Password": "anotherverysecretpassword"}
      ]"#,
    );
    let store = open_store(file.path());

    let want = vec![
        user(0, "alice@example.com", "averysecretpassword"),
        user(1, "bob@example.com", "anotherverysecretpassword"),
    ];
    for u in &want {
        assert_eq!(store.get_user(u.id).unwrap().as_ref(), Some(u));
    }
    assert_eq!(store.get_users().unwrap(), want);
}

#[test]
fn adding_new_user_updates_store_and_database_file() {
    let file = create_temp_file("");
    let store = open_store(file.path());
    let hash = PasswordHash::new("averysecretpassword", PasswordHash::MIN_COST).unwrap();

    let added = store.add_user("test@example.com", hash.clone()).unwrap();

    let want = User { id: 1, email: "test@example.com".to_string(), password: hash };
    assert_eq!(added, want);
    assert_eq!(store.get_user(1).unwrap(), Some(want.clone()));

    let store_after_add = open_store(file.path());
    assert_eq!(store_after_add.get_users().unwrap(), vec![want.clone()]);
    assert!(store_after_add.get_user(1).unwrap().unwrap().password.verify("averysecretpassword").is_ok());
}

#[test]
fn adding_users_increments_id() {
    let file = create_temp_file("");
    let store = open_store(file.path());

    let first = store.add_user("test@example.com", PasswordHash::from_encoded("h1")).unwrap();
    let second = store.add_user("test2@example.com", PasswordHash::from_encoded("h2")).unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(store.get_users().unwrap(), vec![first, second]);
}

#[test]
fn random_adds_always_get_fresh_increasing_ids() {
    let file = create_temp_file("");
    let store = open_store(file.path());
    let domains = ["example.com", "example.org", "mail.test"];
    let mut rng = SmallRng::seed_from_u64(11);

    let mut last = 0;
    for i in 0..100 {
        let email = format!("user{}@{}", rng.gen_range(0..20), domains[rng.gen_range(0..domains.len())]);
        let added = store.add_user(&email, PasswordHash::from_encoded(format!("h{}", i))).unwrap();
        assert!(added.id > last);
        last = added.id;
    }
    assert_eq!(store.get_users().unwrap().len(), 100);
}

#[test]
fn ids_continue_after_the_largest_seeded_id() {
    let file = create_temp_file(r#"[{"ID": 5, "Email": "a@example.com", "Password": "h"}]"#);
    let store = open_store(file.path());
    assert_eq!(store.add_user("b@example.com", PasswordHash::from_encoded("h")).unwrap().id, 6);
}

#[test]
fn missing_user_is_absent() {
    let file = create_temp_file("");
    let store = open_store(file.path());
    assert_eq!(store.get_user(42).unwrap(), None);
    assert!(store.get_users().unwrap().is_empty());
}

#[test]
fn email_in_use_is_exact_and_case_sensitive() {
    let file = create_temp_file("");
    let store = open_store(file.path());
    store.add_user("alice@example.com", PasswordHash::from_encoded("h")).unwrap();

    assert!(store.email_in_use("alice@example.com"));
    assert!(!store.email_in_use("Alice@example.com"));
    assert!(!store.email_in_use("bob@example.com"));
}

#[test]
fn store_accepts_duplicate_emails_when_called_directly() {
    let store = FileUserStore::open(Cursor::new(Vec::new())).unwrap();
    store.add_user("alice@example.com", PasswordHash::from_encoded("h1")).unwrap();
    store.add_user("alice@example.com", PasswordHash::from_encoded("h2")).unwrap();
    assert_eq!(store.get_users().unwrap().len(), 2);
}

#[test]
fn failed_flush_leaves_the_mirror_unchanged() {
    let (db, fail_writes) = FlakyDatabase::new("");
    let store = FileUserStore::open(db).unwrap();

    fail_writes.store(true, Ordering::SeqCst);
    let err = store.add_user("alice@example.com", PasswordHash::from_encoded("h")).unwrap_err();

    assert!(matches!(err, YattaError::Database { .. }));
    assert!(!store.email_in_use("alice@example.com"));
    assert_eq!(store.get_user(1).unwrap(), None);
}

#[test]
fn malformed_file_fails_to_open() {
    let file = create_temp_file("not json");
    let result = FileUserStore::open(open_database(file.path()).unwrap());
    assert!(matches!(result, Err(YattaError::Decode { .. })));
}
