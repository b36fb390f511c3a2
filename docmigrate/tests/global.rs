use docmigrate::{ALL_AVAILABLE, MigrateError, MigrateResult, RedisStore, global, no_action};
use serial_test::serial;

#[path = "global/1_seed_catalog.rs"]
mod seed_catalog;

#[path = "global/2_catalog_index.rs"]
mod catalog_index;

fn noop(_: RedisStore) -> std::future::Ready<MigrateResult<()>> {
    std::future::ready(Ok(()))
}

#[test]
#[serial]
fn submitted_migrations_are_collected() {
    assert!(global::init() >= 2);

    let migrations = global::registered_migrations();
    let seed = migrations.iter().find(|m| m.version == 1).expect("seed migration");
    assert_eq!(seed.description, "seed_catalog");
    assert!(seed.up.is_some() && seed.down.is_some());

    let index = migrations.iter().find(|m| m.version == 2).expect("index migration");
    assert_eq!(index.description, "catalog_index");
}

#[test]
#[serial]
fn runtime_registration_rejects_duplicates() {
    global::register("100_runtime_noop", Some(noop), no_action()).unwrap();
    assert!(global::registered_migrations().iter().any(|m| m.version == 100));

    let err = global::register("100_again", Some(noop), no_action()).unwrap_err();
    assert!(matches!(err, MigrateError::DuplicateVersion { version: 100 }));

    // collides with a submitted migration
    let err = global::register("1_conflict", Some(noop), no_action()).unwrap_err();
    assert!(matches!(err, MigrateError::DuplicateVersion { version: 1 }));

    let described: Vec<_> = global::registered_migrations()
        .into_iter()
        .filter(|m| m.version == 100)
        .map(|m| m.description)
        .collect();
    assert_eq!(described, vec!["runtime_noop".to_string()]);
}

#[test]
#[serial]
fn malformed_identity_is_rejected() {
    let before = global::registered_migrations().len();

    let err = global::register("bad", Some(noop), Some(noop)).unwrap_err();
    assert!(matches!(err, MigrateError::InvalidIdentifier { .. }));

    let err = global::register_source(file!(), Some(noop), Some(noop)).unwrap_err();
    assert!(matches!(err, MigrateError::InvalidIdentifier { .. }));

    assert_eq!(global::registered_migrations().len(), before);
}

#[test]
#[serial]
#[should_panic(expected = "failed to register migration")]
fn must_register_panics_on_bad_identity() {
    global::must_register("bad", Some(noop), Some(noop));
}

#[test]
#[serial]
fn registered_migrations_is_a_copy() {
    let mut copy = global::registered_migrations();
    copy.clear();
    assert!(!global::registered_migrations().is_empty());
}

#[tokio::test]
#[serial]
async fn replay_requires_database() {
    assert!(matches!(global::version().await, Err(MigrateError::DatabaseNotSet)));
    assert!(matches!(global::up(ALL_AVAILABLE).await, Err(MigrateError::DatabaseNotSet)));
    assert!(matches!(global::down(ALL_AVAILABLE).await, Err(MigrateError::DatabaseNotSet)));
}
