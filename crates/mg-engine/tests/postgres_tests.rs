//! Tests against a live Postgres server.
//!
//! Ignored by default. Point `MG_TEST_DATABASE_URL` at a scratch database
//! and run with `--ignored`.

use mg_core::{FnMigration, Registry};
use mg_db::{ConnectionSettings, Database, PostgresBackend};
use mg_engine::{Migrator, RunStatus};
use std::env;

const LOCK_KEY: i64 = 915_001;

fn settings() -> ConnectionSettings {
    let url = env::var("MG_TEST_DATABASE_URL")
        .expect("MG_TEST_DATABASE_URL must be set for Postgres tests");
    ConnectionSettings::new(url)
}

fn reset(db: &mut PostgresBackend) {
    db.execute_batch(
        "DROP TABLE IF EXISTS migrator; DROP TABLE IF EXISTS mg_it_users; DROP TABLE IF EXISTS mg_it_broken",
    )
    .unwrap();
}

fn registry(fail_second: bool) -> Registry {
    let mut registry = Registry::new();
    registry
        .register(|| {
            FnMigration::new("create_users").id(1).up(|b| {
                b.push("CREATE TABLE mg_it_users (id integer PRIMARY KEY)");
            })
        })
        .register(move || {
            FnMigration::new("broken").id(2).up(move |b| {
                b.push("CREATE TABLE mg_it_broken (id integer)");
                if fail_second {
                    b.push("SELECT * FROM mg_it_does_not_exist");
                }
            })
        });
    registry
}

#[test]
#[ignore]
fn test_run_against_postgres() {
    let settings = settings();
    let mut db = PostgresBackend::connect(&settings).unwrap();
    reset(&mut db);

    let migrator = Migrator::new(registry(true)).with_lock_key(LOCK_KEY);
    let report = migrator.run_postgres(&settings).unwrap();

    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.failure().map(|f| f.id.get()), Some(2));
    // the failing unit's first statement was rolled back with it
    assert!(!db
        .query_bool("SELECT to_regclass('mg_it_broken') IS NOT NULL")
        .unwrap());
    assert_eq!(
        db.query_i32_column("SELECT migration_id FROM migrator ORDER BY migration_id")
            .unwrap(),
        vec![1]
    );

    let report = Migrator::new(registry(false))
        .with_lock_key(LOCK_KEY)
        .run_postgres(&settings)
        .unwrap();
    assert!(report.success());
    assert_eq!(report.applied.len(), 1);

    reset(&mut db);
    db.close().unwrap();
}

#[test]
#[ignore]
fn test_lock_held_by_other_session() {
    let settings = settings();
    let mut holder = PostgresBackend::connect(&settings).unwrap();
    assert!(holder
        .query_bool(&format!("SELECT pg_try_advisory_lock({LOCK_KEY})"))
        .unwrap());

    let report = Migrator::new(registry(false))
        .with_lock_key(LOCK_KEY)
        .run_postgres(&settings)
        .unwrap();
    assert!(matches!(report.status, RunStatus::LockDenied));

    holder.close().unwrap();
}
