use super::*;

struct CreateAccounts;

impl Migration for CreateAccounts {
    fn id(&self) -> Option<i32> {
        Some(3)
    }

    fn up(&self, batch: &mut StatementBatch) {
        batch
            .push("CREATE TABLE accounts (id integer)")
            .push("CREATE INDEX accounts_id ON accounts (id)");
    }
}

#[test]
fn test_batch_preserves_order() {
    let mut batch = StatementBatch::new();
    batch.push("A").extend(["B", "C"]).push(String::from("D"));
    let stmts: Vec<&str> = batch.iter().collect();
    assert_eq!(stmts, vec!["A", "B", "C", "D"]);
    assert_eq!(batch.len(), 4);
    assert!(!batch.is_empty());
}

#[test]
fn test_trait_default_name_is_type_name() {
    let unit = CreateAccounts;
    assert!(unit.name().ends_with("CreateAccounts"));
}

#[test]
fn test_trait_default_down_is_noop() {
    let mut batch = StatementBatch::new();
    CreateAccounts.down(&mut batch);
    assert!(batch.is_empty());
}

#[test]
fn test_struct_unit_up() {
    let mut batch = StatementBatch::new();
    CreateAccounts.up(&mut batch);
    assert_eq!(batch.into_statements().len(), 2);
}

#[test]
fn test_fn_migration_without_id() {
    let unit = FnMigration::new("no_id").up(|b| {
        b.push("SELECT 1");
    });
    assert!(Migration::id(&unit).is_none());
    assert_eq!(Migration::name(&unit), "no_id");
}

#[test]
fn test_fn_migration_keeps_negative_id() {
    let unit = FnMigration::new("neg").id(-5);
    assert_eq!(Migration::id(&unit), Some(-5));
}

#[test]
fn test_fn_migration_up_and_down() {
    let unit = FnMigration::new("users")
        .id(9)
        .up(|b| {
            b.push("CREATE TABLE users (id integer)");
        })
        .down(|b| {
            b.push("DROP TABLE users");
        });

    assert_eq!(Migration::id(&unit), Some(9));
    assert!(unit.has_down());

    let mut up = StatementBatch::new();
    Migration::up(&unit, &mut up);
    assert_eq!(up.iter().next(), Some("CREATE TABLE users (id integer)"));

    let mut down = StatementBatch::new();
    Migration::down(&unit, &mut down);
    assert_eq!(down.iter().next(), Some("DROP TABLE users"));
}

#[test]
fn test_fn_migration_default_up_is_empty() {
    let unit = FnMigration::new("empty").id(1);
    let mut batch = StatementBatch::new();
    Migration::up(&unit, &mut batch);
    assert!(batch.is_empty());
    assert!(!unit.has_down());
}

#[test]
fn test_fn_migration_through_trait_object() {
    let unit: Box<dyn Migration> = Box::new(FnMigration::new("boxed").id(4).up(|b| {
        b.push("SELECT 4");
    }));
    let mut batch = StatementBatch::new();
    unit.up(&mut batch);
    assert_eq!(unit.id(), Some(4));
    assert_eq!(batch.into_statements(), vec!["SELECT 4"]);
}
