//! Authoring API for migration units.
//!
//! A migration unit declares an identifier and an `up` procedure that
//! appends statements to a [`StatementBatch`]. The batch produced by one
//! invocation is applied as a single transaction by the engine.

use std::fmt;

/// Ordered statements accumulated by one `up` (or `down`) invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBatch {
    statements: Vec<String>,
}

impl StatementBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement
    pub fn push(&mut self, statement: impl Into<String>) -> &mut Self {
        self.statements.push(statement.into());
        self
    }

    /// Append several statements, preserving their order
    pub fn extend<I, S>(&mut self, statements: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statements
            .extend(statements.into_iter().map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }

    /// Consume the batch and return the statements
    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }
}

/// A user-authored schema change.
///
/// Implementations are constructed fresh for every application attempt via
/// the factory given to [`Registry::register`](crate::registry::Registry::register).
pub trait Migration {
    /// The declared identifier as written by the author. `None` means the
    /// unit never declared one; a negative value is rejected at discovery.
    fn id(&self) -> Option<i32>;

    /// Human-readable name used in logs and error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Append the forward statements.
    fn up(&self, batch: &mut StatementBatch);

    /// Append the reverse statements.
    ///
    /// Declared for forward compatibility only: no run path invokes it.
    fn down(&self, _batch: &mut StatementBatch) {}
}

type Procedure = Box<dyn Fn(&mut StatementBatch) + Send + Sync>;

/// Closure-based migration unit.
///
/// The builder methods share their names with [`Migration`]'s, so call the
/// trait methods through the trait on a concrete value.
///
/// ```
/// use mg_core::{FnMigration, StatementBatch, Migration};
///
/// let unit = FnMigration::new("create_users")
///     .id(1)
///     .up(|batch| {
///         batch.push("CREATE TABLE users (id integer PRIMARY KEY)");
///     })
///     .down(|batch| {
///         batch.push("DROP TABLE users");
///     });
///
/// let mut batch = StatementBatch::new();
/// Migration::up(&unit, &mut batch);
/// assert_eq!(batch.len(), 1);
/// assert_eq!(Migration::id(&unit), Some(1));
/// ```
pub struct FnMigration {
    name: String,
    id: Option<i32>,
    up: Procedure,
    down: Option<Procedure>,
}

impl FnMigration {
    /// Create a unit with no identifier and an empty `up` procedure.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            up: Box::new(|_| {}),
            down: None,
        }
    }

    /// Declare the identifier. Discovery rejects negative values.
    pub fn id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    /// Register the forward procedure, replacing any previous one.
    pub fn up<F>(mut self, procedure: F) -> Self
    where
        F: Fn(&mut StatementBatch) + Send + Sync + 'static,
    {
        self.up = Box::new(procedure);
        self
    }

    /// Register the reverse procedure, replacing any previous one.
    pub fn down<F>(mut self, procedure: F) -> Self
    where
        F: Fn(&mut StatementBatch) + Send + Sync + 'static,
    {
        self.down = Some(Box::new(procedure));
        self
    }

    /// Whether a reverse procedure was registered
    pub fn has_down(&self) -> bool {
        self.down.is_some()
    }
}

impl Migration for FnMigration {
    fn id(&self) -> Option<i32> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn up(&self, batch: &mut StatementBatch) {
        (self.up)(batch)
    }

    fn down(&self, batch: &mut StatementBatch) {
        if let Some(down) = &self.down {
            down(batch)
        }
    }
}

impl fmt::Debug for FnMigration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMigration")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("has_down", &self.down.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
