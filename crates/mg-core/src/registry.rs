//! Migration registry and discovery.
//!
//! Units are registered at compile time as constructors and, optionally,
//! loaded from `.sql` files under a discovery location. [`Registry::discover`]
//! validates the whole set (every unit has an identifier, no identifier is
//! used twice) before returning anything, so a bad set never reaches the
//! database.

use crate::error::{CoreError, CoreResult};
use crate::migration::Migration;
use crate::migration_id::MigrationId;
use crate::sql_file::discover_sql_files;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Constructor producing a fresh unit for each application attempt.
pub type MigrationFactory = Arc<dyn Fn() -> Box<dyn Migration> + Send + Sync>;

/// Explicit registration list of migration constructors.
#[derive(Default)]
pub struct Registry {
    factories: Vec<MigrationFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a unit.
    pub fn register<M, F>(&mut self, factory: F) -> &mut Self
    where
        M: Migration + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.factories
            .push(Arc::new(move || Box::new(factory()) as Box<dyn Migration>));
        self
    }

    /// Number of compile-time registrations (SQL files not included).
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Discover all units: registered constructors first, then `.sql` files
    /// under `location` in sorted path order.
    ///
    /// Fails with `MissingIdentifier` or `DuplicateIdentifier` if any unit in
    /// the entire set is invalid.
    pub fn discover(&self, location: Option<&Path>) -> CoreResult<DiscoveredMigrations> {
        let mut units = BTreeMap::new();

        for factory in &self.factories {
            let unit = factory();
            insert_unique(&mut units, unit.as_ref(), Arc::clone(factory))?;
        }

        if let Some(location) = location {
            for file in discover_sql_files(location)? {
                let file = Arc::new(file);
                let factory: MigrationFactory = {
                    let file = Arc::clone(&file);
                    Arc::new(move || Box::new((*file).clone()) as Box<dyn Migration>)
                };
                insert_unique(&mut units, file.as_ref(), factory)?;
            }
        }

        log::debug!("Discovered {} migration(s)", units.len());
        Ok(DiscoveredMigrations { units })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.factories.len())
            .finish()
    }
}

fn insert_unique(
    units: &mut BTreeMap<MigrationId, MigrationDescriptor>,
    unit: &dyn Migration,
    factory: MigrationFactory,
) -> CoreResult<()> {
    let name = unit.name().to_string();
    let declared = unit
        .id()
        .ok_or_else(|| CoreError::MissingIdentifier { name: name.clone() })?;
    let id = MigrationId::new(declared).ok_or_else(|| CoreError::InvalidIdentifier {
        name: name.clone(),
        value: declared.to_string(),
    })?;

    match units.entry(id) {
        Entry::Occupied(existing) => Err(CoreError::DuplicateIdentifier {
            id: id.get(),
            first: existing.get().name.clone(),
            second: name,
        }),
        Entry::Vacant(slot) => {
            slot.insert(MigrationDescriptor { id, name, factory });
            Ok(())
        }
    }
}

/// A validated, discovered unit.
#[derive(Clone)]
pub struct MigrationDescriptor {
    id: MigrationId,
    name: String,
    factory: MigrationFactory,
}

impl MigrationDescriptor {
    pub fn id(&self) -> MigrationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct a fresh instance of the unit.
    pub fn instantiate(&self) -> Box<dyn Migration> {
        (self.factory)()
    }
}

impl fmt::Debug for MigrationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Result of discovery: every unit keyed by identifier, in ascending order.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredMigrations {
    units: BTreeMap<MigrationId, MigrationDescriptor>,
}

impl DiscoveredMigrations {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, id: MigrationId) -> Option<&MigrationDescriptor> {
        self.units.get(&id)
    }

    pub fn contains(&self, id: MigrationId) -> bool {
        self.units.contains_key(&id)
    }

    /// All units, ascending by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &MigrationDescriptor> {
        self.units.values()
    }

    /// Units not present in `committed`, ascending by identifier.
    pub fn pending(&self, committed: &HashSet<MigrationId>) -> Vec<&MigrationDescriptor> {
        self.units
            .values()
            .filter(|unit| !committed.contains(&unit.id))
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
