use std::{collections::HashMap, path::Path};

use crate::{
    config::Config,
    executor::{
        delete::TableDeleter,
        insert::{Inserter, TableInserter},
        predicate::Predicate,
        scan::Scanner,
        sequential_scan::SequentialScanner,
        update::TableUpdater,
    },
    storage::{
        METADATA_DIR,
        file_store::FileStore,
        persistence::PageStore,
        schema::{SchemaManager, TableSchema},
        table::Table,
    },
    types::{error::DatabaseError, page::Page, tuple::Tuple, value::Value},
};

/// Entry point of the engine: owns the page store and the schema catalog
/// rooted at one data directory.
pub struct StorageManager {
    pub config: Config,
    pub store: FileStore,
    pub schema_manager: SchemaManager,
}

impl StorageManager {
    pub fn new(config: Config) -> Result<Self, DatabaseError> {
        config.validate()?;

        let data_dir = &config.data_dir;
        if data_dir.exists() {
            log::info!("Opening existing database at {}", data_dir.display());
        } else {
            log::info!("Creating new database at {}", data_dir.display());
        }

        let store = FileStore::open(data_dir, config.sync_writes)?;
        let schema_manager =
            SchemaManager::open(data_dir.join(METADATA_DIR), config.sync_writes)?;

        // A schema without a stored table means creation was interrupted
        let orphaned: Vec<String> = schema_manager
            .table_names()
            .into_iter()
            .filter(|name| !store.table_exists(name))
            .map(str::to_string)
            .collect();
        let mut storage_manager = Self {
            config,
            store,
            schema_manager,
        };
        for name in orphaned {
            log::warn!("Discarding schema of '{}': no table descriptor on disk", name);
            storage_manager.schema_manager.remove_schema(&name)?;
        }

        log::debug!(
            "Loaded {} tables from {}",
            storage_manager.schema_manager.table_schemas.len(),
            storage_manager.config.data_dir.display()
        );
        Ok(storage_manager)
    }

    /// Opens a database in `path` with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        Self::new(Config::new(path.as_ref()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn insert_into_table(
        &mut self,
        table_name: &str,
        values: HashMap<String, Value>,
    ) -> Result<(), DatabaseError> {
        let mut inserter = TableInserter::new(self, table_name.to_string())?;
        inserter.insert(values)
    }

    /// Insert multiple rows into a table using batch insertion
    pub fn insert_batch_into_table(
        &mut self,
        table_name: &str,
        rows: Vec<HashMap<String, Value>>,
    ) -> Result<(), DatabaseError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut inserter = TableInserter::new(self, table_name.to_string())?;
        inserter.insert_batch(rows)
    }

    /// Update the non-key columns of the row whose clustering key parses
    /// from `key_literal`.
    pub fn update_table(
        &mut self,
        table_name: &str,
        key_literal: &str,
        values: &HashMap<String, Value>,
    ) -> Result<(), DatabaseError> {
        let mut updater = TableUpdater::new(self, table_name.to_string())?;
        updater.update(key_literal, values)
    }

    /// Delete every row matching the predicate. Returns the number removed.
    pub fn delete_from_table(
        &mut self,
        table_name: &str,
        predicate: &Predicate,
    ) -> Result<usize, DatabaseError> {
        let mut deleter = TableDeleter::new(self, table_name.to_string())?;
        deleter.delete(predicate)
    }

    /// Fetch one row by clustering key.
    pub fn lookup(&self, table_name: &str, key: &Value) -> Result<Tuple, DatabaseError> {
        let table = self.load_table(table_name)?;
        table.lookup(key, &self.store)
    }

    /// Load the page at `position` in clustering-key order.
    pub fn get_page(&self, table_name: &str, position: usize) -> Result<Page, DatabaseError> {
        let table = self.load_table(table_name)?;
        table.load_page_at(position, &self.store)
    }

    pub fn load_table(&self, table_name: &str) -> Result<Table, DatabaseError> {
        if !self.table_exists(table_name) {
            return Err(DatabaseError::TableNotFound {
                name: table_name.to_string(),
            });
        }
        self.store.load_table(table_name)
    }

    /// Create a sequential scanner for the specified table
    pub fn create_scanner(
        &self,
        table_name: &str,
        batch_size: Option<usize>,
    ) -> Result<SequentialScanner<'_, FileStore>, DatabaseError> {
        let table = self.load_table(table_name)?;
        Ok(SequentialScanner::new(&self.store, table, batch_size))
    }

    /// Scan all rows in clustering-key order, optionally keeping only those
    /// matching the predicate
    pub fn scan_table(
        &self,
        table_name: &str,
        predicate: Option<Predicate>,
    ) -> Result<Vec<Tuple>, DatabaseError> {
        if let Some(pred) = &predicate {
            pred.validate_against_schema(self.schema_manager.get_schema(table_name)?)?;
        }

        let mut scanner = self.create_scanner(table_name, None)?;
        let mut tuples = Vec::new();
        while let Some(tuple) = scanner.scan()? {
            if predicate.as_ref().is_none_or(|pred| pred.evaluate(&tuple)) {
                tuples.push(tuple);
            }
        }
        Ok(tuples)
    }

    /// Remove a table with all of its pages and its schema.
    pub fn drop_table(&mut self, table_name: &str) -> Result<(), DatabaseError> {
        if !self.table_exists(table_name) {
            return Err(DatabaseError::TableNotFound {
                name: table_name.to_string(),
            });
        }
        self.store.delete_table(table_name)?;
        self.schema_manager.remove_schema(table_name)?;
        log::info!("Dropped table '{}'", table_name);
        Ok(())
    }

    /// Check every structural invariant of a table against its stored pages.
    pub fn verify_table(&self, table_name: &str) -> Result<Vec<String>, DatabaseError> {
        self.load_table(table_name)?.verify_invariants(&self.store)
    }

    pub fn get_table_schema(&self, table_name: &str) -> Option<&TableSchema> {
        self.schema_manager.get_schema(table_name).ok()
    }

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> bool {
        self.schema_manager.table_exists(table_name)
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<String> {
        self.schema_manager
            .table_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
