use crate::{
    executor::predicate::Predicate,
    storage::{persistence::PageStore, storage_manager::StorageManager},
    types::error::DatabaseError,
};

/// Removes rows matching a conjunctive equality predicate.
pub struct TableDeleter<'a> {
    storage: &'a mut StorageManager,
    table_name: String,
}

impl<'a> TableDeleter<'a> {
    pub fn new(storage: &'a mut StorageManager, table_name: String) -> Result<Self, DatabaseError> {
        if !storage.table_exists(&table_name) {
            return Err(DatabaseError::TableNotFound { name: table_name });
        }
        Ok(Self {
            storage,
            table_name,
        })
    }

    /// Deletes every matching row and returns how many were removed.
    pub fn delete(&mut self, predicate: &Predicate) -> Result<usize, DatabaseError> {
        let mut schema = self.storage.schema_manager.get_schema(&self.table_name)?.clone();
        predicate.validate_against_schema(&schema)?;

        let mut table = self.storage.store.load_table(&self.table_name)?;
        let deleted = table.delete_matching(predicate, &mut self.storage.store)?;
        let refreshed = table.refresh_column_stats(&mut schema, &deleted, &self.storage.store)?;

        if !refreshed.is_empty() {
            self.storage.schema_manager.save_schema(schema)?;
        }
        self.storage.store.save_table(&table)?;

        log::info!(
            "Deleted {} rows from '{}' ({} rows remain)",
            deleted.len(),
            self.table_name,
            table.rows_count()
        );
        Ok(deleted.len())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}
