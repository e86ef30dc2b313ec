use std::collections::HashMap;

use crate::{
    storage::{persistence::PageStore, storage_manager::StorageManager},
    types::{error::DatabaseError, value::Value},
};

/// Replaces non-key columns of a single row located by its clustering key.
pub struct TableUpdater<'a> {
    storage: &'a mut StorageManager,
    table_name: String,
}

impl<'a> TableUpdater<'a> {
    pub fn new(storage: &'a mut StorageManager, table_name: String) -> Result<Self, DatabaseError> {
        if !storage.table_exists(&table_name) {
            return Err(DatabaseError::TableNotFound { name: table_name });
        }
        Ok(Self {
            storage,
            table_name,
        })
    }

    /// `key_literal` is parsed with the clustering-key column's type.
    pub fn update(
        &mut self,
        key_literal: &str,
        values: &HashMap<String, Value>,
    ) -> Result<(), DatabaseError> {
        let mut schema = self.storage.schema_manager.get_schema(&self.table_name)?.clone();
        let key_type = schema
            .clustering_column()
            .map(|column| column.data_type)
            .ok_or_else(|| DatabaseError::ColumnNotFound {
                name: schema.clustering_key.clone(),
                table: self.table_name.clone(),
            })?;
        let key = Value::from_string(key_literal, &key_type)?;
        schema.validate_partial_row(values)?;

        let mut table = self.storage.store.load_table(&self.table_name)?;
        let current = table.lookup(&key, &self.storage.store)?;
        let updated = current.with_updated_columns(values)?;
        let previous = table.replace(updated.clone(), &mut self.storage.store)?;

        let refreshed =
            table.refresh_column_stats(&mut schema, &[previous], &self.storage.store)?;
        let widened = schema.record_tuple(&updated);
        if widened || !refreshed.is_empty() {
            self.storage.schema_manager.save_schema(schema)?;
        }
        self.storage.store.save_table(&table)?;

        log::debug!("Updated row {} of '{}'", key, self.table_name);
        Ok(())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}
