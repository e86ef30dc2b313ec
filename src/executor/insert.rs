use std::collections::HashMap;

use crate::{
    storage::{persistence::PageStore, storage_manager::StorageManager},
    types::{error::DatabaseError, tuple::Tuple, value::Value},
};

/// Trait for inserting data into database tables
pub trait Inserter {
    /// Insert a single row into the table
    fn insert(&mut self, values: HashMap<String, Value>) -> Result<(), DatabaseError>;

    /// Insert multiple rows in a batch operation
    fn insert_batch(&mut self, rows: Vec<HashMap<String, Value>>) -> Result<(), DatabaseError>;

    /// Get the table name this inserter operates on
    fn table_name(&self) -> &str;
}

/// Table inserter implementation that handles insertion operations for a specific table
pub struct TableInserter<'a> {
    storage: &'a mut StorageManager,
    table_name: String,
}

impl<'a> TableInserter<'a> {
    /// Create a new TableInserter for the specified table
    pub fn new(storage: &'a mut StorageManager, table_name: String) -> Result<Self, DatabaseError> {
        if !storage.table_exists(&table_name) {
            return Err(DatabaseError::TableNotFound { name: table_name });
        }
        Ok(Self {
            storage,
            table_name,
        })
    }
}

impl Inserter for TableInserter<'_> {
    fn insert(&mut self, values: HashMap<String, Value>) -> Result<(), DatabaseError> {
        self.insert_batch(vec![values])
    }

    fn insert_batch(&mut self, rows: Vec<HashMap<String, Value>>) -> Result<(), DatabaseError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut schema = self.storage.schema_manager.get_schema(&self.table_name)?.clone();

        // Validate all rows before touching any page
        let mut tuples = Vec::with_capacity(rows.len());
        for values in rows {
            schema.validate_row(&values)?;
            tuples.push(Tuple::new(schema.clustering_key.clone(), values)?);
        }

        let mut table = self.storage.store.load_table(&self.table_name)?;
        let mut stats_changed = false;
        let mut result = Ok(());
        for tuple in tuples {
            let stored = tuple.clone();
            if let Err(e) = table.insert(tuple, &mut self.storage.store) {
                result = Err(e);
                break;
            }
            stats_changed |= schema.record_tuple(&stored);
        }

        // Rows inserted before a failure stay, so the descriptor is saved either way
        self.storage.store.save_table(&table)?;
        if stats_changed {
            self.storage.schema_manager.save_schema(schema)?;
        }
        result
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }
}
