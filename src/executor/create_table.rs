use std::collections::HashMap;

use crate::{
    storage::{
        persistence::PageStore, schema::TableSchema, storage_manager::StorageManager, table::Table,
    },
    types::{error::DatabaseError, value::DataType},
};

/// Trait for creating tables in the database
pub trait TableCreator {
    /// Create a new table with the specified schema
    fn create_table(&mut self, schema: TableSchema) -> Result<(), DatabaseError>;

    /// Check if a table exists
    fn table_exists(&self, table_name: &str) -> bool;
}

/// Table creator implementation that handles table creation operations
pub struct CreateTableExecutor<'a> {
    storage: &'a mut StorageManager,
}

impl<'a> CreateTableExecutor<'a> {
    pub fn new(storage: &'a mut StorageManager) -> Self {
        Self { storage }
    }
}

impl TableCreator for CreateTableExecutor<'_> {
    fn create_table(&mut self, schema: TableSchema) -> Result<(), DatabaseError> {
        if self.table_exists(&schema.table_name) {
            return Err(DatabaseError::TableAlreadyExists {
                name: schema.table_name,
            });
        }

        let table = Table::new(
            schema.table_name.clone(),
            schema.clustering_key.clone(),
            self.storage.config.max_rows_per_page,
        );
        self.storage.schema_manager.create_schema(schema)?;
        if let Err(e) = self.storage.store.save_table(&table) {
            // Keep the catalog and the stored tables in step
            let _ = self.storage.schema_manager.remove_schema(table.table_name());
            return Err(e);
        }

        log::info!(
            "Created table '{}' clustered on '{}' ({} rows per page)",
            table.table_name(),
            table.cluster_key(),
            table.max_rows_per_page()
        );
        Ok(())
    }

    fn table_exists(&self, table_name: &str) -> bool {
        self.storage.table_exists(table_name)
    }
}

/// Builder for creating table schemas
pub struct TableSchemaBuilder {
    table_name: String,
    clustering_key: Option<String>,
    types: HashMap<String, String>,
    mins: HashMap<String, String>,
    maxes: HashMap<String, String>,
}

impl TableSchemaBuilder {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            clustering_key: None,
            types: HashMap::new(),
            mins: HashMap::new(),
            maxes: HashMap::new(),
        }
    }

    /// Adds a column with its allowed range given as literals.
    pub fn add_column(mut self, name: &str, data_type: DataType, min: &str, max: &str) -> Self {
        self.types.insert(name.to_string(), data_type.to_string());
        self.mins.insert(name.to_string(), min.to_string());
        self.maxes.insert(name.to_string(), max.to_string());
        self
    }

    /// Adds a column and makes it the clustering key.
    pub fn add_key_column(self, name: &str, data_type: DataType, min: &str, max: &str) -> Self {
        self.add_column(name, data_type, min, max).clustering_key(name)
    }

    pub fn clustering_key(mut self, name: &str) -> Self {
        self.clustering_key = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<TableSchema, DatabaseError> {
        if self.types.is_empty() {
            return Err(DatabaseError::schema_mismatch(
                "table must have at least one column",
            ));
        }
        let clustering_key = self
            .clustering_key
            .ok_or_else(|| DatabaseError::schema_mismatch("no clustering key column given"))?;

        TableSchema::define(
            &self.table_name,
            &clustering_key,
            &self.types,
            &self.mins,
            &self.maxes,
        )
    }
}

/// Extension methods for StorageManager to work with CreateTableExecutor
impl StorageManager {
    /// Create a table from an already validated schema
    pub fn create_table_with_schema(&mut self, schema: TableSchema) -> Result<(), DatabaseError> {
        CreateTableExecutor::new(self).create_table(schema)
    }

    /// Create a table using the builder pattern
    pub fn create_table_with_builder(
        &mut self,
        builder: TableSchemaBuilder,
    ) -> Result<(), DatabaseError> {
        let schema = builder.build()?;
        self.create_table_with_schema(schema)
    }

    /// Create a table from column type names and min/max literals keyed by
    /// column name
    pub fn create_table(
        &mut self,
        table_name: &str,
        clustering_key: &str,
        types: &HashMap<String, String>,
        mins: &HashMap<String, String>,
        maxes: &HashMap<String, String>,
    ) -> Result<(), DatabaseError> {
        if self.table_exists(table_name) {
            return Err(DatabaseError::TableAlreadyExists {
                name: table_name.to_string(),
            });
        }
        let schema = TableSchema::define(table_name, clustering_key, types, mins, maxes)?;
        self.create_table_with_schema(schema)
    }
}
