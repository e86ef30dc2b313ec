use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    storage::{METADATA_FILE_EXTENSION, file_store::write_atomic},
    types::{
        error::DatabaseError,
        tuple::Tuple,
        value::{DataType, Value},
    },
};

/// Extremes of the values currently stored in a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub min: Option<Value>,
    pub max: Option<Value>,
}

impl ColumnStats {
    /// Widens the recorded range to include `value`. Returns true when
    /// either bound moved.
    pub fn observe(&mut self, value: &Value) -> bool {
        let mut changed = false;
        if self
            .min
            .as_ref()
            .is_none_or(|min| value.compare(min) == Ordering::Less)
        {
            self.min = Some(value.clone());
            changed = true;
        }
        if self
            .max
            .as_ref()
            .is_none_or(|max| value.compare(max) == Ordering::Greater)
        {
            self.max = Some(value.clone());
            changed = true;
        }
        changed
    }
}

/// A column definition: declared type and allowed range, plus the
/// recorded statistics of stored data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    pub clustering_key: bool,
    pub min: Value,
    pub max: Value,
    pub stats: ColumnStats,
}

impl ColumnSchema {
    pub fn new(name: String, data_type: DataType, min: Value, max: Value) -> Self {
        Self {
            name,
            data_type,
            clustering_key: false,
            min,
            max,
            stats: ColumnStats::default(),
        }
    }

    pub fn clustering_key(mut self) -> Self {
        self.clustering_key = true;
        self
    }

    /// Checks type and declared range of a value destined for this column.
    pub fn validate_value(&self, value: &Value) -> Result<(), DatabaseError> {
        if !value.is_compatible_with_type(&self.data_type) {
            return Err(DatabaseError::schema_mismatch(format!(
                "value {:?} is not compatible with column '{}' of type {}",
                value, self.name, self.data_type
            )));
        }
        if value.compare(&self.min) == Ordering::Less || value.compare(&self.max) == Ordering::Greater
        {
            return Err(DatabaseError::schema_mismatch(format!(
                "value {} is outside the range [{}, {}] of column '{}'",
                value, self.min, self.max, self.name
            )));
        }
        Ok(())
    }
}

/// Checks that every column's bounds match its type and that `min <= max`.
/// Table names become directory and file names, so only alphanumerics,
/// `_` and `-` are allowed.
pub fn validate_table_name(name: &str) -> Result<(), DatabaseError> {
    if name.is_empty() {
        return Err(DatabaseError::schema_mismatch("table name must not be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(DatabaseError::schema_mismatch(format!(
            "table name '{}' cannot contain path separators",
            name
        )));
    }
    if name.contains("..") {
        return Err(DatabaseError::schema_mismatch(format!(
            "table name '{}' cannot contain parent directory references",
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DatabaseError::schema_mismatch(format!(
            "table name '{}' can only contain alphanumeric characters, underscores, and hyphens",
            name
        )));
    }
    Ok(())
}

pub fn validate_type_ranges(columns: &[ColumnSchema]) -> Result<(), DatabaseError> {
    for column in columns {
        if !column.min.is_compatible_with_type(&column.data_type)
            || !column.max.is_compatible_with_type(&column.data_type)
        {
            return Err(DatabaseError::schema_mismatch(format!(
                "bounds of column '{}' do not match its type {}",
                column.name, column.data_type
            )));
        }
        if column.min.compare(&column.max) == Ordering::Greater {
            return Err(DatabaseError::schema_mismatch(format!(
                "min {} is greater than max {} for column '{}'",
                column.min, column.max, column.name
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub clustering_key: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Builds a schema from raw type names and min/max literals keyed by
    /// column name.
    pub fn define(
        table_name: &str,
        clustering_key: &str,
        types: &HashMap<String, String>,
        mins: &HashMap<String, String>,
        maxes: &HashMap<String, String>,
    ) -> Result<Self, DatabaseError> {
        if !types.contains_key(clustering_key) {
            return Err(DatabaseError::schema_mismatch(format!(
                "clustering key '{}' is not a column of '{}'",
                clustering_key, table_name
            )));
        }

        let type_columns: HashSet<&String> = types.keys().collect();
        if type_columns != mins.keys().collect::<HashSet<_>>()
            || type_columns != maxes.keys().collect::<HashSet<_>>()
        {
            return Err(DatabaseError::schema_mismatch(
                "some columns have missing min/max metadata",
            ));
        }

        let mut columns = Vec::with_capacity(types.len());
        for (name, type_name) in types {
            let data_type = DataType::from_string(type_name)?;
            let min = Value::from_string(&mins[name], &data_type)?;
            let max = Value::from_string(&maxes[name], &data_type)?;
            let mut column = ColumnSchema::new(name.clone(), data_type, min, max);
            if name == clustering_key {
                column = column.clustering_key();
            }
            columns.push(column);
        }

        Self::new(table_name.to_string(), clustering_key.to_string(), columns)
    }

    pub fn new(
        table_name: String,
        clustering_key: String,
        mut columns: Vec<ColumnSchema>,
    ) -> Result<Self, DatabaseError> {
        validate_table_name(&table_name)?;

        let mut names = HashSet::new();
        for column in &columns {
            if !names.insert(column.name.as_str()) {
                return Err(DatabaseError::schema_mismatch(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }

        let key_columns: Vec<&ColumnSchema> =
            columns.iter().filter(|c| c.clustering_key).collect();
        if key_columns.len() != 1 || key_columns[0].name != clustering_key {
            return Err(DatabaseError::schema_mismatch(format!(
                "table '{}' must have exactly one clustering key column '{}'",
                table_name, clustering_key
            )));
        }

        validate_type_ranges(&columns)?;
        columns.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            table_name,
            clustering_key,
            columns,
        })
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|col| col.name == name)
    }

    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut ColumnSchema> {
        self.columns.iter_mut().find(|col| col.name == name)
    }

    pub fn clustering_column(&self) -> Option<&ColumnSchema> {
        self.get_column(&self.clustering_key)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    fn require_column(&self, name: &str) -> Result<&ColumnSchema, DatabaseError> {
        self.get_column(name).ok_or_else(|| DatabaseError::ColumnNotFound {
            name: name.to_string(),
            table: self.table_name.clone(),
        })
    }

    /// Validates a full row: exactly the table's columns, each value of
    /// the column's type and inside its declared range.
    pub fn validate_row(&self, values: &HashMap<String, Value>) -> Result<(), DatabaseError> {
        for (name, value) in values {
            self.require_column(name)?.validate_value(value)?;
        }

        if let Some(missing) = self.columns.iter().find(|c| !values.contains_key(&c.name)) {
            return Err(DatabaseError::schema_mismatch(format!(
                "row for table '{}' is missing column '{}'",
                self.table_name, missing.name
            )));
        }
        Ok(())
    }

    /// Validates the columns of an update: a non-empty subset of the
    /// table's columns that does not touch the clustering key.
    pub fn validate_partial_row(&self, values: &HashMap<String, Value>) -> Result<(), DatabaseError> {
        if values.is_empty() {
            return Err(DatabaseError::schema_mismatch("update names no columns"));
        }

        for (name, value) in values {
            if *name == self.clustering_key {
                return Err(DatabaseError::schema_mismatch(format!(
                    "clustering key column '{}' cannot be updated",
                    name
                )));
            }
            self.require_column(name)?.validate_value(value)?;
        }
        Ok(())
    }

    pub fn validate_value(&self, column: &str, value: &Value) -> Result<(), DatabaseError> {
        self.require_column(column)?.validate_value(value)
    }

    /// Widens column statistics with a stored tuple. Returns true when any
    /// column's recorded range changed.
    pub fn record_tuple(&mut self, tuple: &Tuple) -> bool {
        let mut changed = false;
        for column in &mut self.columns {
            if let Some(value) = tuple.column_value(&column.name) {
                changed |= column.stats.observe(value);
            }
        }
        changed
    }
}

/// Catalog of table schemas, one JSON descriptor per table.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    metadata_dir: PathBuf,
    sync_writes: bool,
    pub table_schemas: HashMap<String, TableSchema>,
}

impl SchemaManager {
    /// Opens the catalog, loading every descriptor already on disk.
    pub fn open<P: AsRef<Path>>(metadata_dir: P, sync_writes: bool) -> Result<Self, DatabaseError> {
        let metadata_dir = metadata_dir.as_ref().to_path_buf();
        fs::create_dir_all(&metadata_dir)?;

        let mut table_schemas = HashMap::new();
        for entry in fs::read_dir(&metadata_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(METADATA_FILE_EXTENSION) {
                continue;
            }
            let schema: TableSchema = serde_json::from_slice(&fs::read(&path)?)?;
            log::debug!("Loaded schema for table '{}'", schema.table_name);
            table_schemas.insert(schema.table_name.clone(), schema);
        }

        Ok(Self {
            metadata_dir,
            sync_writes,
            table_schemas,
        })
    }

    fn schema_path(&self, table_name: &str) -> PathBuf {
        self.metadata_dir
            .join(format!("{}.{}", table_name, METADATA_FILE_EXTENSION))
    }

    fn persist(&self, schema: &TableSchema) -> Result<(), DatabaseError> {
        let bytes = serde_json::to_vec_pretty(schema)?;
        write_atomic(&self.schema_path(&schema.table_name), &bytes, self.sync_writes)
    }

    pub fn create_schema(&mut self, schema: TableSchema) -> Result<(), DatabaseError> {
        if self.table_exists(&schema.table_name) {
            return Err(DatabaseError::TableAlreadyExists {
                name: schema.table_name,
            });
        }
        self.persist(&schema)?;
        self.table_schemas.insert(schema.table_name.clone(), schema);
        Ok(())
    }

    pub fn get_schema(&self, table_name: &str) -> Result<&TableSchema, DatabaseError> {
        self.table_schemas
            .get(table_name)
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: table_name.to_string(),
            })
    }

    /// Replaces the stored schema of an existing table.
    pub fn save_schema(&mut self, schema: TableSchema) -> Result<(), DatabaseError> {
        if !self.table_exists(&schema.table_name) {
            return Err(DatabaseError::TableNotFound {
                name: schema.table_name,
            });
        }
        self.persist(&schema)?;
        self.table_schemas.insert(schema.table_name.clone(), schema);
        Ok(())
    }

    pub fn remove_schema(&mut self, table_name: &str) -> Result<TableSchema, DatabaseError> {
        let schema = self
            .table_schemas
            .remove(table_name)
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: table_name.to_string(),
            })?;
        fs::remove_file(self.schema_path(table_name))?;
        Ok(schema)
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        self.table_schemas.contains_key(table_name)
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table_schemas.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
