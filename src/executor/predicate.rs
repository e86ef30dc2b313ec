use std::{cmp::Ordering, collections::BTreeMap};

use crate::{
    storage::schema::TableSchema,
    types::{error::DatabaseError, tuple::Tuple, value::Value},
};

/// A conjunction of `column = value` conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: BTreeMap<String, Value>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an equality predicate
    pub fn eq(column_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and_eq(column_name, value)
    }

    /// Add another equality condition; a later condition on the same column
    /// replaces the earlier one.
    pub fn and_eq(mut self, column_name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(column_name.into(), value.into());
        self
    }

    pub fn conditions(&self) -> &BTreeMap<String, Value> {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The value the predicate pins the clustering key to, if any.
    pub fn cluster_key_value(&self, cluster_key: &str) -> Option<&Value> {
        self.conditions.get(cluster_key)
    }

    /// True when the tuple satisfies every condition.
    pub fn evaluate(&self, tuple: &Tuple) -> bool {
        self.conditions.iter().all(|(column, expected)| {
            tuple
                .column_value(column)
                .is_some_and(|actual| actual.compare(expected) == Ordering::Equal)
        })
    }

    /// Validate that the predicate is non-empty and every condition names an
    /// existing column with a value of the right type and range
    pub fn validate_against_schema(&self, schema: &TableSchema) -> Result<(), DatabaseError> {
        if self.is_empty() {
            return Err(DatabaseError::schema_mismatch(format!(
                "predicate on table '{}' has no conditions",
                schema.table_name
            )));
        }

        for (column, value) in &self.conditions {
            schema.validate_value(column, value)?;
        }
        Ok(())
    }
}
