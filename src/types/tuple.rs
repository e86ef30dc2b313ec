use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::types::{KEY_ONLY_COLUMN, error::DatabaseError, value::Value};

/// A row of column values ordered by its clustering-key column.
///
/// The clustering-key value is held apart from the other columns so it is
/// always present; two tuples are equal under [`Tuple::compare`] iff their
/// clustering keys are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    cluster_key: String,
    key_value: Value,
    columns: BTreeMap<String, Value>,
}

impl Tuple {
    /// Builds a tuple from a column→value mapping. Fails with `InvalidValue`
    /// when the clustering-key column is missing.
    pub fn new<I>(cluster_key: impl Into<String>, values: I) -> Result<Self, DatabaseError>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let cluster_key = cluster_key.into();
        let mut columns: BTreeMap<String, Value> = values.into_iter().collect();
        let key_value = columns.remove(&cluster_key).ok_or_else(|| {
            DatabaseError::invalid_value(format!(
                "clustering key column '{}' is missing",
                cluster_key
            ))
        })?;

        Ok(Self {
            cluster_key,
            key_value,
            columns,
        })
    }

    /// A tuple carrying only a clustering-key value, used for searching and
    /// removing by key.
    pub fn key_only(key_value: Value) -> Self {
        Self {
            cluster_key: KEY_ONLY_COLUMN.to_string(),
            key_value,
            columns: BTreeMap::new(),
        }
    }

    pub fn cluster_key_name(&self) -> &str {
        &self.cluster_key
    }

    pub fn cluster_key_value(&self) -> &Value {
        &self.key_value
    }

    pub fn column_value(&self, column: &str) -> Option<&Value> {
        if column == self.cluster_key {
            Some(&self.key_value)
        } else {
            self.columns.get(column)
        }
    }

    /// All columns including the clustering key, in column-name order.
    pub fn values(&self) -> BTreeMap<&str, &Value> {
        let mut values: BTreeMap<&str, &Value> = self
            .columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        values.insert(self.cluster_key.as_str(), &self.key_value);
        values
    }

    pub fn column_count(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn compare(&self, other: &Tuple) -> Ordering {
        self.key_value.compare(&other.key_value)
    }

    /// Compares two tuples on an arbitrary column. `None` when either side
    /// lacks the column.
    pub fn compare_by(&self, other: &Tuple, column: &str) -> Option<Ordering> {
        let left = self.column_value(column)?;
        let right = other.column_value(column)?;
        Some(left.compare(right))
    }

    /// Returns a copy with the given non-key columns replaced. The
    /// clustering key itself is never changed.
    pub fn with_updated_columns<'a, I>(&self, updates: I) -> Result<Self, DatabaseError>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut updated = self.clone();
        for (name, value) in updates {
            if *name == self.cluster_key {
                return Err(DatabaseError::schema_mismatch(format!(
                    "clustering key column '{}' cannot be updated",
                    name
                )));
            }
            updated.columns.insert(name.clone(), value.clone());
        }
        Ok(updated)
    }
}
