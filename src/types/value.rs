use std::{cmp::Ordering, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{DATE_FORMAT, error::DatabaseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Real,
    Text,
    Date,
}

impl DataType {
    /// Parses a column type name. Accepts SQL-style names and the classic
    /// `java.lang.*` class names, case-insensitively.
    pub fn from_string(type_name: &str) -> Result<Self, DatabaseError> {
        match type_name.trim().to_lowercase().as_str() {
            "int" | "integer" | "java.lang.integer" => Ok(DataType::Integer),
            "real" | "double" | "float" | "java.lang.double" => Ok(DataType::Real),
            "text" | "string" | "varchar" | "java.lang.string" => Ok(DataType::Text),
            "date" | "java.util.date" => Ok(DataType::Date),
            other => Err(DatabaseError::schema_mismatch(format!(
                "unsupported data type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Text => "TEXT",
            DataType::Date => "DATE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Real(_) => DataType::Real,
            Value::Text(_) => DataType::Text,
            Value::Date(_) => DataType::Date,
        }
    }

    pub fn is_compatible_with_type(&self, data_type: &DataType) -> bool {
        self.data_type() == *data_type
    }

    /// Parses a literal into a value of the given type.
    pub fn from_string(literal: &str, data_type: &DataType) -> Result<Self, DatabaseError> {
        let invalid = || {
            DatabaseError::invalid_value(format!("'{}' is not a valid {} literal", literal, data_type))
        };
        match data_type {
            DataType::Integer => literal.trim().parse().map(Value::Integer).map_err(|_| invalid()),
            DataType::Real => literal.trim().parse().map(Value::Real).map_err(|_| invalid()),
            DataType::Text => {
                if literal.is_empty() {
                    Err(invalid())
                } else {
                    Ok(Value::Text(literal.to_string()))
                }
            }
            DataType::Date => NaiveDate::parse_from_str(literal.trim(), DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| invalid()),
        }
    }

    /// Total order used for clustering keys and column statistics.
    ///
    /// Integers and reals compare numerically; values of unrelated types
    /// fall back to a fixed type rank so sorting never panics.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Real(b)) => (*a as f64).total_cmp(b),
            (Value::Real(a), Value::Integer(b)) => a.total_cmp(&(*b as f64)),
            (Value::Real(a), Value::Real(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Integer(_) | Value::Real(_) => 0,
            Value::Text(_) => 1,
            Value::Date(_) => 2,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}
