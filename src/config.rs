//! Configuration for the table storage engine.

use std::path::{Path, PathBuf};

use crate::types::{DEFAULT_MAX_ROWS_PER_PAGE, error::DatabaseError};

/// Properties key holding the page capacity.
pub const MAX_ROWS_KEY: &str = "MaximumRowsCountInTablePage";

/// Properties key holding the data directory.
pub const DATA_DIR_KEY: &str = "DataDirectory";

/// Options for opening a [`StorageManager`](crate::storage::storage_manager::StorageManager).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum tuples per page once an operation completes.
    /// Default: 200
    pub max_rows_per_page: usize,

    /// Root directory holding table, page and metadata records.
    /// Default: ./data
    pub data_dir: PathBuf,

    /// fsync every record after it is written.
    /// Default: false
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_rows_per_page: DEFAULT_MAX_ROWS_PER_PAGE,
            data_dir: PathBuf::from("data"),
            sync_writes: false,
        }
    }
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_max_rows_per_page(mut self, max_rows_per_page: usize) -> Self {
        self.max_rows_per_page = max_rows_per_page;
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.max_rows_per_page == 0 {
            return Err(DatabaseError::InvalidConfig {
                details: format!("{} must be at least 1", MAX_ROWS_KEY),
            });
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(DatabaseError::InvalidConfig {
                details: "data directory must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Parses `key = value` properties text. Blank lines and lines starting
    /// with `#` or `!` are ignored; unknown keys are skipped.
    pub fn from_properties(text: &str) -> Result<Self, DatabaseError> {
        let mut config = Self::default();

        for (line_number, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let Some((key, value)) = line.split_once(['=', ':']) else {
                return Err(DatabaseError::InvalidConfig {
                    details: format!("line {}: expected key=value", line_number + 1),
                });
            };

            match key.trim() {
                MAX_ROWS_KEY => {
                    config.max_rows_per_page =
                        value.trim().parse().map_err(|_| DatabaseError::InvalidConfig {
                            details: format!(
                                "line {}: {} must be a positive integer",
                                line_number + 1,
                                MAX_ROWS_KEY
                            ),
                        })?;
                }
                DATA_DIR_KEY => config.data_dir = PathBuf::from(value.trim()),
                other => log::debug!("Ignoring unknown config key '{}'", other),
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_properties(&text)
    }
}
