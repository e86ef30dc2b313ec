pub mod error;
pub mod page;
pub mod page_reference;
pub mod tuple;
pub mod value;

// Common type aliases
pub type PageId = u64;

/// Default maximum number of tuples a page may hold once an operation completes.
pub const DEFAULT_MAX_ROWS_PER_PAGE: usize = 200;

/// Column name carried by key-only search tuples.
pub const KEY_ONLY_COLUMN: &str = "__cluster_key__";

/// Date literal format accepted for `Value::Date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
