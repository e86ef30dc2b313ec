pub mod config;
pub mod executor;
pub mod storage;
pub mod types;
pub mod utils;

pub use config::Config;
pub use executor::predicate::Predicate;
pub use storage::storage_manager::StorageManager;
pub use types::{
    error::{DatabaseError, ErrorKind, Result},
    tuple::Tuple,
    value::{DataType, Value},
};
