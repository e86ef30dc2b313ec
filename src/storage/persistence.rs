use crate::{
    storage::table::Table,
    types::{PageId, error::DatabaseError, page::Page},
};

/// Durable storage for table descriptors and pages, each handled as an
/// opaque record. The unit of I/O is one page or one table descriptor.
pub trait PageStore {
    fn table_exists(&self, table_name: &str) -> bool;

    /// Fails with `TableNotFound` when no descriptor is stored.
    fn load_table(&self, table_name: &str) -> Result<Table, DatabaseError>;

    fn save_table(&mut self, table: &Table) -> Result<(), DatabaseError>;

    /// Removes the descriptor and every page of the table.
    fn delete_table(&mut self, table_name: &str) -> Result<(), DatabaseError>;

    /// Fails with `PageNotFound` when no page record is stored.
    fn load_page(&self, table_name: &str, page_id: PageId) -> Result<Page, DatabaseError>;

    fn save_page(&mut self, page: &Page) -> Result<(), DatabaseError>;

    fn delete_page(&mut self, table_name: &str, page_id: PageId) -> Result<(), DatabaseError>;
}
