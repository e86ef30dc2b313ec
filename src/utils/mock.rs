use std::{collections::HashMap, path::Path};

use tempfile::TempDir;

use crate::{
    config::Config,
    storage::{persistence::PageStore, storage_manager::StorageManager, table::Table},
    types::{PageId, error::DatabaseError, page::Page},
};

/// A throwaway data directory for tests and benchmarks. The directory and
/// everything in it is removed on drop.
pub struct TempDatabase {
    pub dir: TempDir,
    pub max_rows_per_page: Option<usize>,
    pub storage_manager: Option<StorageManager>,
}

impl TempDatabase {
    pub fn new() -> Self {
        Self::with_prefix("tabula_test")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            dir: TempDir::with_prefix(prefix).expect("Failed to create temp dir"),
            max_rows_per_page: None,
            storage_manager: None,
        }
    }

    /// Page capacity used by storage managers opened after this call.
    pub fn with_max_rows_per_page(mut self, max_rows_per_page: usize) -> Self {
        self.max_rows_per_page = Some(max_rows_per_page);
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> Config {
        let config = Config::new(self.dir.path());
        match self.max_rows_per_page {
            Some(max_rows) => config.with_max_rows_per_page(max_rows),
            None => config,
        }
    }

    /// Opens (or reopens) the storage manager over this directory.
    pub fn create_storage_manager(&mut self) -> Result<&mut StorageManager, DatabaseError> {
        self.storage_manager = None;
        let sm = StorageManager::new(self.config())?;
        Ok(self.storage_manager.insert(sm))
    }

    pub fn get_storage_manager(&mut self) -> Option<&mut StorageManager> {
        self.storage_manager.as_mut()
    }
}

impl Default for TempDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory [`PageStore`] for exercising table logic without touching disk.
/// Records are cloned in and out, so callers never share state with it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
    pages: HashMap<(String, PageId), Page>,
    pub page_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self, table_name: &str) -> usize {
        self.pages.keys().filter(|(t, _)| t == table_name).count()
    }

    pub fn stored_page_ids(&self, table_name: &str) -> Vec<PageId> {
        let mut ids: Vec<PageId> = self
            .pages
            .keys()
            .filter(|(t, _)| t == table_name)
            .map(|(_, id)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl PageStore for MemoryStore {
    fn table_exists(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    fn load_table(&self, table_name: &str) -> Result<Table, DatabaseError> {
        self.tables
            .get(table_name)
            .cloned()
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: table_name.to_string(),
            })
    }

    fn save_table(&mut self, table: &Table) -> Result<(), DatabaseError> {
        self.tables
            .insert(table.table_name().to_string(), table.clone());
        Ok(())
    }

    fn delete_table(&mut self, table_name: &str) -> Result<(), DatabaseError> {
        if self.tables.remove(table_name).is_none() {
            return Err(DatabaseError::TableNotFound {
                name: table_name.to_string(),
            });
        }
        self.pages.retain(|(t, _), _| t != table_name);
        Ok(())
    }

    fn load_page(&self, table_name: &str, page_id: PageId) -> Result<Page, DatabaseError> {
        self.pages
            .get(&(table_name.to_string(), page_id))
            .cloned()
            .ok_or_else(|| DatabaseError::PageNotFound {
                table: table_name.to_string(),
                page_id,
            })
    }

    fn save_page(&mut self, page: &Page) -> Result<(), DatabaseError> {
        self.pages
            .insert((page.table_name.clone(), page.page_id), page.clone());
        self.page_writes += 1;
        Ok(())
    }

    fn delete_page(&mut self, table_name: &str, page_id: PageId) -> Result<(), DatabaseError> {
        self.pages
            .remove(&(table_name.to_string(), page_id))
            .map(|_| ())
            .ok_or_else(|| DatabaseError::PageNotFound {
                table: table_name.to_string(),
                page_id,
            })
    }
}
