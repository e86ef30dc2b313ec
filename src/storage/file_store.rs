use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    storage::{
        PAGE_FILE_EXTENSION, PAGE_RECORD_MAGIC, PAGES_DIR, RECORD_HEADER_SIZE,
        TABLE_FILE_EXTENSION, TABLE_RECORD_MAGIC, TABLES_DIR, persistence::PageStore,
        schema::validate_table_name, table::Table,
    },
    types::{PageId, error::DatabaseError, page::Page},
    utils::hash::{calculate_record_checksum, verify_record_checksum},
};

/*
 * On-disk layout under the data directory:
 *
 *   tables/
 *   └── <table>/
 *       ├── <table>.tbl          table descriptor (page references, row count)
 *       └── pages/
 *           ├── 0.page
 *           └── 1.page
 *
 * Every record is framed as
 * ┌────────────┬──────────────┬──────────────────────────┐
 * │ magic (4)  │ crc32 (4)    │ bincode payload          │
 * └────────────┴──────────────┴──────────────────────────┘
 */

pub struct FileStore {
    root: PathBuf,
    sync_writes: bool,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(data_dir: P, sync_writes: bool) -> Result<Self, DatabaseError> {
        let root = data_dir.as_ref().join(TABLES_DIR);
        fs::create_dir_all(&root)?;
        Ok(Self { root, sync_writes })
    }

    pub fn table_dir(&self, table_name: &str) -> PathBuf {
        self.root.join(table_name)
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.table_dir(table_name)
            .join(format!("{}.{}", table_name, TABLE_FILE_EXTENSION))
    }

    pub fn pages_dir(&self, table_name: &str) -> PathBuf {
        self.table_dir(table_name).join(PAGES_DIR)
    }

    pub fn page_path(&self, table_name: &str, page_id: PageId) -> PathBuf {
        self.pages_dir(table_name)
            .join(format!("{}.{}", page_id, PAGE_FILE_EXTENSION))
    }

    /// Page ids with a record on disk, ascending.
    pub fn stored_page_ids(&self, table_name: &str) -> Result<Vec<PageId>, DatabaseError> {
        let dir = self.pages_dir(table_name);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut page_ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PAGE_FILE_EXTENSION) {
                continue;
            }
            if let Some(page_id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
            {
                page_ids.push(page_id);
            }
        }
        page_ids.sort_unstable();
        Ok(page_ids)
    }

    fn read_record(path: &Path) -> Result<Option<Vec<u8>>, DatabaseError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl PageStore for FileStore {
    fn table_exists(&self, table_name: &str) -> bool {
        self.table_path(table_name).exists()
    }

    fn load_table(&self, table_name: &str) -> Result<Table, DatabaseError> {
        let path = self.table_path(table_name);
        let bytes = Self::read_record(&path)?.ok_or_else(|| DatabaseError::TableNotFound {
            name: table_name.to_string(),
        })?;
        decode_record(TABLE_RECORD_MAGIC, &bytes, &path)
    }

    fn save_table(&mut self, table: &Table) -> Result<(), DatabaseError> {
        validate_table_name(table.table_name())?;
        fs::create_dir_all(self.pages_dir(table.table_name()))?;
        let bytes = encode_record(TABLE_RECORD_MAGIC, table)?;
        write_atomic(&self.table_path(table.table_name()), &bytes, self.sync_writes)
    }

    fn delete_table(&mut self, table_name: &str) -> Result<(), DatabaseError> {
        validate_table_name(table_name)?;
        match fs::remove_dir_all(self.table_dir(table_name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DatabaseError::TableNotFound {
                name: table_name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn load_page(&self, table_name: &str, page_id: PageId) -> Result<Page, DatabaseError> {
        let path = self.page_path(table_name, page_id);
        let bytes = Self::read_record(&path)?.ok_or_else(|| DatabaseError::PageNotFound {
            table: table_name.to_string(),
            page_id,
        })?;
        decode_record(PAGE_RECORD_MAGIC, &bytes, &path)
    }

    fn save_page(&mut self, page: &Page) -> Result<(), DatabaseError> {
        let bytes = encode_record(PAGE_RECORD_MAGIC, page)?;
        write_atomic(
            &self.page_path(&page.table_name, page.page_id),
            &bytes,
            self.sync_writes,
        )
    }

    fn delete_page(&mut self, table_name: &str, page_id: PageId) -> Result<(), DatabaseError> {
        match fs::remove_file(self.page_path(table_name, page_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DatabaseError::PageNotFound {
                table: table_name.to_string(),
                page_id,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn encode_record<T: Serialize>(magic: u32, value: &T) -> Result<Vec<u8>, DatabaseError> {
    let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())?;

    let mut buffer = Vec::with_capacity(RECORD_HEADER_SIZE + payload.len());
    buffer.extend_from_slice(&magic.to_le_bytes());
    buffer.extend_from_slice(&calculate_record_checksum(magic, &payload).to_le_bytes());
    buffer.extend_from_slice(&payload);
    Ok(buffer)
}

pub(crate) fn decode_record<T: DeserializeOwned>(
    magic: u32,
    bytes: &[u8],
    path: &Path,
) -> Result<T, DatabaseError> {
    let corrupted = |reason: String| DatabaseError::CorruptedRecord {
        path: path.display().to_string(),
        reason,
    };

    if bytes.len() < RECORD_HEADER_SIZE {
        return Err(corrupted(format!(
            "record is {} bytes, shorter than its header",
            bytes.len()
        )));
    }

    let stored_magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if stored_magic != magic {
        return Err(corrupted(format!(
            "unexpected magic {:#010x}, expected {:#010x}",
            stored_magic, magic
        )));
    }

    let checksum = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let payload = &bytes[RECORD_HEADER_SIZE..];
    if !verify_record_checksum(magic, payload, checksum) {
        return Err(corrupted("checksum mismatch".to_string()));
    }

    let (value, _) = bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok(value)
}

/// Writes to a sibling temp file and renames it over `path`, so readers
/// only ever see a complete record.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8], sync: bool) -> Result<(), DatabaseError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)?;
    file.write_all(bytes)?;
    if sync {
        file.sync_all()?;
    }
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
