pub mod file_store;
pub mod persistence;
pub mod schema;
pub mod storage_manager;
pub mod table;

const TABLES_DIR: &str = "tables";
const PAGES_DIR: &str = "pages";
const METADATA_DIR: &str = "metadata";

const TABLE_FILE_EXTENSION: &str = "tbl";
const PAGE_FILE_EXTENSION: &str = "page";
const METADATA_FILE_EXTENSION: &str = "json";

// "TBLA" / "PAGE" in little-endian byte order
const TABLE_RECORD_MAGIC: u32 = 0x414C_4254;
const PAGE_RECORD_MAGIC: u32 = 0x4547_4150;

/// Magic (4) + checksum (4)
const RECORD_HEADER_SIZE: usize = 8;
