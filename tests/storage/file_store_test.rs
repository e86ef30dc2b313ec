use std::fs;

use tabula::{
    storage::{file_store::FileStore, persistence::PageStore, table::Table},
    types::{
        error::{DatabaseError, ErrorKind},
        page::Page,
        tuple::Tuple,
        value::Value,
    },
};
use tempfile::TempDir;

fn sample_page(page_id: u64) -> Page {
    let mut page = Page::new("items", page_id, 4);
    for id in [3, 1, 2] {
        let tuple = Tuple::new(
            "id",
            [
                ("id".to_string(), Value::Integer(id + page_id as i64 * 10)),
                ("label".to_string(), Value::Text(format!("item-{}", id))),
                ("weight".to_string(), Value::Real(id as f64 * 1.5)),
            ],
        )
        .unwrap();
        page.insert(tuple).unwrap();
    }
    page
}

#[test]
fn test_page_save_and_load() -> Result<(), DatabaseError> {
    let dir = TempDir::new()?;
    let mut store = FileStore::open(dir.path(), false)?;

    let page = sample_page(7);
    store.save_page(&page)?;

    assert!(store.page_path("items", 7).exists());
    assert_eq!(store.load_page("items", 7)?, page);
    assert_eq!(store.stored_page_ids("items")?, vec![7]);
    Ok(())
}

#[test]
fn test_table_descriptor_save_and_load() -> Result<(), DatabaseError> {
    let dir = TempDir::new()?;
    let mut store = FileStore::open(dir.path(), true)?;

    let mut table = Table::new("items", "id", 2);
    assert!(!store.table_exists("items"));
    store.save_table(&table)?;
    assert!(store.table_exists("items"));

    for id in [4, 8, 15, 16, 23] {
        let tuple = Tuple::new("id", [("id".to_string(), Value::Integer(id))])?;
        table.insert(tuple, &mut store)?;
    }
    store.save_table(&table)?;

    let loaded = store.load_table("items")?;
    assert_eq!(loaded, table);
    assert_eq!(loaded.rows_count(), 5);
    assert_eq!(store.stored_page_ids("items")?.len(), loaded.page_count());
    Ok(())
}

#[test]
fn test_missing_records_report_not_found() -> Result<(), DatabaseError> {
    let dir = TempDir::new()?;
    let mut store = FileStore::open(dir.path(), false)?;

    assert!(matches!(
        store.load_table("ghost"),
        Err(DatabaseError::TableNotFound { .. })
    ));
    match store.load_page("ghost", 3) {
        Err(DatabaseError::PageNotFound { table, page_id }) => {
            assert_eq!(table, "ghost");
            assert_eq!(page_id, 3);
        }
        other => panic!("expected PageNotFound, got {:?}", other),
    }
    assert_eq!(
        store.delete_page("ghost", 0).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        store.delete_table("ghost").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    Ok(())
}

#[test]
fn test_corrupted_page_is_detected() -> Result<(), DatabaseError> {
    let dir = TempDir::new()?;
    let mut store = FileStore::open(dir.path(), false)?;
    store.save_page(&sample_page(0))?;

    let path = store.page_path("items", 0);
    let mut bytes = fs::read(&path)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, &bytes)?;

    match store.load_page("items", 0) {
        Err(DatabaseError::CorruptedRecord { reason, .. }) => {
            assert!(reason.contains("checksum"));
        }
        other => panic!("expected CorruptedRecord, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_truncated_and_foreign_records_are_rejected() -> Result<(), DatabaseError> {
    let dir = TempDir::new()?;
    let mut store = FileStore::open(dir.path(), false)?;
    store.save_page(&sample_page(1))?;
    store.save_table(&Table::new("items", "id", 4))?;

    // A table record where a page is expected fails the magic check
    fs::copy(store.table_path("items"), store.page_path("items", 2))?;
    let err = store.load_page("items", 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);

    fs::write(store.page_path("items", 3), [1u8, 2, 3])?;
    assert!(matches!(
        store.load_page("items", 3),
        Err(DatabaseError::CorruptedRecord { .. })
    ));
    Ok(())
}

#[test]
fn test_delete_page_and_table() -> Result<(), DatabaseError> {
    let dir = TempDir::new()?;
    let mut store = FileStore::open(dir.path(), false)?;
    store.save_table(&Table::new("items", "id", 4))?;
    store.save_page(&sample_page(0))?;
    store.save_page(&sample_page(1))?;

    store.delete_page("items", 0)?;
    assert_eq!(store.stored_page_ids("items")?, vec![1]);

    store.delete_table("items")?;
    assert!(!store.table_exists("items"));
    assert!(!store.table_dir("items").exists());
    Ok(())
}
