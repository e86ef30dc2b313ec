use std::collections::HashMap;

use tabula::{
    config::Config,
    executor::{create_table::TableSchemaBuilder, predicate::Predicate},
    storage::storage_manager::StorageManager,
    types::{
        error::{DatabaseError, ErrorKind},
        value::{DataType, Value},
    },
    utils::mock::TempDatabase,
};

fn create_users_table(storage: &mut StorageManager) -> Result<(), DatabaseError> {
    let types = HashMap::from([
        ("id".to_string(), "integer".to_string()),
        ("name".to_string(), "text".to_string()),
        ("joined".to_string(), "date".to_string()),
    ]);
    let mins = HashMap::from([
        ("id".to_string(), "1".to_string()),
        ("name".to_string(), "A".to_string()),
        ("joined".to_string(), "2000-01-01".to_string()),
    ]);
    let maxes = HashMap::from([
        ("id".to_string(), "100000".to_string()),
        ("name".to_string(), "zzzz".to_string()),
        ("joined".to_string(), "2099-12-31".to_string()),
    ]);
    storage.create_table("users", "id", &types, &mins, &maxes)
}

fn create_user_row(id: i64, name: &str, joined: &str) -> HashMap<String, Value> {
    HashMap::from([
        ("id".to_string(), Value::Integer(id)),
        ("name".to_string(), Value::Text(name.to_string())),
        (
            "joined".to_string(),
            Value::from_string(joined, &tabula::types::value::DataType::Date).unwrap(),
        ),
    ])
}

#[test]
fn test_storage_manager_creation_new_database() {
    let mut temp_db = TempDatabase::with_prefix("new_db_test");
    let storage_manager = temp_db.create_storage_manager().unwrap();

    assert!(storage_manager.table_names().is_empty());
    assert_eq!(storage_manager.config.max_rows_per_page, 200);
    assert!(temp_db.path().join("tables").is_dir());
    assert!(temp_db.path().join("metadata").is_dir());
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_db = TempDatabase::with_prefix("bad_config_test");
    let config = Config::new(temp_db.path()).with_max_rows_per_page(0);

    match StorageManager::new(config) {
        Err(e) => assert_eq!(e.kind(), ErrorKind::Config),
        Ok(_) => panic!("expected InvalidConfig"),
    }
}

#[test]
fn test_create_duplicate_table_fails() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("duplicate_table_test");
    let storage = temp_db.create_storage_manager()?;
    create_users_table(storage)?;

    let err = create_users_table(storage).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(storage.table_names(), vec!["users".to_string()]);
    Ok(())
}

#[test]
fn test_open_existing_database() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("existing_db_test").with_max_rows_per_page(3);
    {
        let storage = temp_db.create_storage_manager()?;
        create_users_table(storage)?;
        for id in [5, 1, 9, 2, 7] {
            storage.insert_into_table("users", create_user_row(id, "Nour", "2020-05-17"))?;
        }
    }

    let storage = temp_db.create_storage_manager()?;
    assert!(storage.table_exists("users"));
    let table = storage.load_table("users")?;
    assert_eq!(table.rows_count(), 5);
    assert_eq!(table.page_count(), 2);

    let found = storage.lookup("users", &Value::Integer(7))?;
    assert_eq!(found.column_value("name"), Some(&Value::from("Nour")));
    assert!(storage.verify_table("users")?.is_empty());

    let schema = storage.get_table_schema("users").unwrap();
    let id_stats = &schema.get_column("id").unwrap().stats;
    assert_eq!(id_stats.min, Some(Value::Integer(1)));
    assert_eq!(id_stats.max, Some(Value::Integer(9)));
    Ok(())
}

#[test]
fn test_table_keeps_its_capacity_across_config_changes() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("capacity_test").with_max_rows_per_page(2);
    {
        let storage = temp_db.create_storage_manager()?;
        create_users_table(storage)?;
    }

    temp_db.max_rows_per_page = Some(50);
    let storage = temp_db.create_storage_manager()?;
    for id in 1..=5 {
        storage.insert_into_table("users", create_user_row(id, "Sami", "2010-01-01"))?;
    }

    let table = storage.load_table("users")?;
    assert_eq!(table.max_rows_per_page(), 2);
    assert_eq!(table.page_count(), 3);
    Ok(())
}

#[test]
fn test_get_page_by_position() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("get_page_test").with_max_rows_per_page(2);
    let storage = temp_db.create_storage_manager()?;
    create_users_table(storage)?;
    storage.insert_batch_into_table(
        "users",
        vec![
            create_user_row(5, "A", "2001-01-01"),
            create_user_row(1, "B", "2001-01-01"),
            create_user_row(9, "C", "2001-01-01"),
            create_user_row(2, "D", "2001-01-01"),
        ],
    )?;

    let page0 = storage.get_page("users", 0)?;
    let page1 = storage.get_page("users", 1)?;
    assert_eq!(page0.min(), Some(&Value::Integer(1)));
    assert_eq!(page0.max(), Some(&Value::Integer(2)));
    assert_eq!(page1.min(), Some(&Value::Integer(5)));
    assert_eq!(page1.max(), Some(&Value::Integer(9)));
    assert!(matches!(
        storage.get_page("users", 2),
        Err(DatabaseError::PagePositionOutOfBounds { .. })
    ));
    Ok(())
}

#[test]
fn test_drop_table_removes_everything() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("drop_table_test");
    let storage = temp_db.create_storage_manager()?;
    create_users_table(storage)?;
    storage.insert_into_table("users", create_user_row(1, "Lina", "2015-03-03"))?;

    storage.drop_table("users")?;

    assert!(!storage.table_exists("users"));
    assert!(storage.get_table_schema("users").is_none());
    assert!(!temp_db.path().join("tables").join("users").exists());
    assert!(!temp_db.path().join("metadata").join("users.json").exists());

    let storage = temp_db.get_storage_manager().unwrap();
    assert_eq!(
        storage.drop_table("users").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    // The name is free again
    create_users_table(storage)?;
    Ok(())
}

#[test]
fn test_operations_on_missing_table() {
    let mut temp_db = TempDatabase::with_prefix("missing_table_test");
    let storage = temp_db.create_storage_manager().unwrap();

    let insert = storage.insert_into_table("ghost", create_user_row(1, "X", "2001-01-01"));
    assert_eq!(insert.unwrap_err().kind(), ErrorKind::NotFound);

    let delete = storage.delete_from_table("ghost", &Predicate::eq("id", 1));
    assert_eq!(delete.unwrap_err().kind(), ErrorKind::NotFound);

    let update = storage.update_table("ghost", "1", &HashMap::new());
    assert_eq!(update.unwrap_err().kind(), ErrorKind::NotFound);

    assert!(storage.lookup("ghost", &Value::Integer(1)).is_err());
    assert!(storage.scan_table("ghost", None).is_err());
}

#[test]
fn test_table_names_cannot_escape_data_directory() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("unsafe_name_test");
    let storage = temp_db.create_storage_manager()?;
    create_users_table(storage)?;
    storage.insert_into_table("users", create_user_row(1, "Rami", "2010-05-05"))?;

    for name in ["..", ".", "../users", "a/b", "a\\b", "users.tbl", "with space"] {
        let err = storage
            .create_table_with_builder(
                TableSchemaBuilder::new(name).add_key_column("id", DataType::Integer, "0", "9"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch, "name {:?}", name);
        assert!(!storage.table_exists(name));
    }

    assert_eq!(storage.drop_table("..").unwrap_err().kind(), ErrorKind::NotFound);

    // Other tables are untouched, also after a reopen
    let storage = temp_db.create_storage_manager()?;
    assert_eq!(storage.table_names(), vec!["users".to_string()]);
    let found = storage.lookup("users", &Value::Integer(1))?;
    assert_eq!(found.column_value("name"), Some(&Value::from("Rami")));
    Ok(())
}
