use std::collections::HashMap;

use tempfile::tempdir;

use tabula::{
    config::Config,
    executor::create_table::{CreateTableExecutor, TableCreator, TableSchemaBuilder},
    storage::{persistence::PageStore, schema::TableSchema, storage_manager::StorageManager},
    types::{
        error::{DatabaseError, ErrorKind},
        value::{DataType, Value},
    },
};

fn setup_test_db() -> (StorageManager, tempfile::TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = Config::new(temp_dir.path().join("data")).with_max_rows_per_page(4);
    let storage_manager = StorageManager::new(config).expect("Failed to create storage manager");
    (storage_manager, temp_dir)
}

fn pairs(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn student_builder() -> TableSchemaBuilder {
    TableSchemaBuilder::new("Student")
        .add_key_column("id", DataType::Integer, "0", "9999")
        .add_column("name", DataType::Text, "A", "zzzzzzzz")
        .add_column("gpa", DataType::Real, "0.0", "4.0")
        .add_column("birthday", DataType::Date, "1990-01-01", "2010-12-31")
}

#[test]
fn test_create_table_with_builder() {
    let (mut storage_manager, _temp_dir) = setup_test_db();

    let result = storage_manager.create_table_with_builder(student_builder());
    assert!(result.is_ok());

    // Verify table exists
    assert!(storage_manager.table_exists("Student"));

    // Verify schema is stored correctly
    let schema = storage_manager.get_table_schema("Student").unwrap();
    assert_eq!(schema.clustering_key, "id");
    assert_eq!(schema.columns.len(), 4);

    let birthday = schema.get_column("birthday").unwrap();
    assert_eq!(birthday.data_type, DataType::Date);
    assert_eq!(birthday.min.to_string(), "1990-01-01");
    assert!(!birthday.clustering_key);

    // An empty table descriptor is stored with the configured capacity
    let table = storage_manager.load_table("Student").unwrap();
    assert_eq!(table.page_count(), 0);
    assert_eq!(table.rows_count(), 0);
    assert_eq!(table.max_rows_per_page(), 4);
    assert!(storage_manager.store.table_exists("Student"));
}

#[test]
fn test_create_table_executor_directly() -> Result<(), DatabaseError> {
    let (mut storage_manager, _temp_dir) = setup_test_db();
    let schema = student_builder().build()?;

    let mut executor = CreateTableExecutor::new(&mut storage_manager);
    assert!(!executor.table_exists("Student"));
    executor.create_table(schema.clone())?;
    assert!(executor.table_exists("Student"));

    let err = executor.create_table(schema).unwrap_err();
    assert!(matches!(err, DatabaseError::TableAlreadyExists { ref name } if name == "Student"));
    Ok(())
}

#[test]
fn test_builder_requires_clustering_key() {
    let result = TableSchemaBuilder::new("t")
        .add_column("a", DataType::Integer, "0", "1")
        .build();
    assert_eq!(result.unwrap_err().kind(), ErrorKind::SchemaMismatch);

    let no_columns = TableSchemaBuilder::new("t").clustering_key("a").build();
    assert_eq!(no_columns.unwrap_err().kind(), ErrorKind::SchemaMismatch);

    let key_not_a_column = TableSchemaBuilder::new("t")
        .add_column("a", DataType::Integer, "0", "1")
        .clustering_key("b")
        .build();
    assert_eq!(key_not_a_column.unwrap_err().kind(), ErrorKind::SchemaMismatch);
}

#[test]
fn test_builder_rejects_bad_ranges() {
    let unparsable = TableSchemaBuilder::new("t")
        .add_key_column("a", DataType::Date, "yesterday", "2020-01-01")
        .build();
    assert_eq!(unparsable.unwrap_err().kind(), ErrorKind::InvalidValue);

    let inverted = TableSchemaBuilder::new("t")
        .add_key_column("a", DataType::Real, "5.5", "1.0")
        .build();
    assert_eq!(inverted.unwrap_err().kind(), ErrorKind::SchemaMismatch);
}

#[test]
fn test_create_table_from_type_names() -> Result<(), DatabaseError> {
    let (mut storage_manager, _temp_dir) = setup_test_db();

    storage_manager.create_table(
        "Course",
        "code",
        &pairs(&[("code", "java.lang.String"), ("hours", "java.lang.Integer")]),
        &pairs(&[("code", "AAA"), ("hours", "1")]),
        &pairs(&[("code", "ZZZ"), ("hours", "6")]),
    )?;

    let schema: &TableSchema = storage_manager.get_table_schema("Course").unwrap();
    assert_eq!(schema.get_column("hours").unwrap().max, Value::Integer(6));
    assert_eq!(storage_manager.table_names(), vec!["Course".to_string()]);
    Ok(())
}

#[test]
fn test_schema_survives_reopen() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let config = Config::new(temp_dir.path());
    {
        let mut storage_manager = StorageManager::new(config.clone())?;
        storage_manager.create_table_with_builder(student_builder())?;
    }

    let storage_manager = StorageManager::new(config)?;
    let expected = student_builder().build()?;
    assert_eq!(storage_manager.get_table_schema("Student"), Some(&expected));
    Ok(())
}
