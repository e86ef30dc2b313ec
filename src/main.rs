use std::{collections::HashMap, env, process};

use tabula::{
    Config, DatabaseError, StorageManager, Value,
    executor::create_table::TableSchemaBuilder,
    types::value::DataType,
};

const DEMO_TABLE: &str = "Student";

fn run(config: Config) -> Result<(), DatabaseError> {
    let mut storage = StorageManager::new(config)?;

    if !storage.table_exists(DEMO_TABLE) {
        let builder = TableSchemaBuilder::new(DEMO_TABLE)
            .add_key_column("id", DataType::Integer, "0", "1000000")
            .add_column("name", DataType::Text, "A", "zzzzzzzzzz")
            .add_column("gpa", DataType::Real, "0.0", "4.0");
        storage.create_table_with_builder(builder)?;
    }

    let next_id = storage
        .load_table(DEMO_TABLE)?
        .rows_count() as i64
        + 1;
    let row = HashMap::from([
        ("id".to_string(), Value::Integer(next_id)),
        ("name".to_string(), Value::Text(format!("Student {}", next_id))),
        ("gpa".to_string(), Value::Real(3.5)),
    ]);
    storage.insert_into_table(DEMO_TABLE, row)?;

    let table = storage.load_table(DEMO_TABLE)?;
    println!(
        "Table '{}' clustered on '{}': {} rows in {} pages (capacity {})",
        table.table_name(),
        table.cluster_key(),
        table.rows_count(),
        table.page_count(),
        table.max_rows_per_page()
    );
    for (position, reference) in table.page_references().iter().enumerate() {
        let describe = |bound: &Option<Value>| {
            bound
                .as_ref()
                .map_or_else(|| "-".to_string(), |v| v.to_string())
        };
        println!(
            "  [{}] page {}: {} rows, keys {} .. {}",
            position,
            reference.page_id,
            reference.size,
            describe(&reference.min),
            describe(&reference.max)
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config '{}': {}", path, e);
                process::exit(2);
            }
        },
        None => Config::default(),
    };

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
