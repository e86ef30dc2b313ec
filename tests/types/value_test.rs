use std::cmp::Ordering;

use chrono::NaiveDate;
use tabula::types::{
    error::{DatabaseError, ErrorKind},
    value::{DataType, Value},
};

#[test]
fn test_data_type_from_string() -> Result<(), DatabaseError> {
    assert_eq!(DataType::from_string("INTEGER")?, DataType::Integer);
    assert_eq!(DataType::from_string("int")?, DataType::Integer);
    assert_eq!(DataType::from_string("java.lang.Integer")?, DataType::Integer);
    assert_eq!(DataType::from_string("double")?, DataType::Real);
    assert_eq!(DataType::from_string("java.lang.Double")?, DataType::Real);
    assert_eq!(DataType::from_string("varchar")?, DataType::Text);
    assert_eq!(DataType::from_string("java.lang.String")?, DataType::Text);
    assert_eq!(DataType::from_string(" Date ")?, DataType::Date);
    assert_eq!(DataType::from_string("java.util.Date")?, DataType::Date);

    let err = DataType::from_string("blob").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    Ok(())
}

#[test]
fn test_value_from_string_per_type() -> Result<(), DatabaseError> {
    assert_eq!(
        Value::from_string("42", &DataType::Integer)?,
        Value::Integer(42)
    );
    assert_eq!(Value::from_string("3.25", &DataType::Real)?, Value::Real(3.25));
    assert_eq!(
        Value::from_string("Ahmed", &DataType::Text)?,
        Value::Text("Ahmed".to_string())
    );
    assert_eq!(
        Value::from_string("2024-02-29", &DataType::Date)?,
        Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
    );
    Ok(())
}

#[test]
fn test_value_from_string_rejects_malformed_literals() {
    let cases = [
        ("forty", DataType::Integer),
        ("1.5", DataType::Integer),
        ("abc", DataType::Real),
        ("", DataType::Text),
        ("2023-02-30", DataType::Date),
        ("29/02/2024", DataType::Date),
    ];
    for (literal, data_type) in cases {
        match Value::from_string(literal, &data_type) {
            Err(DatabaseError::InvalidValue { .. }) => {}
            other => panic!("expected InvalidValue for {:?}, got {:?}", literal, other),
        }
    }
}

#[test]
fn test_value_compare_is_total() {
    assert_eq!(Value::Integer(1).compare(&Value::Integer(2)), Ordering::Less);
    assert_eq!(Value::Integer(2).compare(&Value::Real(1.5)), Ordering::Greater);
    assert_eq!(Value::Real(2.0).compare(&Value::Integer(2)), Ordering::Equal);
    assert_eq!(
        Value::from("apple").compare(&Value::from("banana")),
        Ordering::Less
    );
    assert_eq!(Value::Real(f64::NAN).compare(&Value::Real(f64::NAN)), Ordering::Equal);

    // Unrelated types order by type rank instead of failing
    assert_eq!(Value::Integer(100).compare(&Value::from("a")), Ordering::Less);
}

#[test]
fn test_value_display_and_type() {
    let date = Value::Date(NaiveDate::from_ymd_opt(2001, 9, 3).unwrap());
    assert_eq!(date.to_string(), "2001-09-03");
    assert_eq!(date.data_type(), DataType::Date);
    assert_eq!(Value::Integer(7).to_string(), "7");
    assert!(Value::Real(1.0).is_compatible_with_type(&DataType::Real));
    assert!(!Value::Integer(1).is_compatible_with_type(&DataType::Real));
    assert_eq!(DataType::Real.to_string(), "REAL");
}
