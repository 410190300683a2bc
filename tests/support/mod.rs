#![allow(dead_code)]

use bucketdiff::{Fields, Record, Value};

pub fn identity() -> Vec<String> {
    vec!["id".to_string()]
}

pub fn row(id: i64, name: &str) -> Fields {
    [
        ("id".to_string(), Value::Int(id)),
        ("name".to_string(), Value::from(name)),
    ]
    .into_iter()
    .collect()
}

pub fn id_only(id: i64) -> Fields {
    [("id".to_string(), Value::Int(id))].into_iter().collect()
}

pub fn ids_of(records: &[Record]) -> Vec<i64> {
    let mut ids: Vec<i64> = records
        .iter()
        .map(|record| match record.fields().get("id") {
            Some(Value::Int(id)) => *id,
            other => panic!("unexpected id field {other:?}"),
        })
        .collect();
    ids.sort();
    ids
}
