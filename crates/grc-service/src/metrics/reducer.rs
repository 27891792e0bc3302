//! Pure folds over records that are already in memory.
//!
//! Fields are read through each record's serde representation, so any
//! serializable record type works and the field name is the column name.
//! Nothing here fails: missing or malformed data degrades to an empty map,
//! `None` or `0.0`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use grc_core::query::predicate::scalar_text;

fn field_value<T: Serialize>(record: &T, field: &str) -> Option<Value> {
    match serde_json::to_value(record).ok()? {
        Value::Object(mut map) => map.remove(field),
        _ => None,
    }
}

/// Number of records per distinct value of `field`. Records where the field
/// is missing, null or not a scalar are not counted.
pub fn count_by<T: Serialize>(records: &[T], field: &str) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(key) = field_value(record, field).as_ref().and_then(scalar_text) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Mean of the numeric `field` over records accepted by `filter`.
/// `None` when no accepted record has a number there.
pub fn average<T, F>(records: &[T], field: &str, filter: F) -> Option<f64>
where
    T: Serialize,
    F: Fn(&T) -> bool,
{
    let (sum, n) = records
        .iter()
        .filter(|&r| filter(r))
        .filter_map(|r| field_value(r, field)?.as_f64())
        .fold((0.0, 0u64), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Mean of plain values; `None` when there are none.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0u64), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// `part` as a percentage of `whole`; `0.0` when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Sum of the counts whose key is in `keys`.
pub fn sum_of(counts: &BTreeMap<String, u64>, keys: &[&str]) -> u64 {
    keys.iter().filter_map(|k| counts.get(*k)).sum()
}
