use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::build::{BuildRecord, FieldPath};

/// Name used for missing values when the caller gives no default.
pub(super) const UNSET_BUCKET: &str = "(none)";

/// Number of records sharing one value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub count: usize,
}

/// Counts records per distinct value of the field at `path`.
///
/// Missing fields, paths through non-objects, and falsy values (`null`,
/// `false`, `""`, `0`) all count towards `default`. Buckets come out in the
/// order their value was first seen, and their counts sum to the number of
/// records.
pub fn aggregate<'a, I>(records: I, path: &FieldPath, default: Option<&str>) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'a BuildRecord>,
{
    let fallback = default.unwrap_or(UNSET_BUCKET);

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        let name = record
            .get(path)
            .and_then(bucket_name)
            .unwrap_or_else(|| fallback.to_string());
        *counts.entry(name).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(name, count)| Bucket { name, count })
        .collect()
}

/// Counts records whose field at `path` is exactly the string `expected`.
pub fn count_where<'a, I>(records: I, path: &FieldPath, expected: &str) -> usize
where
    I: IntoIterator<Item = &'a BuildRecord>,
{
    records
        .into_iter()
        .filter(|r| r.get(path).and_then(Value::as_str) == Some(expected))
        .count()
}

fn bucket_name(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
