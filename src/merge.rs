//! One-level array-merge of two documents.
//!
//! Used to lay YAML annotation files over each other and over the scanned
//! JSON document. The merge only looks at top-level keys of `new`:
//!
//! - a list in `new` is appended to the existing value (a scalar is treated as
//!   a one-element list), without removing duplicates;
//! - a mapping in `new` is unioned with an existing mapping one level deep,
//!   entries from `new` replacing entries with the same key;
//! - everything else in `new` replaces the existing value.
//!
//! Values below the first level are never merged. A YAML file that redefines
//! `paths./users` replaces the scanned `/users` item completely.

use crate::spec::Document;
use serde_json::Value;

/// Merges `new` over `old` and returns the result.
///
/// Keys of `old` that are absent from `new` are kept unchanged; every key of
/// `new` is present in the result.
pub fn merge_documents(mut old: Document, new: &Document) -> Document {
    for (key, new_value) in new {
        let merged = match old.remove(key) {
            Some(old_value) if !old_value.is_null() => combine(old_value, new_value),
            _ => new_value.clone(),
        };
        old.insert(key.clone(), merged);
    }
    old
}

/// Combines an existing value with the incoming one for the same key.
fn combine(old: Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Array(mut items), Value::Array(more)) => {
            items.extend(more.iter().cloned());
            Value::Array(items)
        }
        (Value::Object(mut entries), Value::Object(more)) => {
            for (k, v) in more {
                entries.insert(k.clone(), v.clone());
            }
            Value::Object(entries)
        }
        (scalar, Value::Array(more)) if !scalar.is_object() => {
            let mut items = Vec::with_capacity(more.len() + 1);
            items.push(scalar);
            items.extend(more.iter().cloned());
            Value::Array(items)
        }
        (_, replacement) => replacement.clone(),
    }
}
