//! Process-wide constant table.
//!
//! Constants configured for a run are defined here before scanning, and the
//! scanner substitutes `${NAME}` references in annotation text with their
//! values. A name, once defined, keeps its first value for the lifetime of the
//! process: later runs in the same process see constants from earlier runs.
//! [`reset`] clears the table for embedders that need a clean slate.

use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

static CONSTANTS: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();

fn table() -> MutexGuard<'static, HashMap<String, String>> {
    CONSTANTS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Defines `name` unless it is already defined. Returns whether it was added.
pub fn define(name: &str, value: &str) -> bool {
    let mut constants = table();
    if constants.contains_key(name) {
        debug!("Constant {} already defined, keeping existing value", name);
        return false;
    }
    debug!("Defining constant {}", name);
    constants.insert(name.to_string(), value.to_string());
    true
}

pub fn is_defined(name: &str) -> bool {
    table().contains_key(name)
}

pub fn lookup(name: &str) -> Option<String> {
    table().get(name).cloned()
}

/// Removes every definition.
pub fn reset() {
    table().clear();
}

/// Replaces `${NAME}` references with defined values.
///
/// References to undefined names are left as written.
pub fn substitute(text: &str) -> String {
    if !text.contains("${") {
        return text.to_string();
    }

    let constants = table();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match constants.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + end + 3]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
