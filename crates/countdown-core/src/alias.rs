//! Payload key aliasing.
//!
//! Backend revisions disagree on whether command arguments are spelled
//! `target_at_minute` or `targetAtMinute`. Every outgoing payload carries both.

use serde_json::{Map, Value};

pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '_'
            && let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase)
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
            continue;
        }
        out.push(ch);
    }

    out
}

/// Returns a copy of `payload` with a camelCase duplicate of every snake_case key.
/// The snake_case value wins over a camelCase key already present.
pub fn with_payload_aliases(payload: &Map<String, Value>) -> Map<String, Value> {
    let mut normalized = payload.clone();
    for (key, value) in payload {
        if key.contains('_') {
            normalized.insert(to_camel_case(key), value.clone());
        }
    }
    normalized
}
