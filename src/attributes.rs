//! Decoder for the free-form "predicted attributes" cell.
//!
//! Two dialects show up in the sheet: a JSON object (`{"type":"construction"}`)
//! and loose `key:value, key:value` text. Parsing never fails; the worst case
//! is an empty map.

use indexmap::IndexMap;
use serde_json::Value;

use crate::structures::Attributes;

const STRIP_CHARS: &[char] = &['\'', '"', '{', '}'];

pub fn parse_predicted_attributes(raw: Option<&str>) -> Attributes {
    let raw = match raw {
        Some(text) if !text.is_empty() => text,
        _ => return Attributes::new(),
    };

    parse_json_object(raw).unwrap_or_else(|| parse_loose_pairs(raw))
}

/// Strict dialect. Only a JSON object counts; arrays and scalars fall through.
fn parse_json_object(raw: &str) -> Option<Attributes> {
    let object: IndexMap<String, Value> = serde_json::from_str(raw).ok()?;

    Some(
        object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
    )
}

/// Permissive dialect: comma-separated pairs split on the first colon.
fn parse_loose_pairs(raw: &str) -> Attributes {
    let mut attributes = Attributes::new();

    for pair in raw.split(',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };

        let key = strip_token(key);
        let value = strip_token(value);
        if !key.is_empty() && !value.is_empty() {
            attributes.insert(key.to_string(), value.to_string());
        }
    }

    attributes
}

fn strip_token(token: &str) -> &str {
    token.trim().trim_matches(STRIP_CHARS).trim()
}
