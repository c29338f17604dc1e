//! Deterministic JSON canonicalization.
//!
//! An owner signs the *serialized* address book, so two logically equal
//! payloads must produce byte-identical bytes or the signature check becomes
//! order-dependent. Canonical form: primitives use their `serde_json` literal
//! form, arrays keep element order, and object keys are sorted
//! lexicographically before each `"key":value` pair is emitted.

use serde_json::Value;

/// Produces the canonical string form of a JSON value.
///
/// Two values with identical logical content (object key order disregarded)
/// canonicalize to byte-identical output. Array element order is preserved;
/// it is significant content, not presentation.
#[must_use]
pub fn canonicalize(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    let key = Value::String(k.clone()).to_string();
                    // Map lookup cannot miss: the key came from this map.
                    let val = map.get(k).map_or(Value::Null, Clone::clone);
                    format!("{key}:{}", canonicalize(&val))
                })
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(canonicalize).collect();
            format!("[{}]", parts.join(","))
        }
        primitive => primitive.to_string(),
    }
}
