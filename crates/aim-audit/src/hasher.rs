// hasher.rs — SHA-256 hashing and canonical JSON.
//
// All hashes here are SHA-256, hex-encoded: a 32-byte digest rendered as a
// 64-character lowercase string for readability and JSON compatibility.
//
// Hashing structured data needs one byte sequence per value. `canonical_json`
// provides it: object keys sorted at every depth, no insignificant
// whitespace. Key order is rebuilt explicitly so the result does not depend
// on whether serde_json was compiled with `preserve_order`.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Hash arbitrary bytes, returning a lowercase hex-encoded SHA-256 string.
///
/// This is deterministic: the same input always produces the same output.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    // `format!("{:x}", ...)` produces lowercase hex
    format!("{:x}", result)
}

/// Hash a UTF-8 string, returning a lowercase hex-encoded SHA-256 string.
pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}

/// Render a JSON value in canonical form (recursively sorted keys, compact).
pub fn canonical_json(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Is `s` a 64-character lowercase hex SHA-256 digest?
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}
