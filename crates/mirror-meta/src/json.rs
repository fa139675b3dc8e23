//! Canonical JSON serialization
//!
//! Metadata files are written pretty-printed with a four-space indent,
//! unescaped slashes and raw unicode, keeping the key order they were read
//! with. Include file names embed the SHA-1 of exactly these bytes.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{Error, Result};

const INDENT: &[u8] = b"    ";

/// Serialize `value` in the canonical metadata form.
pub fn to_canonical_vec(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).map_err(Error::Serialize)?;
    Ok(out)
}

/// Parse JSON `content` read from `path`.
pub fn parse(path: &str, content: &[u8]) -> Result<Value> {
    serde_json::from_slice(content).map_err(|source| Error::Parse {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn canonical_form_uses_four_spaces() {
        let bytes = to_canonical_vec(&json!({"a": [1]})).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "{\n    \"a\": [\n        1\n    ]\n}"
        );
    }

    #[test]
    fn slashes_and_unicode_are_not_escaped() {
        let bytes = to_canonical_vec(&json!({"url": "https://example.com/a", "name": "Jürgen"})).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("https://example.com/a"), "slashes escaped: {text}");
        assert!(text.contains("Jürgen"), "unicode escaped: {text}");
    }

    #[test]
    fn key_order_is_preserved() {
        let value = parse("t.json", br#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let text = String::from_utf8(to_canonical_vec(&value).unwrap()).unwrap();
        let z = text.find("\"z\"").unwrap();
        let a = text.find("\"a\"").unwrap();
        let m = text.find("\"m\"").unwrap();
        assert!(z < a && a < m, "keys reordered: {text}");
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse("p2/acme/foo.json", b"{not json").unwrap_err();
        assert!(err.to_string().contains("p2/acme/foo.json"));
    }
}
