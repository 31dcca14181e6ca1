use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// A single metadata value attached to a record or collection.
///
/// Variant order matters for untagged decoding: integers must be tried before floats so that
/// `3` comes back as `Int(3)` and not `Float(3.0)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Metadata for a single record or collection
pub type Metadata = BTreeMap<String, MetadataValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integers_stay_integers() {
        let decoded: Metadata =
            serde_json::from_str(r#"{"page": 3, "score": 0.5, "draft": false, "title": "x"}"#)
                .unwrap();
        assert_eq!(decoded.get("page"), Some(&MetadataValue::Int(3)));
        assert_eq!(decoded.get("score"), Some(&MetadataValue::Float(0.5)));
        assert_eq!(decoded.get("draft"), Some(&MetadataValue::Bool(false)));
        assert_eq!(decoded.get("title"), Some(&MetadataValue::from("x")));
    }
}
