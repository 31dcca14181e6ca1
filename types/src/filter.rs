use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata filter. The empty filter `{}` matches everything and is what the server expects when
/// no filtering is wanted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Where(pub Map<String, Value>);

/// Document content filter, same shape rules as [`Where`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhereDocument(pub Map<String, Value>);

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// adds a clause, e.g. `Where::new().clause("genre", json!({"$eq": "jazz"}))`
    pub fn clause(mut self, key: impl Into<String>, condition: impl Into<Value>) -> Self {
        self.0.insert(key.into(), condition.into());
        self
    }
}

impl WhereDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(text: impl Into<String>) -> Self {
        let mut inner = Map::new();
        inner.insert("$contains".to_string(), Value::String(text.into()));
        Self(inner)
    }
}
