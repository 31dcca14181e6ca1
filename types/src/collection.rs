use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Opaque collection configuration, passed through to and from the server untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionConfiguration(pub Map<String, Value>);

impl CollectionConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

/// Descriptor of a collection as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub tenant: String,
    pub database: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    /// older servers name this field `configuration_json`
    #[serde(default, alias = "configuration_json")]
    pub configuration: Option<CollectionConfiguration>,
    #[serde(default)]
    pub dimension: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub id: Uuid,
    pub name: String,
    pub tenant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub name: String,
}
