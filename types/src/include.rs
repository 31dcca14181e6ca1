use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Optional fields a caller may ask a get or query operation to populate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Include {
    Documents,
    Embeddings,
    Metadatas,
    Distances,
    Uris,
    Data,
}

impl Include {
    /// include-list used by get when the caller does not pass one
    pub fn default_get() -> Vec<Include> {
        vec![Include::Metadatas, Include::Documents]
    }

    /// include-list used by query when the caller does not pass one
    pub fn default_query() -> Vec<Include> {
        vec![Include::Metadatas, Include::Documents, Include::Distances]
    }

    pub fn peek() -> Vec<Include> {
        vec![Include::Embeddings, Include::Documents, Include::Metadatas]
    }
}
