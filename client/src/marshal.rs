use crate::codec::WireCodec;
use crate::error::ClientError;
use serde::Deserialize;
use serde_json::Value;
use vecstore_types::collection::Collection;
use vecstore_types::include::Include;
use vecstore_types::metadata::Metadata;
use vecstore_types::record::{Embedding, GetResult, QueryResult};

/// Body of a get response. Every field but `ids` may be missing entirely
#[derive(Debug, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    #[serde(default)]
    embeddings: Option<Vec<Embedding>>,
    #[serde(default)]
    metadatas: Option<Vec<Option<Metadata>>>,
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    uris: Option<Vec<Option<String>>>,
    #[serde(default)]
    included: Option<Vec<Include>>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    embeddings: Option<Vec<Vec<Embedding>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    uris: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    included: Option<Vec<Include>>,
}

/// Maps decoded response bodies into the typed result shapes
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMarshaler;

impl ResultMarshaler {
    /// `requested` is the include-list the caller sent and stands in when the server does not
    /// report one
    pub fn get_result(value: Value, requested: &[Include]) -> Result<GetResult, ClientError> {
        let response: GetResponse = WireCodec::shape(value)?;
        Ok(GetResult {
            ids: response.ids,
            embeddings: response.embeddings,
            metadatas: response.metadatas,
            documents: response.documents,
            uris: response.uris,
            data: None,
            included: response.included.unwrap_or_else(|| requested.to_vec()),
        })
    }

    pub fn query_result(value: Value, requested: &[Include]) -> Result<QueryResult, ClientError> {
        let response: QueryResponse = WireCodec::shape(value)?;
        Ok(QueryResult {
            ids: response.ids,
            embeddings: response.embeddings,
            metadatas: response.metadatas,
            documents: response.documents,
            uris: response.uris,
            data: None,
            distances: response.distances,
            included: response.included.unwrap_or_else(|| requested.to_vec()),
        })
    }

    pub fn collection(value: Value) -> Result<Collection, ClientError> {
        WireCodec::shape(value)
    }

    pub fn collections(value: Value) -> Result<Vec<Collection>, ClientError> {
        WireCodec::shape(value)
    }
}
