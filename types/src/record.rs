use crate::include::Include;
use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// Parallel sequences describing the records of one add, update or upsert.
///
/// Field order here is the order the fields go out on the wire. Absent sequences are sent as
/// `null`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub ids: Vec<String>,
    pub embeddings: Option<Vec<Embedding>>,
    pub metadatas: Option<Vec<Metadata>>,
    pub documents: Option<Vec<String>>,
    pub uris: Option<Vec<String>>,
}

impl RecordBatch {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }

    pub fn embeddings(mut self, embeddings: Vec<Embedding>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn metadatas(mut self, metadatas: Vec<Metadata>) -> Self {
        self.metadatas = Some(metadatas);
        self
    }

    pub fn documents(mut self, documents: Vec<String>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn uris(mut self, uris: Vec<String>) -> Self {
        self.uris = Some(uris);
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// lengths of every optional sequence that is present, keyed by wire field name
    pub fn present_lengths(&self) -> Vec<(&'static str, usize)> {
        [
            ("embeddings", self.embeddings.as_ref().map(Vec::len)),
            ("metadatas", self.metadatas.as_ref().map(Vec::len)),
            ("documents", self.documents.as_ref().map(Vec::len)),
            ("uris", self.uris.as_ref().map(Vec::len)),
        ]
        .into_iter()
        .filter_map(|(field, len)| len.map(|len| (field, len)))
        .collect()
    }
}

/// Records returned by a get.
///
/// `None` on an optional field means the server did not send it at all, which is different from
/// an empty list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetResult {
    pub ids: Vec<String>,
    pub embeddings: Option<Vec<Embedding>>,
    pub metadatas: Option<Vec<Option<Metadata>>>,
    pub documents: Option<Vec<Option<String>>>,
    pub uris: Option<Vec<Option<String>>>,
    /// raw loaded payloads; never populated over HTTP
    pub data: Option<Vec<Value>>,
    pub included: Vec<Include>,
}

/// Records returned by a query, one inner list per query embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub ids: Vec<Vec<String>>,
    pub embeddings: Option<Vec<Vec<Embedding>>>,
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    pub documents: Option<Vec<Vec<Option<String>>>>,
    pub uris: Option<Vec<Vec<Option<String>>>>,
    pub data: Option<Vec<Vec<Value>>>,
    pub distances: Option<Vec<Vec<f32>>>,
    pub included: Vec<Include>,
}
