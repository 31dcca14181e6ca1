//! An async rust client for talking to a vecstore vector database over HTTP
//!
//! Ships primarily the client, config and error submodules
//!
//! ## Connections
//!
//! Every execution context (each tokio runtime) gets its own keep-alive
//! connection pool from a [`registry::ConnectionRegistry`], so a client built on one runtime can
//! be handed to tasks on another without sharing sockets across schedulers. Calls made outside
//! any runtime fall back to a single shared pool.
//!
//! ```rust,no_run
//! use vecstore_client_rs::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let client = VecStoreClient::connect(ClientConfig::default().port(8000)).await?;
//! let nanos = client.heartbeat().await?;
//! client.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Batches
//!
//! add, update and upsert validate every present field of a [`prelude::RecordBatch`] against the
//! number of ids, then check the batch size against the server limit which is fetched once and
//! cached for the lifetime of the client. Nothing is retried: any failure comes straight back to
//! the caller.
//!
//! ## Lib Types
//!
//! Necessary library types to pass into client methods can be found from prelude
//!
//! ```rust,no_run
//! use vecstore_client_rs::prelude::*;
//!
//! # async fn run(client: VecStoreClient, id: Uuid) -> Result<(), ClientError> {
//! let page = client
//!     .get(
//!         id,
//!         GetRequest::new()
//!             .filter(Where::new().clause("lang", serde_json::json!({"$eq": "en"})))
//!             .page(2, 50),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
pub mod batch;
pub mod client;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod marshal;
pub mod prelude;
pub mod registry;
pub mod transport;

#[cfg(test)]
mod tests;
