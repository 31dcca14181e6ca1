use crate::batch::BatchSubmitter;
use crate::codec::WireCodec;
use crate::config::ClientConfig;
use crate::dispatch::{QueryParams, RequestDispatcher, NO_BODY};
use crate::error::{ClientError, ValidationError};
use crate::lifecycle::{ClientState, Lifecycle};
use crate::marshal::ResultMarshaler;
use crate::registry::ConnectionRegistry;
use crate::transport::{HttpTransport, Transport};
use http::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use vecstore_types::collection::{Collection, CollectionConfiguration, Database, Tenant};
use vecstore_types::include::Include;
use vecstore_types::metadata::Metadata;
use vecstore_types::record::{GetResult, QueryResult, RecordBatch};
use vecstore_types::request::{DeleteRequest, GetRequest, QueryRequest};

#[derive(Debug, Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCollectionBody<'a> {
    name: &'a str,
    metadata: Option<&'a Metadata>,
    configuration: Option<&'a CollectionConfiguration>,
    get_or_create: bool,
}

#[derive(Debug, Serialize)]
struct ModifyCollectionBody<'a> {
    new_name: Option<&'a str>,
    new_metadata: Option<&'a Metadata>,
}

#[derive(Debug, Deserialize)]
struct Heartbeat {
    #[serde(rename = "nanosecond heartbeat")]
    nanoseconds: u64,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    lifecycle: Lifecycle,
    dispatcher: RequestDispatcher,
    batches: BatchSubmitter,
}

/// Async client for the vecstore HTTP API.
///
/// Cheap to clone; clones share the lifecycle, the connection registry and the cached batch
/// limit. Calls may be issued from any number of tasks and runtimes, each runtime gets its
/// own connection pool. No ordering is guaranteed between calls made concurrently.
///
/// ```no_run
/// use vecstore_client_rs::prelude::*;
///
/// # async fn run() -> Result<(), ClientError> {
/// let client = VecStoreClient::connect(ClientConfig::default()).await?;
/// let collection = client.get_or_create_collection("docs", None, None, None, None).await?;
/// client
///     .add(
///         collection.id,
///         RecordBatch::new(vec!["a".into()]).embeddings(vec![vec![0.1, 0.2]]),
///     )
///     .await?;
/// client.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VecStoreClient {
    inner: Arc<ClientInner>,
}

impl VecStoreClient {
    /// client over http in the `Created` state
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let registry = Arc::new(ConnectionRegistry::new(config.request_timeout()));
        Self::with_transport(config, Arc::new(HttpTransport::new(registry)))
    }

    /// client over any transport, in the `Created` state
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let dispatcher = RequestDispatcher::new(config.resolve_url()?, transport);
        Ok(Self {
            inner: Arc::new(ClientInner {
                batches: BatchSubmitter::new(dispatcher.clone()),
                dispatcher,
                lifecycle: Lifecycle::new(),
                config,
            }),
        })
    }

    /// new + start
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Self::new(config)?;
        client.start();
        Ok(client)
    }

    pub fn start(&self) -> ClientState {
        self.inner.lifecycle.start()
    }

    pub fn state(&self) -> ClientState {
        self.inner.lifecycle.state()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    fn running(&self, operation: &'static str) -> Result<&RequestDispatcher, ClientError> {
        self.inner.lifecycle.ensure_running(operation)?;
        Ok(&self.inner.dispatcher)
    }

    fn tenant<'a>(&'a self, tenant: Option<&'a str>) -> &'a str {
        tenant.unwrap_or(self.inner.config.tenant.as_str())
    }

    fn database<'a>(&'a self, database: Option<&'a str>) -> &'a str {
        database.unwrap_or(self.inner.config.database.as_str())
    }

    fn scope(&self, tenant: Option<&str>, database: Option<&str>) -> QueryParams {
        QueryParams::new()
            .with("tenant", self.tenant(tenant))
            .with("database", self.database(database))
    }

    /// server time in nanoseconds
    #[tracing::instrument(skip(self))]
    pub async fn heartbeat(&self) -> Result<u64, ClientError> {
        let response = self
            .running("heartbeat")?
            .dispatch(Method::GET, "", QueryParams::new(), NO_BODY)
            .await?;
        let heartbeat: Heartbeat = WireCodec::shape(response)?;
        Ok(heartbeat.nanoseconds)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_database(&self, name: &str, tenant: Option<&str>) -> Result<(), ClientError> {
        self.running("create_database")?
            .dispatch(
                Method::POST,
                "/databases",
                QueryParams::new().with("tenant", self.tenant(tenant)),
                Some(&NameBody { name }),
            )
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_database(&self, name: &str, tenant: Option<&str>) -> Result<Database, ClientError> {
        let response = self
            .running("get_database")?
            .dispatch(
                Method::GET,
                &format!("/databases/{name}"),
                QueryParams::new().with("tenant", self.tenant(tenant)),
                NO_BODY,
            )
            .await?;
        WireCodec::shape(response)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_tenant(&self, name: &str) -> Result<(), ClientError> {
        self.running("create_tenant")?
            .dispatch(Method::POST, "/tenants", QueryParams::new(), Some(&NameBody { name }))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_tenant(&self, name: &str) -> Result<Tenant, ClientError> {
        let response = self
            .running("get_tenant")?
            .dispatch(Method::GET, &format!("/tenants/{name}"), QueryParams::new(), NO_BODY)
            .await?;
        WireCodec::shape(response)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_collections(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<Vec<Collection>, ClientError> {
        let response = self
            .running("list_collections")?
            .dispatch(
                Method::GET,
                "/collections",
                self.scope(tenant, database)
                    .with_opt("limit", limit)
                    .with_opt("offset", offset),
                NO_BODY,
            )
            .await?;
        ResultMarshaler::collections(response)
    }

    #[tracing::instrument(skip(self))]
    pub async fn count_collections(
        &self,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<u64, ClientError> {
        let response = self
            .running("count_collections")?
            .dispatch(
                Method::GET,
                "/count_collections",
                self.scope(tenant, database),
                NO_BODY,
            )
            .await?;
        WireCodec::shape(response)
    }

    /// Whether an existing collection is an error or is returned as is, is decided by the server
    /// from `get_or_create`
    #[tracing::instrument(skip(self, configuration, metadata))]
    pub async fn create_collection(
        &self,
        name: &str,
        configuration: Option<&CollectionConfiguration>,
        metadata: Option<&Metadata>,
        get_or_create: bool,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<Collection, ClientError> {
        let response = self
            .running("create_collection")?
            .dispatch(
                Method::POST,
                "/collections",
                self.scope(tenant, database),
                Some(&CreateCollectionBody {
                    name,
                    metadata,
                    configuration,
                    get_or_create,
                }),
            )
            .await?;
        ResultMarshaler::collection(response)
    }

    #[tracing::instrument(skip(self, configuration, metadata))]
    pub async fn get_or_create_collection(
        &self,
        name: &str,
        configuration: Option<&CollectionConfiguration>,
        metadata: Option<&Metadata>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<Collection, ClientError> {
        self.create_collection(name, configuration, metadata, true, tenant, database)
            .await
    }

    /// Looks a collection up by exactly one of name or id. A lookup by id also carries the id as
    /// the `type` query parameter
    #[tracing::instrument(skip(self))]
    pub async fn get_collection(
        &self,
        name: Option<&str>,
        id: Option<Uuid>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<Collection, ClientError> {
        let dispatcher = self.running("get_collection")?;
        let (path, params) = match (name, id) {
            (Some(name), None) => (format!("/collections/{name}"), self.scope(tenant, database)),
            (None, Some(id)) => (
                format!("/collections/{id}"),
                self.scope(tenant, database).with("type", id),
            ),
            (None, None) => return Err(ValidationError::NameOrIdRequired.into()),
            (Some(_), Some(_)) => return Err(ValidationError::NameAndIdConflict.into()),
        };
        let response = dispatcher
            .dispatch(Method::GET, &path, params, NO_BODY)
            .await?;
        ResultMarshaler::collection(response)
    }

    #[tracing::instrument(skip(self, new_metadata))]
    pub async fn modify_collection(
        &self,
        id: Uuid,
        new_name: Option<&str>,
        new_metadata: Option<&Metadata>,
    ) -> Result<(), ClientError> {
        self.running("modify_collection")?
            .dispatch(
                Method::PUT,
                &format!("/collections/{id}"),
                QueryParams::new(),
                Some(&ModifyCollectionBody {
                    new_name,
                    new_metadata,
                }),
            )
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_collection(
        &self,
        name: &str,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<(), ClientError> {
        self.running("delete_collection")?
            .dispatch(
                Method::DELETE,
                &format!("/collections/{name}"),
                self.scope(tenant, database),
                NO_BODY,
            )
            .await?;
        Ok(())
    }

    /// number of records in a collection
    #[tracing::instrument(skip(self))]
    pub async fn count(&self, collection_id: Uuid) -> Result<u64, ClientError> {
        let response = self
            .running("count")?
            .dispatch(
                Method::GET,
                &format!("/collections/{collection_id}/count"),
                QueryParams::new(),
                NO_BODY,
            )
            .await?;
        WireCodec::shape(response)
    }

    /// first `n` records with embeddings, documents and metadatas
    #[tracing::instrument(skip(self))]
    pub async fn peek(&self, collection_id: Uuid, n: u32) -> Result<GetResult, ClientError> {
        self.running("peek")?;
        self.get(
            collection_id,
            GetRequest::new().limit(n).include(Include::peek()),
        )
        .await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn get(
        &self,
        collection_id: Uuid,
        request: GetRequest,
    ) -> Result<GetResult, ClientError> {
        let dispatcher = self.running("get")?;
        let request = request.paginated();
        let response = dispatcher
            .dispatch(
                Method::POST,
                &format!("/collections/{collection_id}/get"),
                QueryParams::new(),
                Some(&request),
            )
            .await?;
        ResultMarshaler::get_result(response, &request.include)
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn delete(
        &self,
        collection_id: Uuid,
        request: DeleteRequest,
    ) -> Result<(), ClientError> {
        self.running("delete")?
            .dispatch(
                Method::POST,
                &format!("/collections/{collection_id}/delete"),
                QueryParams::new(),
                Some(&request),
            )
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, batch), fields(records = batch.len()))]
    pub async fn add(&self, collection_id: Uuid, batch: RecordBatch) -> Result<bool, ClientError> {
        self.submit("add", collection_id, batch).await
    }

    #[tracing::instrument(skip(self, batch), fields(records = batch.len()))]
    pub async fn update(
        &self,
        collection_id: Uuid,
        batch: RecordBatch,
    ) -> Result<bool, ClientError> {
        self.submit("update", collection_id, batch).await
    }

    #[tracing::instrument(skip(self, batch), fields(records = batch.len()))]
    pub async fn upsert(
        &self,
        collection_id: Uuid,
        batch: RecordBatch,
    ) -> Result<bool, ClientError> {
        self.submit("upsert", collection_id, batch).await
    }

    async fn submit(
        &self,
        operation: &'static str,
        collection_id: Uuid,
        batch: RecordBatch,
    ) -> Result<bool, ClientError> {
        self.running(operation)?;
        self.inner
            .batches
            .submit(&batch, &format!("/collections/{collection_id}/{operation}"))
            .await?;
        Ok(true)
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn query(
        &self,
        collection_id: Uuid,
        request: QueryRequest,
    ) -> Result<QueryResult, ClientError> {
        let response = self
            .running("query")?
            .dispatch(
                Method::POST,
                &format!("/collections/{collection_id}/query"),
                QueryParams::new(),
                Some(&request),
            )
            .await?;
        ResultMarshaler::query_result(response, &request.include)
    }

    /// wipes the whole server, only honoured when the server allows resets
    #[tracing::instrument(skip(self))]
    pub async fn reset(&self) -> Result<bool, ClientError> {
        let response = self
            .running("reset")?
            .dispatch(Method::POST, "/reset", QueryParams::new(), NO_BODY)
            .await?;
        WireCodec::shape(response)
    }

    #[tracing::instrument(skip(self))]
    pub async fn version(&self) -> Result<String, ClientError> {
        let response = self
            .running("version")?
            .dispatch(Method::GET, "/version", QueryParams::new(), NO_BODY)
            .await?;
        WireCodec::shape(response)
    }

    /// server batch limit, fetched once per client
    #[tracing::instrument(skip(self))]
    pub async fn max_batch_size(&self) -> Result<i64, ClientError> {
        self.running("max_batch_size")?;
        self.inner.batches.max_batch_size().await
    }

    /// Releases every pooled connection and stops the client. Any later operation fails with
    /// [`ClientError::NotRunning`]; closing an already stopped client does nothing
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) {
        if self.state() == ClientState::Stopped {
            log::debug!("Client already stopped");
            return;
        }
        self.inner.dispatcher.transport().shutdown().await;
        let previous = self.inner.lifecycle.stop();
        log::debug!("Client stopped, was {previous}");
    }
}
