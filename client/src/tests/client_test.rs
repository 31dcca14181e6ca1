use super::mock::MockTransport;
use crate::prelude::*;
use http::Method;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

static COLLECTION_ID: Lazy<Uuid> =
    Lazy::new(|| Uuid::parse_str("2b7d2a4e-1c3f-4a5b-9d8e-7f6a5b4c3d2e").unwrap());

static DOCS_COLLECTION: Lazy<String> = Lazy::new(|| {
    json!({
        "id": COLLECTION_ID.to_string(),
        "name": "docs",
        "tenant": "default_tenant",
        "database": "default_database",
        "metadata": {"owner": "search"},
        "configuration_json": null
    })
    .to_string()
});

fn running_client() -> (VecStoreClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let client = VecStoreClient::with_transport(
        ClientConfig::default(),
        Arc::clone(&transport) as Arc<dyn crate::transport::Transport>,
    )
    .unwrap();
    assert_eq!(client.start(), ClientState::Running);
    (client, transport)
}

fn path(suffix: &str) -> String {
    format!("/collections/{}{suffix}", *COLLECTION_ID)
}

#[tokio::test]
async fn test_heartbeat_returns_integer() {
    let (client, transport) = running_client();
    transport.respond(Method::GET, "", 200, r#"{"nanosecond heartbeat": 12345}"#);
    assert_eq!(client.heartbeat().await.unwrap(), 12345);
    assert_eq!(transport.calls()[0].url, "http://localhost:8000/api/v1");
}

#[tokio::test]
async fn test_operations_before_start_are_rejected() {
    let transport = Arc::new(MockTransport::new());
    let client = VecStoreClient::with_transport(
        ClientConfig::default(),
        Arc::clone(&transport) as Arc<dyn crate::transport::Transport>,
    )
    .unwrap();
    assert_eq!(client.state(), ClientState::Created);
    let err = client.version().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lifecycle);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_operations_after_close_fail_fast() {
    let (client, transport) = running_client();
    transport.respond(Method::GET, "/version", 200, r#""0.5.5""#);
    assert_eq!(client.version().await.unwrap(), "0.5.5");

    client.close().await;
    assert_eq!(client.state(), ClientState::Stopped);
    assert_eq!(transport.shutdowns(), 1);

    let before = transport.calls().len();
    let version = client.version().await.unwrap_err();
    assert!(matches!(
        version,
        ClientError::NotRunning {
            operation: "version",
            state: ClientState::Stopped
        }
    ));
    assert_eq!(client.heartbeat().await.unwrap_err().kind(), ErrorKind::Lifecycle);
    assert_eq!(
        client
            .add(*COLLECTION_ID, RecordBatch::new(vec!["a".into()]))
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Lifecycle
    );
    assert_eq!(client.max_batch_size().await.unwrap_err().kind(), ErrorKind::Lifecycle);
    assert_eq!(transport.calls().len(), before);

    // closing twice does not shut the transport down again
    client.close().await;
    assert_eq!(transport.shutdowns(), 1);
    // clones share the lifecycle
    assert_eq!(client.clone().state(), ClientState::Stopped);
}

#[tokio::test]
async fn test_create_collection_get_or_create_is_stable() {
    let (client, transport) = running_client();
    transport.respond(Method::POST, "/collections", 200, &DOCS_COLLECTION);

    let first = client
        .create_collection("docs", None, None, true, None, None)
        .await
        .unwrap();
    let second = client
        .get_or_create_collection("docs", None, None, None, None)
        .await
        .unwrap();
    assert_eq!(first.name, "docs");
    assert_eq!(first, second);

    let calls = transport.calls();
    let call = &calls[0];
    assert_eq!(call.query_value("tenant"), Some("default_tenant"));
    assert_eq!(call.query_value("database"), Some("default_database"));
    assert_eq!(
        call.body.as_deref(),
        Some(
            br#"{"name":"docs","metadata":null,"configuration":null,"get_or_create":true}"#
                .as_slice()
        )
    );
}

#[tokio::test]
async fn test_create_collection_conflict_is_remote_error() {
    let (client, transport) = running_client();
    transport.respond(
        Method::POST,
        "/collections",
        409,
        r#"{"error": "UniqueConstraintError", "message": "Collection docs already exists"}"#,
    );
    let mut metadata = Metadata::new();
    metadata.insert("owner".into(), MetadataValue::from("search"));
    let configuration = CollectionConfiguration::new().with("hnsw_space", "cosine");
    let err = client
        .create_collection(
            "docs",
            Some(&configuration),
            Some(&metadata),
            false,
            Some("acme"),
            Some("prod"),
        )
        .await
        .unwrap_err();
    match err {
        ClientError::Remote {
            status,
            error,
            message,
        } => {
            assert_eq!(status, 409);
            assert_eq!(error.as_deref(), Some("UniqueConstraintError"));
            assert_eq!(message, "Collection docs already exists");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        transport.last_body("/collections"),
        Some(json!({
            "name": "docs",
            "metadata": {"owner": "search"},
            "configuration": {"hnsw_space": "cosine"},
            "get_or_create": false
        }))
    );
    assert_eq!(transport.calls()[0].query_value("tenant"), Some("acme"));
    assert_eq!(transport.calls()[0].query_value("database"), Some("prod"));
}

#[tokio::test]
async fn test_get_collection_requires_exactly_one_of_name_or_id() {
    let (client, transport) = running_client();
    let neither = client.get_collection(None, None, None, None).await.unwrap_err();
    assert!(matches!(
        neither,
        ClientError::Validation(ValidationError::NameOrIdRequired)
    ));
    let both = client
        .get_collection(Some("x"), Some(*COLLECTION_ID), None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        both,
        ClientError::Validation(ValidationError::NameAndIdConflict)
    ));
    assert!(transport.calls().is_empty());

    transport.respond(Method::GET, "/collections/x", 200, &DOCS_COLLECTION);
    transport.respond(Method::GET, &path(""), 200, &DOCS_COLLECTION);

    client.get_collection(Some("x"), None, None, None).await.unwrap();
    assert_eq!(transport.calls().len(), 1);
    assert_eq!(transport.calls()[0].query_value("type"), None);

    let by_id = client
        .get_collection(None, Some(*COLLECTION_ID), None, None)
        .await
        .unwrap();
    assert_eq!(by_id.id, *COLLECTION_ID);
    assert_eq!(transport.calls().len(), 2);
    let calls = transport.calls();
    assert_eq!(calls[1].query_value("type"), Some(COLLECTION_ID.to_string().as_str()));
    assert_eq!(calls[1].path_after(super::mock::MOCK_BASE_URL), path(""));
}

#[tokio::test]
async fn test_collection_names_are_escaped() {
    let (client, transport) = running_client();
    client
        .delete_collection("my docs?", None, None)
        .await
        .unwrap_err();
    assert_eq!(
        transport.calls()[0].url,
        "http://localhost:8000/api/v1/collections/my%20docs%3F"
    );
    assert_eq!(transport.calls()[0].method, Method::DELETE);
}

#[tokio::test]
async fn test_slash_in_a_name_stays_a_separator() {
    let (client, transport) = running_client();
    client
        .delete_collection("team/docs", None, None)
        .await
        .unwrap_err();
    assert_eq!(
        transport.calls()[0].url,
        "http://localhost:8000/api/v1/collections/team/docs"
    );
}

#[tokio::test]
async fn test_get_page_overrides_limit_and_offset() {
    let (client, transport) = running_client();
    transport.respond(Method::POST, &path("/get"), 200, r#"{"ids": []}"#);
    client
        .get(
            *COLLECTION_ID,
            GetRequest::new().limit(3).offset(7).page(2, 10),
        )
        .await
        .unwrap();
    let body = transport.last_body(&path("/get")).unwrap();
    assert_eq!(body["offset"], json!(10));
    assert_eq!(body["limit"], json!(10));
    assert_eq!(body.get("page"), None);
    assert_eq!(body.get("page_size"), None);
}

#[tokio::test]
async fn test_get_absent_fields_and_included_fallback() {
    let (client, transport) = running_client();
    transport.respond(
        Method::POST,
        &path("/get"),
        200,
        r#"{"ids": ["a"], "metadatas": [{"page": 1}], "documents": ["alpha"]}"#,
    );
    let result = client
        .get(*COLLECTION_ID, GetRequest::new().ids(vec!["a".into()]))
        .await
        .unwrap();
    assert_eq!(result.ids, vec!["a".to_string()]);
    assert_eq!(result.documents, Some(vec![Some("alpha".to_string())]));
    assert_eq!(result.embeddings, None);
    assert_eq!(result.uris, None);
    assert_eq!(result.data, None);
    assert_eq!(result.included, Include::default_get());
}

#[tokio::test]
async fn test_peek_asks_for_embeddings() {
    let (client, transport) = running_client();
    transport.respond(
        Method::POST,
        &path("/get"),
        200,
        r#"{"ids": ["a"], "embeddings": [[1.0, 2.0]], "included": ["embeddings"]}"#,
    );
    let result = client.peek(*COLLECTION_ID, 5).await.unwrap();
    assert_eq!(result.embeddings, Some(vec![vec![1.0, 2.0]]));
    assert_eq!(result.included, vec![Include::Embeddings]);
    let body = transport.last_body(&path("/get")).unwrap();
    assert_eq!(body["limit"], json!(5));
    assert_eq!(body["include"], json!(["embeddings", "documents", "metadatas"]));
}

#[tokio::test]
async fn test_query_round_trip() {
    let (client, transport) = running_client();
    transport.respond(
        Method::POST,
        &path("/query"),
        200,
        r#"{"ids": [["a"]], "distances": [[0.5]], "documents": [["alpha"]], "metadatas": [[null]]}"#,
    );
    let result = client
        .query(
            *COLLECTION_ID,
            QueryRequest::new(vec![vec![0.5, 0.25]])
                .n_results(1)
                .where_document(WhereDocument::contains("alp")),
        )
        .await
        .unwrap();
    assert_eq!(result.ids, vec![vec!["a".to_string()]]);
    assert_eq!(result.distances, Some(vec![vec![0.5]]));
    assert_eq!(result.metadatas, Some(vec![vec![None]]));
    assert_eq!(result.embeddings, None);
    assert_eq!(result.included, Include::default_query());
    assert_eq!(
        transport.last_body(&path("/query")),
        Some(json!({
            "query_embeddings": [[0.5, 0.25]],
            "n_results": 1,
            "where": {},
            "where_document": {"$contains": "alp"},
            "include": ["metadatas", "documents", "distances"]
        }))
    );
}

#[tokio::test]
async fn test_batch_operations_share_one_limit_fetch() {
    let (client, transport) = running_client();
    transport.respond(Method::GET, "/pre-flight-checks", 200, r#"{"max_batch_size": 2}"#);
    for operation in ["add", "update", "upsert"] {
        transport.respond(Method::POST, &path(&format!("/{operation}")), 200, "true");
    }
    let batch = RecordBatch::new(vec!["a".into(), "b".into()])
        .embeddings(vec![vec![0.5], vec![0.25]])
        .documents(vec!["alpha".into(), "beta".into()]);

    assert!(client.add(*COLLECTION_ID, batch.clone()).await.unwrap());
    assert!(client.update(*COLLECTION_ID, batch.clone()).await.unwrap());
    assert!(client.upsert(*COLLECTION_ID, batch.clone()).await.unwrap());
    assert_eq!(client.max_batch_size().await.unwrap(), 2);
    assert_eq!(transport.count(Method::GET, "/pre-flight-checks"), 1);

    assert_eq!(
        transport.last_body(&path("/upsert")),
        Some(json!({
            "ids": ["a", "b"],
            "embeddings": [[0.5], [0.25]],
            "metadatas": null,
            "documents": ["alpha", "beta"],
            "uris": null
        }))
    );
}

#[tokio::test]
async fn test_invalid_batches_send_nothing() {
    let (client, transport) = running_client();
    transport.respond(Method::GET, "/pre-flight-checks", 200, r#"{"max_batch_size": 2}"#);
    assert_eq!(client.max_batch_size().await.unwrap(), 2);

    let oversized = RecordBatch::new(vec!["a".into(), "b".into(), "c".into()]);
    let err = client.add(*COLLECTION_ID, oversized).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::BatchSizeExceeded {
            max_batch_size: 2,
            attempted: 3
        })
    ));

    let mismatched = RecordBatch::new(vec!["a".into(), "b".into()]).metadatas(vec![Metadata::new()]);
    let err = client.upsert(*COLLECTION_ID, mismatched).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::BatchLengthMismatch {
            field: "metadatas",
            length: 1,
            expected: 2
        })
    ));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_collection_and_tenant_plumbing() {
    let (client, transport) = running_client();
    transport.respond(Method::GET, "/collections", 200, &format!("[{}]", *DOCS_COLLECTION));
    transport.respond(Method::GET, "/count_collections", 200, "1");
    transport.respond(Method::GET, &path("/count"), 200, "42");
    transport.respond(Method::PUT, &path(""), 200, "{}");
    transport.respond(Method::POST, &path("/delete"), 200, "null");
    transport.respond(Method::POST, "/tenants", 200, "{}");
    transport.respond(Method::GET, "/tenants/acme", 200, r#"{"name": "acme"}"#);
    transport.respond(Method::POST, "/databases", 200, "{}");
    transport.respond(
        Method::GET,
        "/databases/prod",
        200,
        &json!({"id": COLLECTION_ID.to_string(), "name": "prod", "tenant": "acme"}).to_string(),
    );
    transport.respond(Method::POST, "/reset", 200, "true");

    let listed = client
        .list_collections(Some(5), None, None, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let calls = transport.calls();
    let list_call = &calls[0];
    assert_eq!(list_call.query_value("limit"), Some("5"));
    assert_eq!(list_call.query_value("offset"), None);

    assert_eq!(client.count_collections(None, None).await.unwrap(), 1);
    assert_eq!(client.count(*COLLECTION_ID).await.unwrap(), 42);

    client
        .modify_collection(*COLLECTION_ID, Some("renamed"), None)
        .await
        .unwrap();
    assert_eq!(
        transport.last_body(&path("")),
        Some(json!({"new_name": "renamed", "new_metadata": null}))
    );

    client
        .delete(*COLLECTION_ID, DeleteRequest::new().ids(vec!["a".into()]))
        .await
        .unwrap();
    assert_eq!(
        transport.last_body(&path("/delete")),
        Some(json!({"where": {}, "ids": ["a"], "where_document": {}}))
    );

    client.create_tenant("acme").await.unwrap();
    assert_eq!(transport.last_body("/tenants"), Some(json!({"name": "acme"})));
    assert_eq!(client.get_tenant("acme").await.unwrap().name, "acme");

    client.create_database("prod", Some("acme")).await.unwrap();
    let database = client.get_database("prod", Some("acme")).await.unwrap();
    assert_eq!(database.tenant, "acme");

    assert!(client.reset().await.unwrap());
}

#[tokio::test]
async fn test_unexpected_shapes_are_decode_errors() {
    let (client, transport) = running_client();
    transport.respond(Method::GET, "", 200, r#"{"heartbeat": 1}"#);
    transport.respond(Method::GET, "/version", 200, "not json");
    assert_eq!(client.heartbeat().await.unwrap_err().kind(), ErrorKind::Decode);
    assert_eq!(client.version().await.unwrap_err().kind(), ErrorKind::Decode);
}

#[test]
fn test_calls_from_distinct_runtimes_do_not_share_pools() {
    use crate::registry::ConnectionRegistry;
    use crate::transport::HttpTransport;

    let registry = Arc::new(ConnectionRegistry::default());
    let transport = Arc::new(HttpTransport::new(Arc::clone(&registry)));
    let client = VecStoreClient::with_transport(ClientConfig::default(), transport).unwrap();
    client.start();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap()
                    .block_on(async move {
                        let first = registry.acquire_current().unwrap();
                        let second = registry.acquire_current().unwrap();
                        assert!(Arc::ptr_eq(&first, &second));
                        first
                    })
            })
        })
        .collect();
    let pools: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(!Arc::ptr_eq(&pools[0], &pools[1]));
    assert_eq!(registry.len(), 2);

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(client.close());
    assert!(registry.is_empty());
    assert!(pools.iter().all(|pool| pool.is_closed()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_from_many_tasks() {
    let (client, transport) = running_client();
    transport.respond(Method::GET, &path("/count"), 200, "7");
    let tasks = (0..16).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.count(*COLLECTION_ID).await })
    });
    let counts = futures::future::join_all(tasks).await;
    assert!(counts
        .into_iter()
        .all(|count| matches!(count, Ok(Ok(7)))));
    assert_eq!(transport.count(Method::GET, &path("/count")), 16);
}
