//! One pooled http connection per execution context.
//!
//! A connection pool spawns its background connection tasks onto whichever runtime first drove
//! it, so a pool created under one scheduler must never be handed to another. The registry hands
//! every execution context its own pool and owns all of them until shutdown.
use crate::error::ClientError;
use flurry::HashMap as ConcurrentHashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Identity of the scheduler a call originates from.
///
/// Every tokio runtime is its own context, whatever thread it is driven from, so two runtimes
/// built one after the other on the same thread never share a key. Calls made outside any runtime
/// share the [`ExecutionContextKey::DETACHED`] key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionContextKey(u64);

impl ExecutionContextKey {
    /// fallback key used when no scheduler can be identified
    pub const DETACHED: ExecutionContextKey = ExecutionContextKey(0);

    pub fn current() -> Self {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Self::from_runtime(handle.id()),
            Err(_) => {
                log::debug!("No runtime in scope, falling back to detached connection");
                Self::DETACHED
            }
        }
    }

    /// Runtime ids are non-zero, so no runtime maps onto [`ExecutionContextKey::DETACHED`]
    pub fn from_runtime(id: tokio::runtime::Id) -> Self {
        // runtime::Id only exposes its integer through Display and carries no ordering
        id.to_string().parse().map_or(Self::DETACHED, Self)
    }

    pub fn is_detached(&self) -> bool {
        *self == Self::DETACHED
    }
}

impl fmt::Display for ExecutionContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Keep-alive connection pool bound to a single execution context
#[derive(Debug)]
pub struct PooledConnection {
    key: ExecutionContextKey,
    client: Mutex<Option<reqwest::Client>>,
    closed: AtomicBool,
}

impl PooledConnection {
    fn open(key: ExecutionContextKey, request_timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            key,
            client: Mutex::new(Some(builder.build()?)),
            closed: AtomicBool::new(false),
        })
    }

    pub fn key(&self) -> ExecutionContextKey {
        self.key
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// handle to the underlying pool. Cheap to clone, shares the same sockets
    pub(crate) fn client(&self) -> Result<reqwest::Client, ClientError> {
        let guard = self.client.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone().ok_or(ClientError::ConnectionClosed)
    }

    /// drops the pool so idle sockets are released once in-flight requests finish
    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let mut guard = self.client.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.take();
    }
}

/// Process independent table of execution context to pooled connection.
///
/// The table is the only owner of connections; entries are only ever removed by
/// [`ConnectionRegistry::shutdown_all`]
#[derive(Debug)]
pub struct ConnectionRegistry {
    table: ConcurrentHashMap<ExecutionContextKey, Arc<PooledConnection>>,
    request_timeout: Option<Duration>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConnectionRegistry {
    /// `request_timeout` of `None` leaves requests unbounded
    pub fn new(request_timeout: Option<Duration>) -> Self {
        Self {
            table: ConcurrentHashMap::new(),
            request_timeout,
        }
    }

    /// connection for the calling execution context
    pub fn acquire_current(&self) -> Result<Arc<PooledConnection>, ClientError> {
        self.acquire(ExecutionContextKey::current())
    }

    #[tracing::instrument(skip(self))]
    pub fn acquire(&self, key: ExecutionContextKey) -> Result<Arc<PooledConnection>, ClientError> {
        let pinned = self.table.pin();
        if let Some(existing) = pinned.get(&key) {
            return Ok(Arc::clone(existing));
        }
        let fresh = Arc::new(PooledConnection::open(key, self.request_timeout)?);
        // Use try_insert as another thread may have registered the same key since the lookup
        // above. The losing pool has never been used so it holds no sockets
        match pinned.try_insert(key, Arc::clone(&fresh)) {
            Ok(inserted) => {
                log::debug!("Opened pooled connection for {key}");
                Ok(Arc::clone(inserted))
            }
            Err(error_current) => {
                fresh.close();
                Ok(Arc::clone(error_current.current))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes and removes every connection. Safe to call repeatedly
    #[tracing::instrument(skip(self))]
    pub async fn shutdown_all(&self) {
        let drained: Vec<Arc<PooledConnection>> = {
            let pinned = self.table.pin();
            let keys: Vec<ExecutionContextKey> = pinned.keys().copied().collect();
            keys.iter()
                .filter_map(|key| pinned.remove(key).map(Arc::clone))
                .collect()
        };
        for connection in drained.iter() {
            connection.close();
            log::debug!("Closed pooled connection for {}", connection.key());
        }
        // let any in-flight dispatch on this scheduler observe the closed pools before returning
        tokio::task::yield_now().await;
    }
}
