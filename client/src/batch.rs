use crate::dispatch::{QueryParams, RequestDispatcher, NO_BODY};
use crate::error::{ClientError, ValidationError};
use http::Method;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use vecstore_types::record::RecordBatch;

/// cached batch limit before the server has been asked
pub const UNFETCHED_MAX_BATCH_SIZE: i64 = -1;

const PRE_FLIGHT_PATH: &str = "/pre-flight-checks";

#[derive(Debug, Deserialize)]
struct PreFlightChecks {
    max_batch_size: i64,
}

/// Checks every present field of a batch against the number of ids
pub fn validate_lengths(batch: &RecordBatch) -> Result<(), ValidationError> {
    let expected = batch.len();
    match batch
        .present_lengths()
        .into_iter()
        .find(|(_, length)| *length != expected)
    {
        Some((field, length)) => Err(ValidationError::BatchLengthMismatch {
            field,
            length,
            expected,
        }),
        None => Ok(()),
    }
}

/// Validates bulk mutations against the server advertised batch limit and submits them as one
/// request.
///
/// The limit is fetched the first time it is needed and kept for the lifetime of the submitter.
/// Two first uses racing may both fetch; they store the same number so the race is harmless
#[derive(Debug)]
pub struct BatchSubmitter {
    dispatcher: RequestDispatcher,
    max_batch_size: AtomicI64,
}

impl BatchSubmitter {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self {
            dispatcher,
            max_batch_size: AtomicI64::new(UNFETCHED_MAX_BATCH_SIZE),
        }
    }

    /// submitter whose limit is already known, no pre-flight fetch will be made
    pub fn with_max_batch_size(dispatcher: RequestDispatcher, max_batch_size: i64) -> Self {
        Self {
            dispatcher,
            max_batch_size: AtomicI64::new(max_batch_size),
        }
    }

    pub fn cached_max_batch_size(&self) -> Option<i64> {
        match self.max_batch_size.load(Ordering::Acquire) {
            UNFETCHED_MAX_BATCH_SIZE => None,
            size => Some(size),
        }
    }

    pub async fn max_batch_size(&self) -> Result<i64, ClientError> {
        if let Some(size) = self.cached_max_batch_size() {
            return Ok(size);
        }
        let response = self
            .dispatcher
            .dispatch(Method::GET, PRE_FLIGHT_PATH, QueryParams::new(), NO_BODY)
            .await?;
        let checks: PreFlightChecks = crate::codec::WireCodec::shape(response)?;
        log::debug!("Server max batch size is {}", checks.max_batch_size);
        self.max_batch_size
            .store(checks.max_batch_size, Ordering::Release);
        Ok(checks.max_batch_size)
    }

    #[tracing::instrument(skip(self, batch), fields(records = batch.len()))]
    pub async fn submit(&self, batch: &RecordBatch, path: &str) -> Result<Value, ClientError> {
        validate_lengths(batch)?;
        let max_batch_size = self.max_batch_size().await?;
        if batch.len() as i64 > max_batch_size {
            return Err(ValidationError::BatchSizeExceeded {
                max_batch_size,
                attempted: batch.len(),
            }
            .into());
        }
        self.dispatcher
            .dispatch(Method::POST, path, QueryParams::new(), Some(batch))
            .await
    }
}
