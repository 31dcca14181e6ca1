//! JSON wire codec shared by request and response bodies.
//!
//! Bodies are encoded straight to bytes so the http client only ever sees opaque content. Keys
//! are written in the order the value yields them and numbers keep their integer or float kind on
//! the way back in.
use crate::error::ClientError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

impl WireCodec {
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ClientError> {
        serde_json::to_vec(value).map_err(ClientError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Value, ClientError> {
        serde_json::from_slice(bytes).map_err(ClientError::Decode)
    }

    /// reshapes an already decoded value into a typed one
    pub fn shape<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
        serde_json::from_value(value).map_err(ClientError::Decode)
    }
}
