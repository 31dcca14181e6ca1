pub use crate::client::VecStoreClient;
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, ErrorKind, ValidationError};
pub use crate::lifecycle::ClientState;
pub use uuid::Uuid;
pub use vecstore_types::collection::{Collection, CollectionConfiguration, Database, Tenant};
pub use vecstore_types::filter::{Where, WhereDocument};
pub use vecstore_types::include::Include;
pub use vecstore_types::metadata::{Metadata, MetadataValue};
pub use vecstore_types::record::{Embedding, GetResult, QueryResult, RecordBatch};
pub use vecstore_types::request::{DeleteRequest, GetRequest, QueryRequest};
