pub mod collection;
pub mod filter;
pub mod include;
pub mod metadata;
pub mod record;
pub mod request;

/// Tenant used when the caller does not name one
pub const DEFAULT_TENANT: &str = "default_tenant";
/// Database used when the caller does not name one
pub const DEFAULT_DATABASE: &str = "default_database";
