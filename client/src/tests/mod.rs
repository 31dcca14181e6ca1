mod client_test;
pub(crate) mod mock;
