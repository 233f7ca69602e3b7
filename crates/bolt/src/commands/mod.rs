//! CLI command implementations.

pub(crate) mod ingest;
pub(crate) mod serve;

pub(crate) use ingest::IngestArgs;
pub(crate) use serve::ServeArgs;
