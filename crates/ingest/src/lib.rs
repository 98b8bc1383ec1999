pub mod csv;
pub mod date;

pub use csv::{ingest, ingest_with, IngestError, IngestOptions};
