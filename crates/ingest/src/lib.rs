//! # Ledger Ingestion
//!
//! Turns a raw tabular export of bridge transfers into normalized
//! [`core_types::BridgeEvent`]s.
//!
//! - Header names are trimmed and lowercased before lookup, so `BLOCK_TIMESTAMP`
//!   and `block_timestamp` are the same column.
//! - Every required column must be present before any row is read.
//! - The load is all-or-nothing: the first malformed row rejects the whole file.

pub mod error;
pub mod loader;
pub mod timestamp;

pub use error::IngestError;
pub use loader::{REQUIRED_COLUMNS, load_events, load_events_from_path};
pub use timestamp::parse_timestamp;
