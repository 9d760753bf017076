//! # Core Types
//!
//! Layer 0 of the workspace. Holds the plain data structures every other crate
//! speaks in: the normalized `BridgeEvent`, the `ProgramWindow` that splits the
//! ledger into phases, and the small closed enums used for dispatch.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Direction, Phase, ReportSection};
pub use error::CoreError;
pub use structs::{BridgeEvent, MAX_AMOUNT_USD, ProgramWindow};
