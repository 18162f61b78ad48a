//! Reactor Persistence
//!
//! Reactors are saved inside a versioned, checksummed JSON envelope. The
//! reactor body keeps its `"type"` tag so a load yields the same variant.

mod snapshot;

pub use snapshot::{load_reactor, save_reactor, ReactorSnapshot, CURRENT_SCHEMA_VERSION};
