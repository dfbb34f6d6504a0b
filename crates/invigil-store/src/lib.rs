//! invigil-store — record store backends.
//!
//! Implements the `ResultStore` trait over an in-memory store (tests and
//! preview sessions) and a single-file JSON store (the CLI host), and
//! loads the host configuration that selects where records live.

pub mod config;
pub mod json;
pub mod memory;

pub use config::{load_config, load_config_from, StoreConfig, StudentIdentity};
pub use json::JsonStore;
pub use memory::MemoryStore;
