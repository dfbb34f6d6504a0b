//! Subcommand implementations.

use std::path::Path;

use anyhow::Result;

use invigil_store::{load_config_from, JsonStore, StoreConfig};

pub mod clear;
pub mod grades;
pub mod init;
pub mod record;
pub mod regrade;
pub mod results;
pub mod take;
pub mod validate;

/// Loads the host config and opens the record store it points at.
pub(crate) fn open_store(config_path: Option<&Path>) -> Result<(StoreConfig, JsonStore)> {
    let config = load_config_from(config_path)?;
    let store = JsonStore::open(&config.data_dir);
    Ok((config, store))
}
