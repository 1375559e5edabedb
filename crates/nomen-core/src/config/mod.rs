//! Configuration for a resolution run
//!
//! Settings come from an optional YAML file (`nomen.yaml` by default) and are
//! then overridden by command-line flags.

pub mod types;
pub mod loader;

pub use types::*;
pub use loader::*;

#[cfg(test)]
mod tests;

use crate::errors::NomenError;
use std::path::Path;

/// Load a configuration from a YAML file
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<NomenConfig, NomenError> {
    ConfigLoader::from_file(path).await
}
