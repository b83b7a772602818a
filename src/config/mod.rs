#[cfg(test)]
pub mod mapping_test;

pub mod mapping;
pub mod path;

use std::io;

use thiserror::Error;

/// Represents all possible errors loading a configuration file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
    #[error("Mapping table not found: {0}")]
    NotFound(String),
}
