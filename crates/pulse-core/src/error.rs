//! Error types for `pulse-core`.
//!
//! The derivation engine itself never fails; these variants cover snapshot
//! parsing and validation of engine configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid engine configuration: {0}")]
  InvalidConfig(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
