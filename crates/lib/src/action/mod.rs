//! Action descriptions handed over by the build orchestrator.
//!
//! An action is a JSON document (`.attrs.json`) naming one compile or link
//! step: its outputs, the toolchain root, the include search paths and the
//! input files to stage. See [`ActionDescription`] for the schema.

mod types;

pub use types::*;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors reading or interpreting an action description.
#[derive(Debug, Error)]
pub enum ActionError {
  #[error("failed to read action description {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse action description: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("action has no '{0}' output")]
  MissingOutput(&'static str),

  #[error("output name too short for a build id: {0}")]
  InvalidOutputName(PathBuf),

  #[error("unknown mode: {0}")]
  UnknownMode(String),
}

/// Load an action description from a JSON file.
pub fn load(path: &Path) -> Result<ActionDescription, ActionError> {
  let bytes = std::fs::read(path).map_err(|source| ActionError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let action = from_slice(&bytes)?;
  debug!(path = %path.display(), mode = %action.params.mode, "loaded action description");
  Ok(action)
}

pub fn from_slice(bytes: &[u8]) -> Result<ActionDescription, ActionError> {
  Ok(serde_json::from_slice(bytes)?)
}
