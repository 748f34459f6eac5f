//! Package metadata extraction.
//!
//! Walks a Go source tree, imports every directory that holds `.go` files
//! under a pinned build context and records each package's sources, imports,
//! cgo flags and test files. The resulting document feeds the build planner,
//! which turns each record into compile and link actions.

pub mod cgo;
pub mod constraint;
pub mod context;
pub mod dump;
pub mod header;
pub mod import;
pub mod scan;
mod types;

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::PlatformError;

pub use context::BuildContext;
pub use import::{ImportError, Package, import_dir};
pub use types::*;

#[derive(Debug, Error)]
pub enum PackageError {
  #[error(transparent)]
  Platform(#[from] PlatformError),

  #[error("failed to walk {root}: {message}")]
  Walk { root: PathBuf, message: String },

  #[error(transparent)]
  Import(#[from] ImportError),

  #[error("environment variable '{0}' is not set")]
  MissingOutputEnv(&'static str),

  #[error("failed to serialize package metadata: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
