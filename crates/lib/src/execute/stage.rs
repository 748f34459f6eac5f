//! Staging of input files.
//!
//! The toolchain identifies files by their position relative to the package
//! directory, so inputs are materialized under their declared names inside a
//! package-named staging directory before any tool runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::ExecuteError;

/// Create `path` and any missing parents. An existing directory is fine.
pub async fn ensure_dir(path: &Path) -> Result<(), ExecuteError> {
  let mut builder = tokio::fs::DirBuilder::new();
  builder.recursive(true);
  #[cfg(unix)]
  builder.mode(0o700);

  builder.create(path).await.map_err(|source| ExecuteError::CreateDir {
    path: path.to_path_buf(),
    source,
  })
}

/// Link every `name -> source` entry into `dir` as `dir/name`.
///
/// Returns the staged paths in name order. A pre-existing destination is an
/// error.
pub async fn stage_files(dir: &Path, files: &BTreeMap<String, String>) -> Result<Vec<PathBuf>, ExecuteError> {
  let mut staged = Vec::with_capacity(files.len());
  for (name, source) in files {
    let from = PathBuf::from(source);
    let to = dir.join(name);
    debug!(from = %from.display(), to = %to.display(), "staging input");
    if let Err(source) = link_file(&from, &to).await {
      return Err(ExecuteError::Stage { from, to, source });
    }
    staged.push(to);
  }
  Ok(staged)
}

#[cfg(unix)]
async fn link_file(from: &Path, to: &Path) -> std::io::Result<()> {
  tokio::fs::symlink(from, to).await
}

// Without symlinks the inputs are copied; slower, same layout.
#[cfg(not(unix))]
async fn link_file(from: &Path, to: &Path) -> std::io::Result<()> {
  if tokio::fs::try_exists(to).await? {
    return Err(std::io::Error::from(std::io::ErrorKind::AlreadyExists));
  }
  tokio::fs::copy(from, to).await.map(|_| ())
}
