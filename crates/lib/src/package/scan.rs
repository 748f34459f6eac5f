//! Candidate package discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::consts::FIXTURE_DIR;

use super::PackageError;

/// Every directory under `root` that directly holds a regular `.go` file, in
/// sorted order.
///
/// Symlinks are not followed and `testdata` directories are pruned before
/// descent, the root included.
pub fn find_package_dirs(root: &Path) -> Result<BTreeSet<PathBuf>, PackageError> {
  let walker = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == FIXTURE_DIR));

  let mut dirs = BTreeSet::new();
  for entry in walker {
    let entry = entry.map_err(|e| PackageError::Walk {
      root: root.to_path_buf(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_file() || entry.path().extension().is_none_or(|ext| ext != "go") {
      continue;
    }
    if let Some(parent) = entry.path().parent() {
      dirs.insert(parent.to_path_buf());
    }
  }
  Ok(dirs)
}
