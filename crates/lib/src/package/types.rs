use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cgo::CgoFlags;
use super::import::Package;

/// One classified source set. Empty members are left out of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceFiles {
  /// Import paths.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub includes: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub go_files: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub cgo_files: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub s_files: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub h_files: Vec<String>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub flags: BTreeMap<String, String>,
}

/// The record emitted for each package directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
  /// Logical import path: the prefix joined with `dir`.
  pub path: String,
  /// Directory relative to the scanned root, `.` for the root itself.
  pub dir: String,
  pub sources: SourceFiles,
  pub test_sources: SourceFiles,
  pub is_program: bool,
}

impl PackageMetadata {
  pub fn from_package(pkg: Package, path: String, dir: String) -> Self {
    let is_program = pkg.is_command();
    let flags = flag_strings(&pkg.cgo);
    Self {
      path,
      dir,
      sources: SourceFiles {
        includes: pkg.imports,
        go_files: pkg.go_files,
        cgo_files: pkg.cgo_files,
        s_files: pkg.s_files,
        h_files: pkg.h_files,
        flags,
      },
      test_sources: SourceFiles {
        includes: pkg.test_imports,
        go_files: pkg.test_go_files,
        ..Default::default()
      },
      is_program,
    }
  }
}

/// `CFLAGS`, `CPPFLAGS` and `LDFLAGS`, each sorted and space-joined.
fn flag_strings(cgo: &CgoFlags) -> BTreeMap<String, String> {
  [("CFLAGS", &cgo.cflags), ("CPPFLAGS", &cgo.cppflags), ("LDFLAGS", &cgo.ldflags)]
    .into_iter()
    .map(|(name, flags)| {
      let mut sorted = flags.clone();
      sorted.sort();
      (name.to_string(), sorted.join(" "))
    })
    .collect()
}
