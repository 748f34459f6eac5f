//! Directory import: classify the files of one directory into a package.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;

use super::cgo::{CgoError, CgoFlags};
use super::constraint::ConstraintError;
use super::context::BuildContext;
use super::header::{HeaderError, read_go_header};

#[derive(Debug, Error)]
pub enum ImportError {
  /// Nothing buildable under the context; callers may skip the directory.
  #[error("no buildable Go source files in {0}")]
  NoGo(PathBuf),

  #[error("failed to read directory {path}: {source}")]
  ReadDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read {path}: {source}")]
  ReadFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{path}: {source}")]
  Header {
    path: PathBuf,
    #[source]
    source: HeaderError,
  },

  #[error("{path}: {source}")]
  Constraint {
    path: PathBuf,
    #[source]
    source: ConstraintError,
  },

  #[error("{path}: {source}")]
  Cgo {
    path: PathBuf,
    #[source]
    source: CgoError,
  },

  #[error("found packages {first} ({first_file}) and {second} ({second_file}) in {dir}")]
  MultiplePackages {
    dir: PathBuf,
    first: String,
    first_file: String,
    second: String,
    second_file: String,
  },

  #[error("use of cgo in test {0} not supported")]
  CgoInTest(PathBuf),
}

/// The files and imports of one directory under a [`BuildContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
  pub dir: PathBuf,
  pub name: String,

  pub go_files: Vec<String>,
  pub cgo_files: Vec<String>,
  /// Go files excluded by package name or by cgo being disabled.
  pub ignored_go_files: Vec<String>,
  pub c_files: Vec<String>,
  pub cxx_files: Vec<String>,
  pub m_files: Vec<String>,
  pub h_files: Vec<String>,
  pub s_files: Vec<String>,
  pub syso_files: Vec<String>,

  pub test_go_files: Vec<String>,
  pub xtest_go_files: Vec<String>,

  /// Sorted, de-duplicated import paths.
  pub imports: Vec<String>,
  pub test_imports: Vec<String>,
  pub xtest_imports: Vec<String>,

  pub cgo: CgoFlags,
}

impl Package {
  /// Whether this package builds an executable.
  pub fn is_command(&self) -> bool {
    self.name == "main"
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
  Go,
  C,
  Cxx,
  ObjC,
  Header,
  Asm,
  /// `.S`/`.sx`: only kept for cgo packages.
  AsmPreprocessed,
  Syso,
  /// Recognized but not tracked (Fortran, SWIG).
  Other,
}

fn file_kind(name: &str) -> Option<FileKind> {
  let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
  Some(match ext {
    "go" => FileKind::Go,
    "c" => FileKind::C,
    "cc" | "cpp" | "cxx" => FileKind::Cxx,
    "m" => FileKind::ObjC,
    "h" | "hh" | "hpp" | "hxx" => FileKind::Header,
    "s" => FileKind::Asm,
    "S" | "sx" => FileKind::AsmPreprocessed,
    "syso" => FileKind::Syso,
    "f" | "F" | "for" | "f90" | "swig" | "swigcxx" => FileKind::Other,
    _ => return None,
  })
}

/// Import the package in `dir`.
///
/// Files are visited in name order. Returns [`ImportError::NoGo`] when no Go,
/// cgo, test or external test file survives the context's filters.
pub fn import_dir(ctx: &BuildContext, dir: &Path) -> Result<Package, ImportError> {
  let read_dir_err = |source| ImportError::ReadDir {
    path: dir.to_path_buf(),
    source,
  };

  let mut names = Vec::new();
  for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
    let entry = entry.map_err(read_dir_err)?;
    if entry.path().is_dir() {
      continue;
    }
    names.push(entry.file_name().to_string_lossy().into_owned());
  }
  names.sort();

  let mut pkg = Package {
    dir: dir.to_path_buf(),
    ..Default::default()
  };
  let mut first_file = String::new();
  let mut preprocessed_asm = Vec::new();
  let mut imports = BTreeSet::new();
  let mut test_imports = BTreeSet::new();
  let mut xtest_imports = BTreeSet::new();

  for name in names {
    if name.starts_with('_') || name.starts_with('.') {
      continue;
    }
    let Some(kind) = file_kind(&name) else {
      continue;
    };
    if !ctx.good_os_arch_file(&name) {
      trace!(file = %name, "excluded by file name");
      continue;
    }

    let path = dir.join(&name);
    let bytes = std::fs::read(&path).map_err(|source| ImportError::ReadFile {
      path: path.clone(),
      source,
    })?;
    let content = String::from_utf8_lossy(&bytes);

    let header = (kind == FileKind::Go).then(|| read_go_header(&content));
    let included = ctx.should_build(&content).map_err(|source| ImportError::Constraint {
      path: path.clone(),
      source,
    })?;
    if !included {
      trace!(file = %name, "excluded by build constraint");
      continue;
    }

    let header = match header {
      None => {
        match kind {
          FileKind::C => pkg.c_files.push(name),
          FileKind::Cxx => pkg.cxx_files.push(name),
          FileKind::ObjC => pkg.m_files.push(name),
          FileKind::Header => pkg.h_files.push(name),
          FileKind::Asm => pkg.s_files.push(name),
          FileKind::AsmPreprocessed => preprocessed_asm.push(name),
          FileKind::Syso => pkg.syso_files.push(name),
          FileKind::Go | FileKind::Other => {}
        }
        continue;
      }
      Some(header) => header.map_err(|source| ImportError::Header {
        path: path.clone(),
        source,
      })?,
    };

    let mut package_name = header.package.clone();
    if package_name == "documentation" {
      pkg.ignored_go_files.push(name);
      continue;
    }

    let is_test = name.ends_with("_test.go");
    let mut is_xtest = false;
    if is_test && package_name.ends_with("_test") && pkg.name != package_name {
      is_xtest = true;
      package_name.truncate(package_name.len() - "_test".len());
    }

    if pkg.name.is_empty() {
      pkg.name = package_name;
      first_file = name.clone();
    } else if package_name != pkg.name {
      return Err(ImportError::MultiplePackages {
        dir: dir.to_path_buf(),
        first: pkg.name,
        first_file,
        second: package_name,
        second_file: name,
      });
    }

    let paths = header.imports.iter().map(|import| import.path.clone());

    if header.imports_c() {
      if is_test {
        return Err(ImportError::CgoInTest(path));
      }
      // Directives are recorded even when the file itself is left out.
      for import in header.imports.iter().filter(|import| import.path == "C") {
        pkg
          .cgo
          .save(ctx, dir, &import.doc)
          .map_err(|source| ImportError::Cgo {
            path: path.clone(),
            source,
          })?;
      }
      if !ctx.cgo_enabled {
        pkg.ignored_go_files.push(name);
        continue;
      }
      imports.extend(paths);
      pkg.cgo_files.push(name);
    } else if is_xtest {
      xtest_imports.extend(paths);
      pkg.xtest_go_files.push(name);
    } else if is_test {
      test_imports.extend(paths);
      pkg.test_go_files.push(name);
    } else {
      imports.extend(paths);
      pkg.go_files.push(name);
    }
  }

  if !pkg.cgo_files.is_empty() {
    pkg.s_files.extend(preprocessed_asm);
  }

  pkg.imports = imports.into_iter().collect();
  pkg.test_imports = test_imports.into_iter().collect();
  pkg.xtest_imports = xtest_imports.into_iter().collect();

  let has_go = !pkg.go_files.is_empty() || !pkg.cgo_files.is_empty();
  if !has_go && pkg.test_go_files.is_empty() && pkg.xtest_go_files.is_empty() {
    return Err(ImportError::NoGo(dir.to_path_buf()));
  }

  Ok(pkg)
}
