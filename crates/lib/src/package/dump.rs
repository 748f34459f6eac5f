//! Whole-tree extraction and the output document.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::consts::OUT_ENV;
use crate::util::path::{join_clean, rel_slash};

use super::context::BuildContext;
use super::import::{ImportError, import_dir};
use super::scan::find_package_dirs;
use super::types::PackageMetadata;
use super::PackageError;

/// Import every package directory under `root` and describe it.
///
/// Directories without buildable Go files are skipped; every other import
/// failure aborts the extraction.
pub fn extract(ctx: &BuildContext, root: &Path, prefix: &str) -> Result<Vec<PackageMetadata>, PackageError> {
  let mut records = Vec::new();
  for dir in find_package_dirs(root)? {
    let pkg = match import_dir(ctx, &dir) {
      Ok(pkg) => pkg,
      Err(ImportError::NoGo(dir)) => {
        debug!(dir = %dir.display(), "skipping directory without buildable Go files");
        continue;
      }
      Err(e) => return Err(e.into()),
    };

    let rel = rel_slash(root, &dir);
    let path = join_clean(prefix, &rel);
    debug!(path = %path, files = pkg.go_files.len(), "imported package");
    records.push(PackageMetadata::from_package(pkg, path, rel));
  }
  Ok(records)
}

/// The destination named by the `out` environment variable.
pub fn output_path_from_env() -> Result<PathBuf, PackageError> {
  match std::env::var_os(OUT_ENV) {
    Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
    _ => Err(PackageError::MissingOutputEnv(OUT_ENV)),
  }
}

/// Serialize `records` and replace `path` with them.
///
/// The document is written to a temporary file next to `path` first, so
/// a failed run leaves no partial output. The file is only readable by the
/// owner.
pub fn write_document(path: &Path, records: &[PackageMetadata]) -> Result<(), PackageError> {
  let data = serde_json::to_vec(records)?;

  let write_err = |source| PackageError::Write {
    path: path.to_path_buf(),
    source,
  };
  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let mut file = NamedTempFile::new_in(parent).map_err(write_err)?;
  file.write_all(&data).map_err(write_err)?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    file
      .as_file()
      .set_permissions(std::fs::Permissions::from_mode(0o600))
      .map_err(write_err)?;
  }

  file.persist(path).map_err(|e| write_err(e.error))?;
  Ok(())
}

/// Extract `root` under the pinned context and write the document to the
/// path in `out`. Returns the number of records written.
pub fn run(root: &Path, prefix: &str) -> Result<usize, PackageError> {
  let out = output_path_from_env()?;
  let ctx = BuildContext::pinned()?;
  info!(root = %root.display(), prefix, platform = %ctx.platform, "extracting packages");

  let records = extract(&ctx, root, prefix)?;
  write_document(&out, &records)?;
  info!(count = records.len(), out = %out.display(), "wrote package metadata");
  Ok(records.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::Platform;
  use crate::platform::arch::Arch;
  use crate::platform::os::Os;
  use serial_test::serial;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn ctx() -> BuildContext {
    let mut ctx = BuildContext::new(Platform::new(Os::Linux, Arch::Amd64));
    ctx.build_tags.push("containers_image_openpgp".to_string());
    ctx
  }

  fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }

  fn sample_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "main.go", "package main\n\nimport \"example.com/app/lib\"\n\nfunc main() {}\n");
    write(root, "lib/lib.go", "package lib\n\nimport \"strings\"\n");
    write(root, "lib/lib_test.go", "package lib\n\nimport \"testing\"\n");
    write(root, "lib/testdata/bad.go", "this is not go\n");
    write(root, "tools/gen.go", "//go:build ignore\n\npackage main\n");
    temp
  }

  #[test]
  #[traced_test]
  fn extracts_packages_in_directory_order() {
    let temp = sample_tree();

    let records = extract(&ctx(), temp.path(), "example.com/app").unwrap();

    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["example.com/app", "example.com/app/lib"]);

    assert_eq!(records[0].dir, ".");
    assert!(records[0].is_program);
    assert_eq!(records[0].sources.includes, vec!["example.com/app/lib"]);

    assert_eq!(records[1].dir, "lib");
    assert!(!records[1].is_program);
    assert_eq!(records[1].sources.go_files, vec!["lib.go"]);
    assert_eq!(records[1].test_sources.go_files, vec!["lib_test.go"]);
    assert_eq!(records[1].test_sources.includes, vec!["testing"]);

    assert!(logs_contain("skipping directory without buildable Go files"));
  }

  fn cgo_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "db/pure.go", "package db\n\nimport \"errors\"\n");
    write(
      temp.path(),
      "db/sqlite.go",
      "package db\n\n// #cgo LDFLAGS: -lz -lsqlite3\n// #cgo CFLAGS: -O2 -DB -DA\nimport \"C\"\n",
    );
    temp
  }

  #[test]
  fn cgo_flags_are_reported_with_cgo_disabled() {
    let temp = cgo_tree();

    let records = extract(&ctx(), temp.path(), "example.com/app").unwrap();

    assert_eq!(records.len(), 1);
    let sources = &records[0].sources;
    assert_eq!(sources.go_files, vec!["pure.go"]);
    assert!(sources.cgo_files.is_empty());
    assert_eq!(sources.includes, vec!["errors"]);
    assert_eq!(sources.flags["LDFLAGS"], "-lsqlite3 -lz");
    assert_eq!(sources.flags["CFLAGS"], "-DA -DB -O2");
    assert_eq!(sources.flags["CPPFLAGS"], "");
  }

  #[test]
  fn repeated_runs_are_byte_identical() {
    let temp = cgo_tree();
    write(temp.path(), "main.go", "package main\n\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n");
    write(temp.path(), "db/db_test.go", "package db\n\nimport \"testing\"\n");
    let out = TempDir::new().unwrap();
    let first = out.path().join("first.json");
    let second = out.path().join("second.json");

    write_document(&first, &extract(&ctx(), temp.path(), "m").unwrap()).unwrap();
    write_document(&second, &extract(&ctx(), temp.path(), "m").unwrap()).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
  }

  #[test]
  fn import_failure_aborts() {
    let temp = sample_tree();
    write(temp.path(), "lib/other.go", "package other\n");

    let err = extract(&ctx(), temp.path(), "example.com/app").unwrap_err();

    assert!(matches!(err, PackageError::Import(ImportError::MultiplePackages { .. })));
  }

  #[test]
  fn document_replaces_destination() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("packages.json");
    std::fs::write(&out, "stale").unwrap();
    let records = extract(&ctx(), sample_tree().path(), "m").unwrap();

    write_document(&out, &records).unwrap();

    let parsed: Vec<PackageMetadata> = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(parsed, records);

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      let mode = std::fs::metadata(&out).unwrap().permissions().mode();
      assert_eq!(mode & 0o777, 0o600);
    }
  }

  #[test]
  fn empty_tree_writes_empty_array() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out.json");

    write_document(&out, &extract(&ctx(), temp.path(), "m").unwrap()).unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "[]");
  }

  #[test]
  #[serial]
  fn run_requires_out_variable() {
    let temp = sample_tree();
    temp_env::with_var_unset(OUT_ENV, || {
      let err = run(temp.path(), "m").unwrap_err();
      assert!(matches!(err, PackageError::MissingOutputEnv("out")));
    });
  }

  #[test]
  #[serial]
  fn run_writes_to_out() {
    let temp = sample_tree();
    let out = temp.path().join("result.json");
    temp_env::with_vars(
      [
        (OUT_ENV, Some(out.to_str().unwrap())),
        ("GOOS", Some("linux")),
        ("GOARCH", Some("amd64")),
      ],
      || {
        assert_eq!(run(temp.path(), "example.com/app").unwrap(), 2);
      },
    );

    let parsed: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(parsed[1]["path"], "example.com/app/lib");
  }
}
