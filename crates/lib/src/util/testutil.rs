//! Test utilities for gobuild-lib.
//!
//! Provides a stand-in `go` driver so executor tests can observe the exact
//! invocations without a real toolchain.

use std::path::{Path, PathBuf};

/// A fake toolchain root whose `bin/go` is a shell script.
pub struct FakeGo {
  pub root: PathBuf,
  pub bin: PathBuf,
  /// File the script appends to; exposed to the script as `$LOG`.
  pub log: PathBuf,
}

impl FakeGo {
  /// Create `<dir>/go/bin/go` running `body`.
  #[cfg(unix)]
  pub fn script(dir: &Path, body: &str) -> Self {
    use std::os::unix::fs::PermissionsExt;

    let root = dir.join("go");
    let bin = root.join("bin").join("go");
    let log = dir.join("go.log");
    std::fs::create_dir_all(bin.parent().unwrap()).unwrap();

    let script = format!("#!/bin/sh\nLOG='{}'\n{}\n", log.display(), body);
    std::fs::write(&bin, script).unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

    Self { root, bin, log }
  }

  /// A driver that logs its arguments, one invocation per line, and creates
  /// every file named by a `-o` flag.
  #[cfg(unix)]
  pub fn recording(dir: &Path) -> Self {
    Self::script(
      dir,
      r#"echo "$@" >> "$LOG"
prev=
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then : > "$arg"; fi
  prev=$arg
done"#,
    )
  }

  pub fn root_str(&self) -> String {
    self.root.to_string_lossy().into_owned()
  }
}

/// Lines written to a fake driver's log, empty if it never ran.
pub fn read_log(log: &Path) -> Vec<String> {
  std::fs::read_to_string(log)
    .map(|content| content.lines().map(str::to_string).collect())
    .unwrap_or_default()
}
