use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ActionError;
use crate::consts::BUILD_ID_LEN;

/// One declarative build action as written by the orchestrator.
///
/// Only `outputs.out` and the `params` fields relevant to the selected mode
/// are consulted; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescription {
  /// Logical output name to store path. Only `out` is used.
  #[serde(default)]
  pub outputs: BTreeMap<String, String>,

  /// Target system triple, informational.
  #[serde(default)]
  pub system: String,

  #[serde(default)]
  pub params: ActionParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionParams {
  /// Binary name (link mode).
  pub name: String,
  /// Raw mode string; see [`ActionMode`].
  pub mode: String,
  /// Go import path of the package being compiled.
  pub path: String,
  pub is_program: bool,
  /// Directories holding already-built dependency archives.
  pub include_path: Vec<String>,
  /// Destination file name to absolute source path.
  pub input_files: BTreeMap<String, String>,
  pub input_assembly_files: BTreeMap<String, String>,
  /// Top-level archive to link (link mode).
  pub archive: String,
  pub go_root: String,
  /// Symbol name to string value, injected with `-X` at link time.
  pub x_defs: BTreeMap<String, String>,
}

/// The algorithm an action runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
  Compile,
  Link,
}

impl ActionMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Compile => "compile",
      Self::Link => "link",
    }
  }
}

impl FromStr for ActionMode {
  type Err = ActionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "compile" => Ok(Self::Compile),
      "link" => Ok(Self::Link),
      other => Err(ActionError::UnknownMode(other.to_string())),
    }
  }
}

impl std::fmt::Display for ActionMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Toolchain build-id derived from an output path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(pub String);

impl BuildId {
  /// Takes the first [`BUILD_ID_LEN`] bytes of the path's basename.
  pub fn from_output(path: &Path) -> Result<Self, ActionError> {
    let base = path
      .file_name()
      .and_then(|name| name.to_str())
      .ok_or_else(|| ActionError::InvalidOutputName(path.to_path_buf()))?;

    base
      .get(..BUILD_ID_LEN)
      .map(|id| BuildId(id.to_string()))
      .ok_or_else(|| ActionError::InvalidOutputName(path.to_path_buf()))
  }
}

impl std::fmt::Display for BuildId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl ActionDescription {
  pub fn mode(&self) -> Result<ActionMode, ActionError> {
    self.params.mode.parse()
  }

  /// The `out` output path.
  pub fn out_dir(&self) -> Result<PathBuf, ActionError> {
    self
      .outputs
      .get("out")
      .map(PathBuf::from)
      .ok_or(ActionError::MissingOutput("out"))
  }

  pub fn build_id(&self) -> Result<BuildId, ActionError> {
    BuildId::from_output(&self.out_dir()?)
  }

  /// The `go` driver inside the declared toolchain root.
  pub fn go_bin(&self) -> PathBuf {
    Path::new(&self.params.go_root).join("bin").join("go")
  }
}
