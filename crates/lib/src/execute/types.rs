//! Types for action execution.
//!
//! This module defines the error type, the planned toolchain invocations and
//! the result of running one action.

use std::path::PathBuf;

use thiserror::Error;

use crate::action::ActionError;

/// Errors that can occur while executing an action.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The action description itself is unusable.
  #[error(transparent)]
  Action(#[from] ActionError),

  /// Creating a directory failed for a reason other than it already existing.
  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Materializing an input file into the staging directory failed.
  #[error("failed to stage {from} as {to}: {source}")]
  Stage {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The toolchain driver could not be started.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The file collecting a subcommand's output could not be used.
  #[error("failed to capture tool output: {0}")]
  Capture(#[source] std::io::Error),

  /// A toolchain subcommand exited unsuccessfully.
  #[error("go tool {tool} failed with exit code {code:?}")]
  ToolFailed { tool: String, code: Option<i32> },
}

/// One `go` driver invocation, in argument form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
  pub args: Vec<String>,
}

impl ToolInvocation {
  /// Start a `go tool <name>` invocation.
  pub fn tool(name: &str) -> Self {
    Self {
      args: vec!["tool".to_string(), name.to_string()],
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// The subcommand name (`compile`, `asm`, ...).
  pub fn name(&self) -> &str {
    self.args.get(1).map(String::as_str).unwrap_or_default()
  }

  /// Value following the first occurrence of `flag`.
  pub fn flag_value(&self, flag: &str) -> Option<&str> {
    self
      .args
      .iter()
      .position(|arg| arg == flag)
      .and_then(|index| self.args.get(index + 1))
      .map(String::as_str)
  }
}

/// Artifacts produced by a successful action.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
  pub artifacts: Vec<PathBuf>,
}
