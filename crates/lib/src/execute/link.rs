//! Link mode: one top-level archive to an executable.

use std::path::PathBuf;

use super::types::ToolInvocation;
use crate::action::{ActionDescription, ActionError};

#[derive(Debug, Clone)]
pub struct LinkPlan {
  /// `<out>/bin`
  pub bin_dir: PathBuf,
  /// `<out>/bin/<name>`
  pub binary: PathBuf,
  pub step: ToolInvocation,
}

/// Build the link plan for `action`.
///
/// `-X` substitutions are emitted in key order so the invocation is
/// reproducible.
pub fn plan_link(action: &ActionDescription) -> Result<LinkPlan, ActionError> {
  let params = &action.params;
  let build_id = action.build_id()?;
  let bin_dir = action.out_dir()?.join("bin");
  let binary = bin_dir.join(&params.name);

  let mut step = ToolInvocation::tool("link")
    .args(["-linkmode", "internal", "-buildid"])
    .arg(build_id.0);
  for dir in &params.include_path {
    step = step.arg("-L").arg(dir);
  }
  for (key, value) in &params.x_defs {
    step = step.arg("-X").arg(format!("{}={}", key, value));
  }
  let step = step
    .arg("-o")
    .arg(binary.to_string_lossy())
    .arg(&params.archive);

  Ok(LinkPlan { bin_dir, binary, step })
}
