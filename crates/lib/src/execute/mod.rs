//! Action execution.
//!
//! An [`Executor`] takes one [`ActionDescription`], plans the toolchain
//! invocations for its mode, stages inputs and runs the invocations one after
//! another. Any failure aborts the action; nothing is retried.
//!
//! # Modes
//!
//! - `compile`: stage sources, optionally assemble, compile to `<out>/<path>.a`
//! - `link`: link one archive to `<out>/bin/<name>`

pub mod compile;
pub mod link;
pub mod stage;
pub mod tool;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::info;

pub use compile::{CompilePlan, plan_compile};
pub use link::{LinkPlan, plan_link};
pub use types::{ActionOutcome, ExecuteError, ToolInvocation};

use crate::action::{ActionDescription, ActionMode};
use stage::{ensure_dir, stage_files};
use tool::run_tool;

/// Runs actions relative to a working directory.
///
/// Staging directories are created under the working directory and every
/// toolchain subcommand runs inside it.
#[derive(Debug, Clone)]
pub struct Executor {
  work_dir: PathBuf,
}

impl Executor {
  pub fn new(work_dir: impl Into<PathBuf>) -> Self {
    Self {
      work_dir: work_dir.into(),
    }
  }

  pub fn work_dir(&self) -> &Path {
    &self.work_dir
  }

  /// Execute `action` to completion.
  pub async fn run(&self, action: &ActionDescription) -> Result<ActionOutcome, ExecuteError> {
    let mode = action.mode()?;
    info!(mode = %mode, path = %action.params.path, system = %action.system, "executing action");

    match mode {
      ActionMode::Compile => self.compile(action).await,
      ActionMode::Link => self.link(action).await,
    }
  }

  async fn compile(&self, action: &ActionDescription) -> Result<ActionOutcome, ExecuteError> {
    let plan = plan_compile(action, &self.work_dir)?;
    let params = &action.params;

    ensure_dir(&plan.staging_dir).await?;
    stage_files(&plan.staging_dir, &params.input_files).await?;
    stage_files(&plan.staging_dir, &params.input_assembly_files).await?;

    if let Some(parent) = plan.archive.parent() {
      ensure_dir(parent).await?;
    }

    let go_bin = action.go_bin();
    for step in &plan.steps {
      run_tool(&go_bin, step, &self.work_dir).await?;
    }

    let mut artifacts = vec![plan.archive];
    artifacts.extend(plan.asm_header);
    Ok(ActionOutcome { artifacts })
  }

  async fn link(&self, action: &ActionDescription) -> Result<ActionOutcome, ExecuteError> {
    let plan = plan_link(action)?;

    ensure_dir(&plan.bin_dir).await?;
    run_tool(&action.go_bin(), &plan.step, &self.work_dir).await?;

    Ok(ActionOutcome {
      artifacts: vec![plan.binary],
    })
  }
}
