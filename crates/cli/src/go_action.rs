//! `go-action`: run the compile or link action described by `./.attrs.json`.

mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gobuild_lib::action;
use gobuild_lib::consts::ATTRS_FILE;
use gobuild_lib::execute::Executor;

/// Compile or link one Go package inside a build sandbox.
///
/// Reads the action from `.attrs.json` in the working directory.
#[derive(Parser)]
#[command(name = "go-action")]
#[command(author, version, about, long_about = None)]
struct Cli {}

fn main() -> ExitCode {
  output::init_tracing();
  let _cli = Cli::parse();

  match run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      output::print_error(&e);
      ExitCode::FAILURE
    }
  }
}

fn run() -> Result<()> {
  let work_dir = std::env::current_dir().context("Failed to determine working directory")?;
  let description = action::load(&work_dir.join(ATTRS_FILE))?;

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;
  let outcome = rt.block_on(Executor::new(work_dir).run(&description))?;

  for artifact in &outcome.artifacts {
    info!(path = %artifact.display(), "artifact written");
  }
  Ok(())
}
