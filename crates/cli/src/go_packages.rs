//! `go-packages`: describe every Go package under a source tree.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use gobuild_lib::package::dump;

/// Write package metadata for a Go source tree to the file named by `$out`.
#[derive(Parser)]
#[command(name = "go-packages")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Root of the source tree to scan
  root: PathBuf,

  /// Import path the root corresponds to
  prefix: String,
}

fn main() -> ExitCode {
  output::init_tracing();
  let cli = Cli::parse();

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      output::print_error(&e);
      ExitCode::FAILURE
    }
  }
}

fn run(cli: &Cli) -> Result<()> {
  dump::run(&cli.root, &cli.prefix).with_context(|| format!("Failed to extract packages from {}", cli.root.display()))?;
  Ok(())
}
