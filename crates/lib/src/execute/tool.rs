//! Toolchain subcommand execution.
//!
//! Every `go tool ...` call runs with a cleared environment that only pins
//! `GOROOT_FINAL`, so produced artifacts do not embed the build machine's
//! toolchain location.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{debug, info};

use super::types::{ExecuteError, ToolInvocation};
use crate::consts::GOROOT_FINAL;

/// Run one toolchain invocation to completion.
///
/// Standard output and standard error are captured together, in the order
/// the tool wrote them. On a non-zero exit the captured output is written to
/// this process's standard error before [`ExecuteError::ToolFailed`] is
/// returned.
///
/// # Arguments
///
/// * `go_bin` - The `go` driver of the declared toolchain
/// * `invocation` - Arguments passed to the driver
/// * `work_dir` - Working directory of the child process
pub async fn run_tool(go_bin: &Path, invocation: &ToolInvocation, work_dir: &Path) -> Result<(), ExecuteError> {
  info!(tool = %invocation.name(), "running go tool");
  debug!(program = %go_bin.display(), args = ?invocation.args, work_dir = %work_dir.display(), "spawning process");

  let (status, output) = run_combined(go_bin, invocation, work_dir).await?;

  if !status.success() {
    let mut stderr = std::io::stderr().lock();
    // The tool failure is reported whether or not the replay succeeds.
    let _ = stderr.write_all(&output);
    let _ = stderr.flush();

    return Err(ExecuteError::ToolFailed {
      tool: invocation.name().to_string(),
      code: status.code(),
    });
  }

  if !output.is_empty() {
    debug!(output = %String::from_utf8_lossy(&output), "tool output");
  }

  Ok(())
}

/// Spawn the driver with stdout and stderr sharing one anonymous file, so
/// the two streams keep their relative order.
async fn run_combined(
  go_bin: &Path,
  invocation: &ToolInvocation,
  work_dir: &Path,
) -> Result<(ExitStatus, Vec<u8>), ExecuteError> {
  let mut capture = tempfile::tempfile().map_err(ExecuteError::Capture)?;
  let stdout = capture.try_clone().map_err(ExecuteError::Capture)?;
  let stderr = capture.try_clone().map_err(ExecuteError::Capture)?;

  let status = Command::new(go_bin)
    .args(&invocation.args)
    .current_dir(work_dir)
    .env_clear()
    .env("GOROOT_FINAL", GOROOT_FINAL)
    .stdin(std::process::Stdio::null())
    .stdout(stdout)
    .stderr(stderr)
    .status()
    .await
    .map_err(|source| ExecuteError::Spawn {
      program: go_bin.to_path_buf(),
      source,
    })?;

  let mut output = Vec::new();
  capture.seek(SeekFrom::Start(0)).map_err(ExecuteError::Capture)?;
  capture.read_to_end(&mut output).map_err(ExecuteError::Capture)?;
  Ok((status, output))
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::util::testutil::{FakeGo, read_log};
  use serial_test::serial;
  use tempfile::TempDir;

  #[tokio::test]
  #[serial]
  async fn runs_with_pinned_environment() {
    let temp = TempDir::new().unwrap();
    let go = FakeGo::script(temp.path(), "echo \"GOROOT_FINAL=$GOROOT_FINAL HOME=$HOME\" >> \"$LOG\"");

    run_tool(&go.bin, &ToolInvocation::tool("compile"), temp.path())
      .await
      .unwrap();

    assert_eq!(read_log(&go.log), vec!["GOROOT_FINAL=goroot HOME="]);
  }

  #[tokio::test]
  #[serial]
  async fn runs_in_work_dir() {
    let temp = TempDir::new().unwrap();
    let work = temp.path().join("work");
    std::fs::create_dir(&work).unwrap();
    let go = FakeGo::script(temp.path(), ": > ./marker");

    run_tool(&go.bin, &ToolInvocation::tool("asm"), &work).await.unwrap();

    assert!(work.join("marker").exists());
  }

  #[tokio::test]
  #[serial]
  async fn non_zero_exit_is_tool_failure() {
    let temp = TempDir::new().unwrap();
    let go = FakeGo::script(temp.path(), "echo 'undefined: foo' >&2; exit 2");

    let err = run_tool(&go.bin, &ToolInvocation::tool("compile"), temp.path())
      .await
      .unwrap_err();

    assert!(matches!(err, ExecuteError::ToolFailed { ref tool, code: Some(2) } if tool == "compile"));
  }

  #[tokio::test]
  async fn missing_driver_is_spawn_failure() {
    let temp = TempDir::new().unwrap();
    let err = run_tool(&temp.path().join("bin/go"), &ToolInvocation::tool("link"), temp.path())
      .await
      .unwrap_err();

    assert!(matches!(err, ExecuteError::Spawn { .. }));
  }

  #[tokio::test]
  #[serial]
  async fn output_streams_keep_their_order() {
    let temp = TempDir::new().unwrap();
    let go = FakeGo::script(temp.path(), "echo one; echo two >&2; echo three; exit 1");

    let (status, output) = run_combined(&go.bin, &ToolInvocation::tool("compile"), temp.path())
      .await
      .unwrap();

    assert_eq!(status.code(), Some(1));
    assert_eq!(String::from_utf8(output).unwrap(), "one\ntwo\nthree\n");
  }
}
