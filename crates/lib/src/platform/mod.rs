pub mod arch;
pub mod os;

use arch::Arch;
use os::Os;
use std::fmt;

use thiserror::Error;

/// Errors resolving the target platform.
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("unsupported host platform {os}/{arch}")]
  UnsupportedHost { os: &'static str, arch: &'static str },

  #[error("unknown GOOS value: {0}")]
  UnknownOs(String),

  #[error("unknown GOARCH value: {0}")]
  UnknownArch(String),
}

/// Target platform as the Go toolchain names it (e.g. "linux/amd64")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
}

impl Platform {
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Detect the host platform
  ///
  /// Returns `None` if the host OS or architecture has no Go equivalent
  pub fn current() -> Option<Self> {
    Some(Self {
      os: Os::current()?,
      arch: Arch::current()?,
    })
  }

  /// Resolve the target platform the way the Go toolchain does: `GOOS` and
  /// `GOARCH` from the environment when set, the host values otherwise.
  pub fn from_env() -> Result<Self, PlatformError> {
    let os = match std::env::var("GOOS") {
      Ok(name) if !name.is_empty() => Os::from_name(&name).ok_or(PlatformError::UnknownOs(name))?,
      _ => Os::current().ok_or_else(unsupported_host)?,
    };
    let arch = match std::env::var("GOARCH") {
      Ok(name) if !name.is_empty() => Arch::from_name(&name).ok_or(PlatformError::UnknownArch(name))?,
      _ => Arch::current().ok_or_else(unsupported_host)?,
    };
    Ok(Self { os, arch })
  }
}

fn unsupported_host() -> PlatformError {
  PlatformError::UnsupportedHost {
    os: std::env::consts::OS,
    arch: std::env::consts::ARCH,
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}
