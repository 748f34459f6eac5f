//! Build context: which files belong to a package under a configuration.

use crate::consts::{COMPILER, EXTRA_BUILD_TAG, RELEASE_TAG_CEILING};
use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::platform::{Platform, PlatformError};

use super::constraint::{ConstraintError, file_constraint};

/// The configuration packages are imported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
  pub platform: Platform,
  pub compiler: String,
  pub cgo_enabled: bool,
  /// Extra tags enabled on top of platform, compiler and release tags.
  pub build_tags: Vec<String>,
  /// `go1.1` up to the toolchain's release.
  pub release_tags: Vec<String>,
}

impl BuildContext {
  /// A context for `platform` with cgo disabled and no extra tags.
  pub fn new(platform: Platform) -> Self {
    Self {
      platform,
      compiler: COMPILER.to_string(),
      cgo_enabled: false,
      build_tags: Vec::new(),
      release_tags: (1..=RELEASE_TAG_CEILING).map(|minor| format!("go1.{}", minor)).collect(),
    }
  }

  /// The extractor's fixed configuration: target platform from the
  /// environment, cgo disabled, `containers_image_openpgp` enabled.
  pub fn pinned() -> Result<Self, PlatformError> {
    let mut ctx = Self::new(Platform::from_env()?);
    ctx.build_tags.push(EXTRA_BUILD_TAG.to_string());
    Ok(ctx)
  }

  /// Whether a single build tag is satisfied.
  pub fn match_tag(&self, name: &str) -> bool {
    if name.is_empty() {
      return false;
    }
    if self.cgo_enabled && name == "cgo" {
      return true;
    }

    let os = self.platform.os;
    if name == os.as_str() || name == self.platform.arch.as_str() || name == self.compiler {
      return true;
    }
    match (os, name) {
      (Os::Android, "linux") | (Os::Illumos, "solaris") | (Os::Ios, "darwin") => return true,
      _ => {}
    }
    if name == "unix" && os.is_unix() {
      return true;
    }

    self.build_tags.iter().chain(&self.release_tags).any(|tag| tag == name)
  }

  /// Apply the `name_GOOS_GOARCH` file-name convention.
  ///
  /// Everything before the first `_` is ignored, as is a trailing `_test`.
  pub fn good_os_arch_file(&self, name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    let Some(underscore) = stem.find('_') else {
      return true;
    };

    let mut parts: Vec<&str> = stem[underscore..].split('_').collect();
    if parts.last() == Some(&"test") {
      parts.pop();
    }

    let n = parts.len();
    if n >= 2 && Os::from_name(parts[n - 2]).is_some() && Arch::from_name(parts[n - 1]).is_some() {
      return self.match_tag(parts[n - 2]) && self.match_tag(parts[n - 1]);
    }
    if n >= 1 && (Os::from_name(parts[n - 1]).is_some() || Arch::from_name(parts[n - 1]).is_some()) {
      return self.match_tag(parts[n - 1]);
    }
    true
  }

  /// Whether the file's leading build constraint is satisfied.
  pub fn should_build(&self, content: &str) -> Result<bool, ConstraintError> {
    Ok(match file_constraint(content)? {
      Some(expr) => expr.eval(&|tag| self.match_tag(tag)),
      None => true,
    })
  }
}
