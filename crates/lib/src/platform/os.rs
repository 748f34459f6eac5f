use std::fmt;

/// Operating systems known to the Go toolchain (`GOOS` values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Aix,
  Android,
  Darwin,
  Dragonfly,
  Freebsd,
  Hurd,
  Illumos,
  Ios,
  Js,
  Linux,
  Nacl,
  Netbsd,
  Openbsd,
  Plan9,
  Solaris,
  Wasip1,
  Windows,
  Zos,
}

impl Os {
  pub const ALL: [Os; 18] = [
    Self::Aix,
    Self::Android,
    Self::Darwin,
    Self::Dragonfly,
    Self::Freebsd,
    Self::Hurd,
    Self::Illumos,
    Self::Ios,
    Self::Js,
    Self::Linux,
    Self::Nacl,
    Self::Netbsd,
    Self::Openbsd,
    Self::Plan9,
    Self::Solaris,
    Self::Wasip1,
    Self::Windows,
    Self::Zos,
  ];

  /// Detect the host operating system
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "aix" => Some(Self::Aix),
      "android" => Some(Self::Android),
      "macos" => Some(Self::Darwin),
      "dragonfly" => Some(Self::Dragonfly),
      "freebsd" => Some(Self::Freebsd),
      "hurd" => Some(Self::Hurd),
      "illumos" => Some(Self::Illumos),
      "ios" => Some(Self::Ios),
      "linux" => Some(Self::Linux),
      "netbsd" => Some(Self::Netbsd),
      "openbsd" => Some(Self::Openbsd),
      "solaris" => Some(Self::Solaris),
      "wasi" => Some(Self::Wasip1),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Look up a `GOOS` name.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|os| os.as_str() == name)
  }

  /// Returns the `GOOS` identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Aix => "aix",
      Self::Android => "android",
      Self::Darwin => "darwin",
      Self::Dragonfly => "dragonfly",
      Self::Freebsd => "freebsd",
      Self::Hurd => "hurd",
      Self::Illumos => "illumos",
      Self::Ios => "ios",
      Self::Js => "js",
      Self::Linux => "linux",
      Self::Nacl => "nacl",
      Self::Netbsd => "netbsd",
      Self::Openbsd => "openbsd",
      Self::Plan9 => "plan9",
      Self::Solaris => "solaris",
      Self::Wasip1 => "wasip1",
      Self::Windows => "windows",
      Self::Zos => "zos",
    }
  }

  /// Whether the `unix` build tag is satisfied on this OS.
  pub fn is_unix(&self) -> bool {
    matches!(
      self,
      Self::Aix
        | Self::Android
        | Self::Darwin
        | Self::Dragonfly
        | Self::Freebsd
        | Self::Hurd
        | Self::Illumos
        | Self::Ios
        | Self::Linux
        | Self::Netbsd
        | Self::Openbsd
        | Self::Solaris
    )
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
