use std::fmt;

/// CPU architectures known to the Go toolchain (`GOARCH` values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  I386,
  Amd64,
  Amd64p32,
  Arm,
  Armbe,
  Arm64,
  Arm64be,
  Loong64,
  Mips,
  Mipsle,
  Mips64,
  Mips64le,
  Mips64p32,
  Mips64p32le,
  Ppc,
  Ppc64,
  Ppc64le,
  Riscv,
  Riscv64,
  S390,
  S390x,
  Sparc,
  Sparc64,
  Wasm,
}

impl Arch {
  pub const ALL: [Arch; 24] = [
    Self::I386,
    Self::Amd64,
    Self::Amd64p32,
    Self::Arm,
    Self::Armbe,
    Self::Arm64,
    Self::Arm64be,
    Self::Loong64,
    Self::Mips,
    Self::Mipsle,
    Self::Mips64,
    Self::Mips64le,
    Self::Mips64p32,
    Self::Mips64p32le,
    Self::Ppc,
    Self::Ppc64,
    Self::Ppc64le,
    Self::Riscv,
    Self::Riscv64,
    Self::S390,
    Self::S390x,
    Self::Sparc,
    Self::Sparc64,
    Self::Wasm,
  ];

  /// Detect the host CPU architecture
  pub fn current() -> Option<Self> {
    let little = cfg!(target_endian = "little");
    match std::env::consts::ARCH {
      "x86" => Some(Self::I386),
      "x86_64" => Some(Self::Amd64),
      "arm" => Some(Self::Arm),
      "aarch64" => Some(Self::Arm64),
      "loongarch64" => Some(Self::Loong64),
      "mips" if little => Some(Self::Mipsle),
      "mips" => Some(Self::Mips),
      "mips64" if little => Some(Self::Mips64le),
      "mips64" => Some(Self::Mips64),
      "powerpc" => Some(Self::Ppc),
      "powerpc64" if little => Some(Self::Ppc64le),
      "powerpc64" => Some(Self::Ppc64),
      "riscv64" => Some(Self::Riscv64),
      "s390x" => Some(Self::S390x),
      "sparc64" => Some(Self::Sparc64),
      "wasm32" => Some(Self::Wasm),
      _ => None,
    }
  }

  /// Look up a `GOARCH` name.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|arch| arch.as_str() == name)
  }

  /// Returns the `GOARCH` identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::I386 => "386",
      Self::Amd64 => "amd64",
      Self::Amd64p32 => "amd64p32",
      Self::Arm => "arm",
      Self::Armbe => "armbe",
      Self::Arm64 => "arm64",
      Self::Arm64be => "arm64be",
      Self::Loong64 => "loong64",
      Self::Mips => "mips",
      Self::Mipsle => "mipsle",
      Self::Mips64 => "mips64",
      Self::Mips64le => "mips64le",
      Self::Mips64p32 => "mips64p32",
      Self::Mips64p32le => "mips64p32le",
      Self::Ppc => "ppc",
      Self::Ppc64 => "ppc64",
      Self::Ppc64le => "ppc64le",
      Self::Riscv => "riscv",
      Self::Riscv64 => "riscv64",
      Self::S390 => "s390",
      Self::S390x => "s390x",
      Self::Sparc => "sparc",
      Self::Sparc64 => "sparc64",
      Self::Wasm => "wasm",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn x86_uses_go_identifiers() {
    assert_eq!(Arch::from_name("386"), Some(Arch::I386));
    assert_eq!(Arch::from_name("amd64"), Some(Arch::Amd64));
    assert_eq!(Arch::from_name("x86_64"), None);
  }

  #[test]
  fn from_name_roundtrips_every_known_arch() {
    for arch in Arch::ALL {
      assert_eq!(Arch::from_name(arch.as_str()), Some(arch));
    }
  }
}
