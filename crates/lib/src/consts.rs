//! Fixed names and values shared by the executor and the package extractor.

/// Action description file read from the working directory.
pub const ATTRS_FILE: &str = ".attrs.json";

/// Number of leading basename bytes reused as the toolchain build-id.
pub const BUILD_ID_LEN: usize = 32;

/// Logical install root embedded into artifacts instead of the real GOROOT.
pub const GOROOT_FINAL: &str = "goroot";

/// Environment variable naming the extractor's output document.
pub const OUT_ENV: &str = "out";

/// Directories with this name are never descended into by the extractor.
pub const FIXTURE_DIR: &str = "testdata";

/// Extra build tag enabled for every package import.
pub const EXTRA_BUILD_TAG: &str = "containers_image_openpgp";

/// Compiler name matched as a build tag.
pub const COMPILER: &str = "gc";

/// Highest `go1.N` release tag satisfied by the pinned toolchain.
pub const RELEASE_TAG_CEILING: u32 = 22;
