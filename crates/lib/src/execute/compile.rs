//! Compile mode: Go (and optional assembly) sources to a package archive.
//!
//! With assembly inputs the sequence is `asm -gensymabis`, `asm`, `compile`
//! (fed the symbol ABIs, emitting `go_asm.h`), then `pack r` to append the
//! assembled object to the archive. Without them it is a single `compile`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::types::ToolInvocation;
use crate::action::{ActionDescription, ActionError};

/// Symbol ABI file produced by `asm -gensymabis`, relative to the work dir.
pub const SYMABIS: &str = "./symabis";

/// Object produced by the second `asm` pass, relative to the work dir.
pub const ASM_OBJECT: &str = "./asm.o";

/// Header emitted by `compile -asmhdr`, placed next to the archive root.
pub const ASM_HEADER: &str = "go_asm.h";

/// Everything needed to run a compile action.
#[derive(Debug, Clone)]
pub struct CompilePlan {
  /// Package-named directory the inputs are staged into.
  pub staging_dir: PathBuf,
  /// `<out>/<path>.a`
  pub archive: PathBuf,
  /// `<out>/go_asm.h`, only when assembly inputs exist.
  pub asm_header: Option<PathBuf>,
  /// Toolchain invocations in execution order.
  pub steps: Vec<ToolInvocation>,
}

/// Arguments shared by both assembler passes.
#[derive(Debug, Clone)]
struct AssemblerArgs {
  base: ToolInvocation,
}

impl AssemblerArgs {
  fn new(trimpath: &str, staging_dir: &Path, go_root: &str) -> Self {
    let base = ToolInvocation::tool("asm").args([
      "-trimpath",
      trimpath,
      "-I",
      path_str(staging_dir).as_str(),
      "-I",
      format!("{}/share/go/pkg/include", go_root).as_str(),
    ]);
    Self { base }
  }

  fn gen_symabis(&self, files: &[String]) -> ToolInvocation {
    self.base.clone().args(["-gensymabis", "-o", SYMABIS]).args(files)
  }

  fn object(&self, files: &[String]) -> ToolInvocation {
    self.base.clone().args(["-o", ASM_OBJECT]).args(files)
  }
}

/// Build the compile plan for `action`, staging under `work_dir`.
pub fn plan_compile(action: &ActionDescription, work_dir: &Path) -> Result<CompilePlan, ActionError> {
  let params = &action.params;
  let out = action.out_dir()?;
  let build_id = action.build_id()?;

  let trimpath = path_str(work_dir);
  let staging_dir = work_dir.join(&params.path);
  let archive = out.join(format!("{}.a", params.path));
  let archive_str = path_str(&archive);

  let mut compile = ToolInvocation::tool("compile").arg("-buildid").arg(build_id.0);
  for dir in &params.include_path {
    compile = compile.arg("-I").arg(dir);
  }
  // Programs are implicitly package main.
  if !params.is_program {
    compile = compile.arg("-p").arg(&params.path);
  }
  compile = compile.args(["-pack", "-o", archive_str.as_str(), "-trimpath", trimpath.as_str()]);

  let mut steps = Vec::new();
  let asm_header = if params.input_assembly_files.is_empty() {
    None
  } else {
    let asm = AssemblerArgs::new(&trimpath, &staging_dir, &params.go_root);
    let files = staged_paths(&staging_dir, &params.input_assembly_files);
    steps.push(asm.gen_symabis(&files));
    steps.push(asm.object(&files));

    let header = out.join(ASM_HEADER);
    compile = compile.args(["-symabis", SYMABIS, "-asmhdr", path_str(&header).as_str()]);
    Some(header)
  };

  steps.push(compile.args(staged_paths(&staging_dir, &params.input_files)));

  if asm_header.is_some() {
    steps.push(ToolInvocation::tool("pack").args(["r", archive_str.as_str(), ASM_OBJECT]));
  }

  Ok(CompilePlan {
    staging_dir,
    archive,
    asm_header,
    steps,
  })
}

fn staged_paths(staging_dir: &Path, files: &BTreeMap<String, String>) -> Vec<String> {
  files.keys().map(|name| path_str(&staging_dir.join(name))).collect()
}

fn path_str(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}
