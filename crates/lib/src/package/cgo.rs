//! `#cgo` directives from `import "C"` preambles.

use std::path::Path;

use thiserror::Error;

use super::constraint::{parse_go_build, parse_plus_build};
use super::context::BuildContext;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CgoError {
  #[error("invalid #cgo line: {0}")]
  InvalidLine(String),

  #[error("invalid #cgo verb: {0}")]
  InvalidVerb(String),

  #[error("malformed #cgo argument: {0}")]
  MalformedArgument(String),
}

/// Flags accumulated from every cgo file of a package, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgoFlags {
  pub cflags: Vec<String>,
  pub cppflags: Vec<String>,
  pub cxxflags: Vec<String>,
  pub fflags: Vec<String>,
  pub ldflags: Vec<String>,
  pub pkg_config: Vec<String>,
}

impl CgoFlags {
  /// Record the directives found in one preamble.
  ///
  /// `dir` replaces `${SRCDIR}` and anchors relative `-I`/`-L` paths.
  pub fn save(&mut self, ctx: &BuildContext, dir: &Path, preamble: &[String]) -> Result<(), CgoError> {
    for orig in preamble {
      let line = orig.trim();
      let Some(body) = line.strip_prefix("#cgo") else {
        continue;
      };
      if !body.starts_with([' ', '\t']) {
        continue;
      }

      let fields: Vec<&str> = line.split_whitespace().collect();
      if fields.len() == 3 && matches!(fields[1], "nocallback" | "noescape") {
        continue;
      }

      let (head, argstr) = body
        .trim()
        .split_once(':')
        .ok_or_else(|| CgoError::InvalidLine(orig.clone()))?;
      let mut words: Vec<&str> = head.split_whitespace().collect();
      let verb = words.pop().ok_or_else(|| CgoError::InvalidLine(orig.clone()))?;

      if !words.is_empty() && !words.iter().any(|cond| match_condition(ctx, cond)) {
        continue;
      }

      let dir_str = dir.to_string_lossy();
      let mut args = split_quoted(argstr).ok_or_else(|| CgoError::InvalidLine(orig.clone()))?;
      for arg in &mut args {
        *arg = expand_src_dir(arg, &dir_str).ok_or_else(|| CgoError::MalformedArgument(arg.clone()))?;
      }

      let target = match verb {
        "CFLAGS" => &mut self.cflags,
        "CPPFLAGS" => &mut self.cppflags,
        "CXXFLAGS" => &mut self.cxxflags,
        "FFLAGS" => &mut self.fflags,
        "LDFLAGS" => &mut self.ldflags,
        "pkg-config" => {
          self.pkg_config.extend(args);
          continue;
        }
        _ => return Err(CgoError::InvalidVerb(orig.clone())),
      };
      make_paths_absolute(&mut args, dir);
      target.extend(args);
    }
    Ok(())
  }
}

/// A `#cgo` condition, matched like a build constraint clause.
fn match_condition(ctx: &BuildContext, cond: &str) -> bool {
  let expr = if cond.contains(['&', '|', '(', ')']) {
    parse_go_build(&format!("//go:build {}", cond))
  } else {
    parse_plus_build(&format!("// +build {}", cond))
  };
  expr.is_ok_and(|expr| expr.eval(&|tag| ctx.match_tag(tag)))
}

/// Split on unquoted whitespace; single and double quotes group, backslash
/// escapes the next character. `None` on an unterminated quote.
fn split_quoted(s: &str) -> Option<Vec<String>> {
  let mut args = Vec::new();
  let mut current = String::new();
  let mut in_arg = false;
  let mut quote: Option<char> = None;
  let mut escaped = false;

  for c in s.chars() {
    if escaped {
      current.push(c);
      escaped = false;
      in_arg = true;
    } else if c == '\\' {
      escaped = true;
    } else if let Some(q) = quote {
      if c == q {
        quote = None;
      } else {
        current.push(c);
      }
    } else if c == '"' || c == '\'' {
      quote = Some(c);
      in_arg = true;
    } else if c.is_whitespace() {
      if in_arg {
        args.push(std::mem::take(&mut current));
        in_arg = false;
      }
    } else {
      current.push(c);
      in_arg = true;
    }
  }

  if quote.is_some() || escaped {
    return None;
  }
  if in_arg {
    args.push(current);
  }
  Some(args)
}

/// Characters allowed in cgo arguments; anything non-ASCII is accepted too.
const SAFE_CHARS: &str = "+-.,/0123456789=ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz:$@%! ~^";

fn is_safe(s: &str) -> bool {
  !s.is_empty() && s.chars().all(|c| !c.is_ascii() || SAFE_CHARS.contains(c))
}

/// Substitute `${SRCDIR}`, rejecting arguments with unsafe characters.
fn expand_src_dir(arg: &str, dir: &str) -> Option<String> {
  let chunks: Vec<&str> = arg.split("${SRCDIR}").collect();
  if chunks.len() < 2 {
    return is_safe(arg).then(|| arg.to_string());
  }

  let ok = chunks.iter().all(|chunk| chunk.is_empty() || is_safe(chunk)) && (dir.is_empty() || is_safe(dir));
  let expanded = chunks.join(dir);
  (ok && !expanded.is_empty()).then_some(expanded)
}

fn make_paths_absolute(args: &mut [String], dir: &Path) {
  let mut next_is_path = false;
  for arg in args.iter_mut() {
    if next_is_path {
      if !Path::new(arg.as_str()).is_absolute() {
        *arg = dir.join(arg.as_str()).to_string_lossy().into_owned();
      }
      next_is_path = false;
    } else if arg.starts_with("-I") || arg.starts_with("-L") {
      if arg.len() == 2 {
        next_is_path = true;
      } else if !Path::new(&arg[2..]).is_absolute() {
        *arg = format!("{}{}", &arg[..2], dir.join(&arg[2..]).to_string_lossy());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::Platform;
  use crate::platform::arch::Arch;
  use crate::platform::os::Os;

  fn ctx() -> BuildContext {
    let mut ctx = BuildContext::new(Platform::new(Os::Linux, Arch::Amd64));
    ctx.cgo_enabled = true;
    ctx
  }

  fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|line| line.to_string()).collect()
  }

  #[test]
  fn collects_flags_by_verb() {
    let mut flags = CgoFlags::default();
    let preamble = lines(&[
      "#cgo CFLAGS: -DFOO=1 -O2",
      "#cgo CPPFLAGS: -Iinclude",
      "#cgo LDFLAGS: -lm -L/usr/lib",
      "#cgo pkg-config: libssl",
      "#include <stdio.h>",
    ]);

    flags.save(&ctx(), Path::new("/src/pkg"), &preamble).unwrap();

    assert_eq!(flags.cflags, vec!["-DFOO=1", "-O2"]);
    assert_eq!(flags.cppflags, vec!["-I/src/pkg/include"]);
    assert_eq!(flags.ldflags, vec!["-lm", "-L/usr/lib"]);
    assert_eq!(flags.pkg_config, vec!["libssl"]);
  }

  #[test]
  fn conditions_select_directives() {
    let mut flags = CgoFlags::default();
    let preamble = lines(&[
      "#cgo linux LDFLAGS: -ldl",
      "#cgo darwin LDFLAGS: -framework",
      "#cgo windows linux,amd64 CFLAGS: -DAMD64",
      "#cgo !linux CFLAGS: -DOTHER",
    ]);

    flags.save(&ctx(), Path::new("/src"), &preamble).unwrap();

    assert_eq!(flags.ldflags, vec!["-ldl"]);
    assert_eq!(flags.cflags, vec!["-DAMD64"]);
  }

  #[test]
  fn srcdir_is_expanded() {
    let mut flags = CgoFlags::default();
    flags
      .save(&ctx(), Path::new("/src/pkg"), &lines(&["#cgo CFLAGS: -I${SRCDIR}/vendor"]))
      .unwrap();
    assert_eq!(flags.cflags, vec!["-I/src/pkg/vendor"]);
  }

  #[test]
  fn quoted_arguments_stay_together() {
    assert_eq!(
      split_quoted(r#"-DNAME="a b" 'c d' e\ f"#),
      Some(vec!["-DNAME=a b".to_string(), "c d".to_string(), "e f".to_string()])
    );
    assert_eq!(split_quoted("'open"), None);
  }

  #[test]
  fn unknown_verb_is_an_error() {
    let mut flags = CgoFlags::default();
    let err = flags
      .save(&ctx(), Path::new("/src"), &lines(&["#cgo BOGUS: -x"]))
      .unwrap_err();
    assert!(matches!(err, CgoError::InvalidVerb(_)));
  }

  #[test]
  fn missing_colon_is_an_error() {
    let mut flags = CgoFlags::default();
    let err = flags.save(&ctx(), Path::new("/src"), &lines(&["#cgo CFLAGS -x"])).unwrap_err();
    assert!(matches!(err, CgoError::InvalidLine(_)));
  }

  #[test]
  fn shell_metacharacters_are_rejected() {
    let mut flags = CgoFlags::default();
    let err = flags
      .save(&ctx(), Path::new("/src"), &lines(&["#cgo LDFLAGS: -lfoo;rm"]))
      .unwrap_err();
    assert!(matches!(err, CgoError::MalformedArgument(_)));
  }
}
