//! Slash-separated path helpers for logical import paths.

use std::path::Path;

/// Lexically clean a slash path: collapse repeated separators, drop `.`
/// segments and resolve `..` where possible.
pub fn clean(path: &str) -> String {
  let rooted = path.starts_with('/');
  let mut parts: Vec<&str> = Vec::new();
  for segment in path.split('/') {
    match segment {
      "" | "." => {}
      ".." => match parts.last() {
        Some(&last) if last != ".." => {
          parts.pop();
        }
        _ if rooted => {}
        _ => parts.push(".."),
      },
      segment => parts.push(segment),
    }
  }

  let joined = parts.join("/");
  match (rooted, joined.is_empty()) {
    (true, _) => format!("/{}", joined),
    (false, true) => ".".to_string(),
    (false, false) => joined,
  }
}

/// Join `rel` onto `prefix` and clean the result. An empty `prefix` yields
/// `rel` alone.
pub fn join_clean(prefix: &str, rel: &str) -> String {
  match (prefix.is_empty(), rel.is_empty()) {
    (true, true) => String::new(),
    (true, false) => clean(rel),
    (false, true) => clean(prefix),
    (false, false) => clean(&format!("{}/{}", prefix, rel)),
  }
}

/// `dir` relative to `root` with `/` separators, `.` for the root itself.
pub fn rel_slash(root: &Path, dir: &Path) -> String {
  let rel = dir.strip_prefix(root).unwrap_or(dir);
  let parts: Vec<String> = rel
    .components()
    .map(|component| component.as_os_str().to_string_lossy().into_owned())
    .collect();
  if parts.is_empty() {
    ".".to_string()
  } else {
    parts.join("/")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clean_normalizes() {
    assert_eq!(clean("a//b/./c/"), "a/b/c");
    assert_eq!(clean("a/b/../c"), "a/c");
    assert_eq!(clean("../a"), "../a");
    assert_eq!(clean("/../a"), "/a");
    assert_eq!(clean(""), ".");
  }

  #[test]
  fn root_maps_to_prefix() {
    assert_eq!(join_clean("example.com/app", "."), "example.com/app");
    assert_eq!(join_clean("example.com/app", "cmd/tool"), "example.com/app/cmd/tool");
    assert_eq!(join_clean("example.com/app/", "./pkg"), "example.com/app/pkg");
    assert_eq!(join_clean("", "pkg"), "pkg");
  }

  #[test]
  fn relative_dirs_use_slashes() {
    let root = Path::new("/src/repo");
    assert_eq!(rel_slash(root, Path::new("/src/repo")), ".");
    assert_eq!(rel_slash(root, Path::new("/src/repo/cmd/tool")), "cmd/tool");
  }
}
