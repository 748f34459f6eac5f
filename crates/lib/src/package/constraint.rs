//! Build constraints.
//!
//! Parses `//go:build` expressions and legacy `// +build` lines into an
//! [`Expr`] tree, and extracts the constraint that governs a whole file from
//! its leading comments.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
  #[error("unexpected end of build constraint")]
  UnexpectedEnd,

  #[error("unexpected token {0:?} in build constraint")]
  UnexpectedToken(String),

  #[error("invalid build tag {0:?}")]
  InvalidTag(String),

  #[error("double negation not allowed in build constraint")]
  DoubleNegation,

  #[error("multiple //go:build comments")]
  MultipleGoBuild,

  #[error("unterminated /* comment before package clause")]
  UnterminatedComment,
}

/// A boolean expression over build tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  Tag(String),
  Not(Box<Expr>),
  And(Box<Expr>, Box<Expr>),
  Or(Box<Expr>, Box<Expr>),
}

impl Expr {
  fn not(x: Expr) -> Expr {
    Expr::Not(Box::new(x))
  }

  fn and(x: Expr, y: Expr) -> Expr {
    Expr::And(Box::new(x), Box::new(y))
  }

  fn or(x: Expr, y: Expr) -> Expr {
    Expr::Or(Box::new(x), Box::new(y))
  }

  /// Evaluate with `has_tag` deciding each tag.
  pub fn eval(&self, has_tag: &impl Fn(&str) -> bool) -> bool {
    match self {
      Expr::Tag(tag) => has_tag(tag),
      Expr::Not(x) => !x.eval(has_tag),
      Expr::And(x, y) => x.eval(has_tag) && y.eval(has_tag),
      Expr::Or(x, y) => x.eval(has_tag) || y.eval(has_tag),
    }
  }
}

/// `//go:build` followed by end of line or whitespace.
pub fn is_go_build(line: &str) -> bool {
  line
    .strip_prefix("//go:build")
    .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
}

/// `// +build` (any spacing after the slashes) followed by end of line or whitespace.
pub fn is_plus_build(line: &str) -> bool {
  plus_build_body(line).is_some()
}

fn plus_build_body(line: &str) -> Option<&str> {
  let rest = line.strip_prefix("//")?.trim_start().strip_prefix("+build")?;
  (rest.is_empty() || rest.starts_with([' ', '\t'])).then_some(rest)
}

fn is_valid_tag(tag: &str) -> bool {
  !tag.is_empty() && tag.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// Parse a `//go:build` line.
pub fn parse_go_build(line: &str) -> Result<Expr, ConstraintError> {
  let text = line.strip_prefix("//go:build").unwrap_or(line);
  let tokens = tokenize(text)?;
  let mut parser = Parser { tokens, pos: 0 };
  let expr = parser.or()?;
  match parser.peek() {
    None => Ok(expr),
    Some(tok) => Err(ConstraintError::UnexpectedToken(tok.to_string())),
  }
}

/// Parse a `// +build` line: space-separated alternatives of comma-separated
/// terms. A line with no terms never matches.
pub fn parse_plus_build(line: &str) -> Result<Expr, ConstraintError> {
  let body = plus_build_body(line).unwrap_or(line);
  let mut result: Option<Expr> = None;

  for clause in body.split_whitespace() {
    let mut conj: Option<Expr> = None;
    for term in clause.split(',') {
      let (negated, tag) = match term.strip_prefix('!') {
        Some(rest) if rest.starts_with('!') => return Err(ConstraintError::DoubleNegation),
        Some(rest) => (true, rest),
        None => (false, term),
      };
      if !is_valid_tag(tag) {
        return Err(ConstraintError::InvalidTag(term.to_string()));
      }
      let x = Expr::Tag(tag.to_string());
      let x = if negated { Expr::not(x) } else { x };
      conj = Some(match conj {
        Some(prev) => Expr::and(prev, x),
        None => x,
      });
    }
    if let Some(conj) = conj {
      result = Some(match result {
        Some(prev) => Expr::or(prev, conj),
        None => conj,
      });
    }
  }

  Ok(result.unwrap_or_else(|| Expr::Tag("ignore".to_string())))
}

/// The constraint governing a source file, read from its leading comments.
///
/// A `//go:build` line anywhere in the leading comment block wins. Otherwise
/// every `// +build` line before the last blank line that precedes the first
/// non-comment line is ANDed together; a `+build` line that does not parse
/// is skipped. `None` means unconstrained.
pub fn file_constraint(content: &str) -> Result<Option<Expr>, ConstraintError> {
  let mut go_build: Option<&str> = None;
  let mut comment_lines: Vec<(usize, &str)> = Vec::new();
  let mut last_blank = 0;
  let mut in_block = false;

  for (index, raw) in content.trim_start_matches('\u{feff}').lines().enumerate() {
    let mut line = raw.trim();

    if in_block {
      match line.find("*/") {
        Some(end) => {
          in_block = false;
          line = line[end + 2..].trim();
          if line.is_empty() {
            continue;
          }
        }
        None => continue,
      }
    }

    if line.is_empty() {
      last_blank = index;
      continue;
    }

    if line.starts_with("//") {
      if is_go_build(line) {
        if go_build.is_some() {
          return Err(ConstraintError::MultipleGoBuild);
        }
        go_build = Some(line);
      }
      comment_lines.push((index, line));
      continue;
    }

    if let Some(rest) = line.strip_prefix("/*") {
      match rest.find("*/") {
        Some(end) => {
          let after = rest[end + 2..].trim();
          if after.is_empty() || after.starts_with("//") {
            continue;
          }
        }
        None => {
          in_block = true;
          continue;
        }
      }
    }

    break;
  }

  if in_block {
    return Err(ConstraintError::UnterminatedComment);
  }

  if let Some(line) = go_build {
    return parse_go_build(line).map(Some);
  }

  let mut result: Option<Expr> = None;
  for (index, line) in comment_lines {
    if index >= last_blank || !is_plus_build(line) {
      continue;
    }
    // Unparseable `+build` lines are ignored rather than rejected.
    let Ok(x) = parse_plus_build(line) else {
      continue;
    };
    result = Some(match result {
      Some(prev) => Expr::and(prev, x),
      None => x,
    });
  }
  Ok(result)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  LParen,
  RParen,
  Not,
  And,
  Or,
  Tag(String),
}

impl std::fmt::Display for Token {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Token::LParen => write!(f, "("),
      Token::RParen => write!(f, ")"),
      Token::Not => write!(f, "!"),
      Token::And => write!(f, "&&"),
      Token::Or => write!(f, "||"),
      Token::Tag(tag) => write!(f, "{}", tag),
    }
  }
}

fn tokenize(text: &str) -> Result<Vec<Token>, ConstraintError> {
  let mut tokens = Vec::new();
  let mut chars = text.char_indices().peekable();

  while let Some((start, c)) = chars.next() {
    match c {
      ' ' | '\t' => {}
      '(' => tokens.push(Token::LParen),
      ')' => tokens.push(Token::RParen),
      '!' => tokens.push(Token::Not),
      '&' | '|' => {
        if chars.next_if(|&(_, next)| next == c).is_none() {
          return Err(ConstraintError::UnexpectedToken(c.to_string()));
        }
        tokens.push(if c == '&' { Token::And } else { Token::Or });
      }
      c if c.is_alphanumeric() || c == '_' || c == '.' => {
        let mut end = start + c.len_utf8();
        while let Some((i, next)) = chars.next_if(|&(_, next)| next.is_alphanumeric() || next == '_' || next == '.') {
          end = i + next.len_utf8();
        }
        tokens.push(Token::Tag(text[start..end].to_string()));
      }
      other => return Err(ConstraintError::UnexpectedToken(other.to_string())),
    }
  }

  Ok(tokens)
}

struct Parser {
  tokens: Vec<Token>,
  pos: usize,
}

impl Parser {
  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn next(&mut self) -> Option<Token> {
    let tok = self.tokens.get(self.pos).cloned();
    self.pos += 1;
    tok
  }

  fn or(&mut self) -> Result<Expr, ConstraintError> {
    let mut x = self.and()?;
    while self.peek() == Some(&Token::Or) {
      self.pos += 1;
      x = Expr::or(x, self.and()?);
    }
    Ok(x)
  }

  fn and(&mut self) -> Result<Expr, ConstraintError> {
    let mut x = self.not()?;
    while self.peek() == Some(&Token::And) {
      self.pos += 1;
      x = Expr::and(x, self.not()?);
    }
    Ok(x)
  }

  fn not(&mut self) -> Result<Expr, ConstraintError> {
    if self.peek() == Some(&Token::Not) {
      self.pos += 1;
      if self.peek() == Some(&Token::Not) {
        return Err(ConstraintError::DoubleNegation);
      }
      return Ok(Expr::not(self.atom()?));
    }
    self.atom()
  }

  fn atom(&mut self) -> Result<Expr, ConstraintError> {
    match self.next() {
      Some(Token::LParen) => {
        let x = self.or()?;
        match self.next() {
          Some(Token::RParen) => Ok(x),
          Some(tok) => Err(ConstraintError::UnexpectedToken(tok.to_string())),
          None => Err(ConstraintError::UnexpectedEnd),
        }
      }
      Some(Token::Tag(tag)) => Ok(Expr::Tag(tag)),
      Some(tok) => Err(ConstraintError::UnexpectedToken(tok.to_string())),
      None => Err(ConstraintError::UnexpectedEnd),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tags(set: &'static [&'static str]) -> impl Fn(&str) -> bool {
    move |tag| set.iter().any(|t| *t == tag)
  }

  #[test]
  fn go_build_precedence() {
    let expr = parse_go_build("//go:build linux && amd64 || !cgo").unwrap();

    assert!(expr.eval(&tags(&["linux", "amd64"])));
    assert!(expr.eval(&tags(&[])));
    assert!(!expr.eval(&tags(&["linux", "cgo"])));
  }

  #[test]
  fn go_build_parentheses() {
    let expr = parse_go_build("//go:build (darwin || linux) && !appengine").unwrap();

    assert!(expr.eval(&tags(&["darwin"])));
    assert!(!expr.eval(&tags(&["linux", "appengine"])));
    assert!(!expr.eval(&tags(&["windows"])));
  }

  #[test]
  fn go_build_rejects_malformed_expressions() {
    assert_eq!(parse_go_build("//go:build linux &&"), Err(ConstraintError::UnexpectedEnd));
    assert_eq!(parse_go_build("//go:build !!linux"), Err(ConstraintError::DoubleNegation));
    assert!(matches!(parse_go_build("//go:build linux & amd64"), Err(ConstraintError::UnexpectedToken(_))));
    assert!(matches!(parse_go_build("//go:build (linux"), Err(ConstraintError::UnexpectedEnd)));
    assert!(matches!(parse_go_build("//go:build linux)"), Err(ConstraintError::UnexpectedToken(_))));
  }

  #[test]
  fn plus_build_spaces_are_or_commas_are_and() {
    let expr = parse_plus_build("// +build linux,386 darwin,!cgo").unwrap();

    assert!(expr.eval(&tags(&["linux", "386"])));
    assert!(expr.eval(&tags(&["darwin"])));
    assert!(!expr.eval(&tags(&["linux"])));
    assert!(!expr.eval(&tags(&["darwin", "cgo"])));
  }

  #[test]
  fn empty_plus_build_never_matches() {
    let expr = parse_plus_build("// +build").unwrap();
    assert_eq!(expr, Expr::Tag("ignore".to_string()));
  }

  #[test]
  fn line_recognition() {
    assert!(is_go_build("//go:build linux"));
    assert!(!is_go_build("//go:builder linux"));
    assert!(!is_go_build("// go:build linux"));
    assert!(is_plus_build("// +build linux"));
    assert!(is_plus_build("//+build linux"));
    assert!(!is_plus_build("// +builds linux"));
  }

  #[test]
  fn go_build_wins_over_plus_build() {
    let src = "//go:build ignore\n// +build linux\n\npackage main\n";
    let expr = file_constraint(src).unwrap().unwrap();
    assert_eq!(expr, Expr::Tag("ignore".to_string()));
  }

  #[test]
  fn plus_build_lines_are_anded() {
    let src = "// Copyright\n\n// +build linux darwin\n// +build amd64\n\npackage foo\n";
    let expr = file_constraint(src).unwrap().unwrap();

    assert!(expr.eval(&tags(&["linux", "amd64"])));
    assert!(!expr.eval(&tags(&["linux", "arm64"])));
  }

  #[test]
  fn plus_build_without_blank_line_is_a_doc_comment() {
    let src = "// +build ignore\npackage foo\n";
    assert_eq!(file_constraint(src).unwrap(), None);
  }

  #[test]
  fn constraints_after_package_clause_are_ignored() {
    let src = "package foo\n\n//go:build ignore\n";
    assert_eq!(file_constraint(src).unwrap(), None);
  }

  #[test]
  fn block_comments_are_skipped() {
    let src = "/* license\n   text */\n\n//go:build linux\n\npackage foo\n";
    assert_eq!(file_constraint(src).unwrap(), Some(Expr::Tag("linux".to_string())));
  }

  #[test]
  fn malformed_plus_build_lines_are_skipped() {
    assert_eq!(file_constraint("// +build linux,\n\npackage a\n").unwrap(), None);

    let src = "// +build !!linux\n// +build amd64\n// +build bad-tag\n\npackage a\n";
    assert_eq!(file_constraint(src).unwrap(), Some(Expr::Tag("amd64".to_string())));
  }

  #[test]
  fn malformed_go_build_line_is_an_error() {
    assert!(file_constraint("//go:build linux &&\n\npackage a\n").is_err());
  }

  #[test]
  fn multiple_go_build_lines_are_an_error() {
    let src = "//go:build linux\n//go:build amd64\n\npackage foo\n";
    assert_eq!(file_constraint(src), Err(ConstraintError::MultipleGoBuild));
  }
}
