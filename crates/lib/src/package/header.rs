//! Go source file header reader.
//!
//! Reads the package clause and the import declarations that follow it,
//! stopping at the first other declaration. Comment groups directly above an
//! import are kept so cgo directives can be read from the `import "C"`
//! preamble.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
  #[error("expected {expected}, found {found}")]
  Expected { expected: &'static str, found: String },

  #[error("unterminated string literal")]
  UnterminatedString,

  #[error("unterminated comment")]
  UnterminatedComment,
}

/// One imported package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
  pub path: String,
  /// Text of the comment group directly preceding the import, one entry per
  /// comment line, comment markers removed.
  pub doc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoHeader {
  pub package: String,
  pub imports: Vec<Import>,
}

impl GoHeader {
  pub fn imports_c(&self) -> bool {
    self.imports.iter().any(|import| import.path == "C")
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  Ident(String),
  Str(String),
  Punct(char),
  Eof,
}

impl Token {
  fn describe(&self) -> String {
    match self {
      Token::Ident(name) => format!("'{}'", name),
      Token::Str(value) => format!("{:?}", value),
      Token::Punct(c) => format!("'{}'", c),
      Token::Eof => "end of file".to_string(),
    }
  }
}

struct Lexer<'a> {
  src: &'a str,
  pos: usize,
}

impl<'a> Lexer<'a> {
  fn new(src: &'a str) -> Self {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    Self { src, pos: 0 }
  }

  fn rest(&self) -> &'a str {
    &self.src[self.pos..]
  }

  /// Next token together with the comment group attached to it.
  fn next(&mut self) -> Result<(Token, Vec<String>), HeaderError> {
    let doc = self.skip_trivia()?;
    let rest = self.rest();
    let Some(c) = rest.chars().next() else {
      return Ok((Token::Eof, doc));
    };

    let token = match c {
      '"' => self.interpreted_string()?,
      '`' => {
        let end = rest[1..].find('`').ok_or(HeaderError::UnterminatedString)?;
        self.pos += end + 2;
        Token::Str(rest[1..end + 1].to_string())
      }
      c if c.is_alphabetic() || c == '_' => {
        let len = rest
          .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
          .unwrap_or(rest.len());
        self.pos += len;
        Token::Ident(rest[..len].to_string())
      }
      c => {
        self.pos += c.len_utf8();
        Token::Punct(c)
      }
    };
    Ok((token, doc))
  }

  /// Skip whitespace and comments. Returns the last comment group if no
  /// blank line separates it from the next token.
  fn skip_trivia(&mut self) -> Result<Vec<String>, HeaderError> {
    let mut group: Vec<String> = Vec::new();
    let mut newlines = 0;

    loop {
      let rest = self.rest();
      if let Some(comment) = rest.strip_prefix("//") {
        if newlines > 1 {
          group.clear();
        }
        let len = comment.find('\n').unwrap_or(comment.len());
        group.push(comment[..len].trim_end_matches('\r').to_string());
        self.pos += 2 + len;
        newlines = 0;
      } else if let Some(comment) = rest.strip_prefix("/*") {
        if newlines > 1 {
          group.clear();
        }
        let end = comment.find("*/").ok_or(HeaderError::UnterminatedComment)?;
        group.extend(comment[..end].lines().map(str::to_string));
        self.pos += 2 + end + 2;
        newlines = 0;
      } else {
        match rest.chars().next() {
          Some(c) if c.is_whitespace() => {
            if c == '\n' {
              newlines += 1;
            }
            self.pos += c.len_utf8();
          }
          _ => break,
        }
      }
    }

    if newlines > 1 {
      group.clear();
    }
    Ok(group)
  }

  fn interpreted_string(&mut self) -> Result<Token, HeaderError> {
    let mut value = String::new();
    let mut chars = self.rest().char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
      match c {
        '"' => {
          self.pos += i + 1;
          return Ok(Token::Str(value));
        }
        '\n' => break,
        '\\' => match chars.next() {
          Some((_, 'n')) => value.push('\n'),
          Some((_, 't')) => value.push('\t'),
          Some((_, escaped)) => value.push(escaped),
          None => break,
        },
        c => value.push(c),
      }
    }
    Err(HeaderError::UnterminatedString)
  }
}

/// Read the package name and imports of a Go source file.
pub fn read_go_header(src: &str) -> Result<GoHeader, HeaderError> {
  let mut lexer = Lexer::new(src);

  expect_keyword(&mut lexer, "package")?;
  let package = match lexer.next()?.0 {
    Token::Ident(name) => name,
    other => {
      return Err(HeaderError::Expected {
        expected: "package name",
        found: other.describe(),
      });
    }
  };

  let mut imports = Vec::new();
  loop {
    let (token, decl_doc) = lexer.next()?;
    match token {
      Token::Punct(';') => continue,
      Token::Ident(ref keyword) if keyword == "import" => {}
      _ => break,
    }

    let (token, doc) = lexer.next()?;
    if token != Token::Punct('(') {
      let doc = if doc.is_empty() { decl_doc } else { doc };
      imports.push(import_entry(&mut lexer, token, doc)?);
      continue;
    }

    let mut group = Vec::new();
    loop {
      let (token, doc) = lexer.next()?;
      match token {
        Token::Punct(')') => break,
        Token::Punct(';') => continue,
        token => group.push(import_entry(&mut lexer, token, doc)?),
      }
    }
    if group.len() == 1 && group[0].doc.is_empty() {
      group[0].doc = decl_doc;
    }
    imports.extend(group);
  }

  Ok(GoHeader { package, imports })
}

fn expect_keyword(lexer: &mut Lexer<'_>, keyword: &'static str) -> Result<(), HeaderError> {
  match lexer.next()?.0 {
    Token::Ident(ref name) if name == keyword => Ok(()),
    other => Err(HeaderError::Expected {
      expected: keyword,
      found: other.describe(),
    }),
  }
}

/// `["name" | "." | "_"] "path"`, starting from an already-read token.
fn import_entry(lexer: &mut Lexer<'_>, first: Token, doc: Vec<String>) -> Result<Import, HeaderError> {
  let token = match first {
    Token::Ident(_) | Token::Punct('.') => lexer.next()?.0,
    token => token,
  };
  match token {
    Token::Str(path) => Ok(Import { path, doc }),
    other => Err(HeaderError::Expected {
      expected: "import path",
      found: other.describe(),
    }),
  }
}
