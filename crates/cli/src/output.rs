//! Terminal output shared by both binaries.
//!
//! Diagnostics go to stderr; stdout is never written.

use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;

pub mod symbols {
  pub const ERROR: &str = "✗";
}

/// Install the `RUST_LOG`-driven subscriber, writing to stderr.
pub fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

pub fn print_error(error: &anyhow::Error) {
  let message = format!("{:#}", error);
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}
