//! Shared utilities.
//!
//! Path helpers for logical import paths and test helpers.

pub mod path;

#[cfg(test)]
pub mod testutil;
