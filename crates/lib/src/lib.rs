//! gobuild-lib: Go build primitives for a content-addressed build system
//!
//! This crate provides what a hermetic Go build needs at build time:
//! - `package`: walks a source tree and describes every Go package in it
//! - `action`: the compile/link action descriptions handed to each build step
//! - `execute`: runs one action by driving the Go toolchain's `tool` subcommands

pub mod action;
pub mod consts;
pub mod execute;
pub mod package;
pub mod platform;
pub mod util;
