//! Tooling & Integration Layer
//!
//! Command-line access to a snapshot-backed store through the same session
//! the embedded file manager uses.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
