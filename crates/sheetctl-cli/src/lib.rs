//! CLI, configuration, interactive authorization
//!
//! This crate provides the `sheetctl` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
