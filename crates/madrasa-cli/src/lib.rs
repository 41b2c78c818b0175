//! Madrasa attendance CLI library.
//!
//! This crate provides the CLI interface for attendance reconciliation.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, WindowArgs};
pub use config::Config;
