//! CLI subcommand implementations.

pub mod class;
pub mod input;
pub mod summary;
