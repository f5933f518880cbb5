//! Subcommand implementations.

pub mod entry;
pub mod keys;
pub mod theme;
pub mod vault;
