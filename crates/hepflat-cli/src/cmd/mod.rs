//! Subcommand implementations.

pub mod convert;
pub mod merge;
pub mod prune;
pub mod split;
