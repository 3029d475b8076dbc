//! Subcommand implementations

pub mod emissions;
pub mod regions;
pub mod schedule;
pub mod suggest;
