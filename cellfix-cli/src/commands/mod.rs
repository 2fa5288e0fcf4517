//! CLI subcommands.

pub mod common;
pub mod config;
pub mod locate;
pub mod lookup;
pub mod store;
