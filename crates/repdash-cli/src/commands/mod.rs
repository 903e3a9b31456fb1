//! Subcommand implementations.

pub mod auth;
pub mod columns;
pub mod reports;
