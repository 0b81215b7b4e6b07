//! Command-line tooling for owners and relayers

pub mod commands;

pub use commands::*;
