//! Command-line interface for the hlf-provision toolkit.

pub mod cli;

pub use cli::run;
