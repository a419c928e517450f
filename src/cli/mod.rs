//! Command-line interface module
//!
//! Implements all CLI commands using clap:
//! - export: Query commits and write (and optionally upload) the CSV
//! - config init: Write a default configuration file
//! - show latest: Print the most recent CSV export

pub mod config;
pub mod export;
pub mod show;
