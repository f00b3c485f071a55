//! CLI module for the election API
//!
//! Provides the `serve` subcommand that runs the HTTP server.

pub mod serve;

use clap::{Parser, Subcommand};

/// Election management API - user administration and authentication
#[derive(Parser)]
#[command(name = "election-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
