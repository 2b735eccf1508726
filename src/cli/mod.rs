pub mod commands;

use clap::Parser;
pub use commands::*;

#[derive(Parser, Debug)]
#[command(name = "edge-ping")]
#[command(about = "Measure TCP connect latency to every regional and provider-level endpoint")]
#[command(
    long_about = "Resolves each endpoint derived from the region listing and times a bare TCP connect to port 443.\n• Provider-level endpoints are reported as \"optimized\"\n• Region-specific endpoints are reported as \"direct\"\n• Failed or timed out endpoints are listed last"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}
