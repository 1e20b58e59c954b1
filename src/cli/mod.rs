//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stockroom - inventory backend with token auth and role-gated catalog mutation
#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file; skips the default search path
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Write a default config file if none exists
    Init,
}

impl Cli {
    #[must_use]
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_default() {
        let cli = Cli::parse_from(["stockroom"]);
        assert_eq!(cli.resolved_command(), Commands::Serve);
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["stockroom", "init", "--config", "/tmp/s.toml"]);
        assert_eq!(cli.resolved_command(), Commands::Init);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        <Cli as CommandFactory>::command().debug_assert();
    }
}
