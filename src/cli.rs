//! Command line arguments

use clap::Parser;
use std::path::PathBuf;

/// AI travel planner web server
#[derive(Debug, Parser)]
#[command(name = "travelai", version, about = "AI-powered travel planner web server")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["travelai", "--config", "plan.toml", "-p", "9000", "--verbose"]);
        assert_eq!(cli.config, Some(PathBuf::from("plan.toml")));
        assert_eq!(cli.port, Some(9000));
        assert!(cli.verbose);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["travelai"]);
        assert!(cli.config.is_none());
        assert!(cli.port.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_port_must_be_numeric() {
        assert!(Cli::try_parse_from(["travelai", "--port", "web"]).is_err());
    }
}
