//! CLI module - Command-line interface for showscout

mod report;

use clap::Parser;
use std::path::PathBuf;

pub use report::print_summary;

/// showscout - TV episode gap finder
/// Compares a local show library against a search feed and lists what is missing
#[derive(Debug, Parser)]
#[command(name = "showscout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file (default: search showscout.toml and the
    /// user config directories)
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_argument() {
        let cli = Cli::try_parse_from(["showscout", "/etc/showscout.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/showscout.toml")));

        let cli = Cli::try_parse_from(["showscout"]).unwrap();
        assert!(cli.config.is_none());

        assert!(Cli::try_parse_from(["showscout", "a.toml", "b.toml"]).is_err());
    }
}
