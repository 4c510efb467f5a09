//! CLI argument definitions for countryscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | Filtered, sorted country list |
//! | `show` | Details of one country |
//! | `explore` | Interactive search/sort session |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--endpoint` | REST Countries `/v3.1/all` | Source URL |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `--retries` | `1` | Automatic retries after a failed fetch |
//! | `--fixture` | unset | Serve a local JSON file instead of the network |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! countryscope list --search ch --sort population --order desc
//! countryscope show Chad
//! countryscope --format json --pretty list
//! countryscope --fixture countries.json explore
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use countryscope_core::{SortField, SortOrder};

/// 🌍 countryscope - explore the countries of the world from your terminal
#[derive(Debug, Parser)]
#[command(
    name = "countryscope",
    author,
    version,
    about = "Search, sort and inspect country data from the REST Countries API",
    long_about = "countryscope fetches the REST Countries dataset once per cache window and lets \
you filter it by name and sort it by name or population.\n\
\n\
Use 'countryscope <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Countries endpoint, including the `fields` query.
    #[arg(long, global = true, env = "COUNTRYSCOPE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long, global = true, env = "COUNTRYSCOPE_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Automatic retries after a failed fetch (0 disables retrying).
    #[arg(long, global = true, default_value_t = 1)]
    pub retries: u32,

    /// Read the response body from a local JSON file instead of the network.
    #[arg(long, global = true, env = "COUNTRYSCOPE_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Enable debug logging on stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminal display.
    Table,
    /// JSON document.
    Json,
}

/// Sort key selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortFieldArg {
    Name,
    Population,
}

impl From<SortFieldArg> for SortField {
    fn from(value: SortFieldArg) -> Self {
        match value {
            SortFieldArg::Name => SortField::Name,
            SortFieldArg::Population => SortField::Population,
        }
    }
}

/// Sort direction selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(value: SortOrderArg) -> Self {
        match value {
            SortOrderArg::Asc => SortOrder::Ascending,
            SortOrderArg::Desc => SortOrder::Descending,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 📋 List countries, optionally filtered and sorted.
    ///
    /// # Examples
    ///
    ///   countryscope list
    ///   countryscope list --search land --sort population --order desc
    List(ListArgs),

    /// 🔍 Show details of one country.
    ///
    /// Matches the common or official name, case-insensitively.
    ///
    /// # Examples
    ///
    ///   countryscope show chad
    ///   countryscope show "Republic of Chad" --format json
    Show(ShowArgs),

    /// 🧭 Interactive session: search, sort and open countries.
    ///
    /// Reads commands from stdin; type 'help' for the list.
    Explore,
}

/// Arguments for the `list` command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive substring of the country name.
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Sort key.
    #[arg(long, value_enum, default_value_t = SortFieldArg::Name)]
    pub sort: SortFieldArg,

    /// Sort direction.
    #[arg(long, value_enum, default_value_t = SortOrderArg::Asc)]
    pub order: SortOrderArg,
}

/// Arguments for the `show` command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Country name (common or official).
    pub name: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_defaults_to_name_ascending() {
        let cli = Cli::try_parse_from(["countryscope", "list"]).expect("parses");
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.search, "");
        assert_eq!(SortField::from(args.sort), SortField::Name);
        assert_eq!(SortOrder::from(args.order), SortOrder::Ascending);
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn global_options_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "countryscope",
            "list",
            "--sort",
            "population",
            "--order",
            "desc",
            "--format",
            "json",
            "--retries",
            "0",
        ])
        .expect("parses");

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.retries, 0);
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(SortField::from(args.sort), SortField::Population);
        assert_eq!(SortOrder::from(args.order), SortOrder::Descending);
    }
}
