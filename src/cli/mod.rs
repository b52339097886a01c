//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "smartsearch",
    version,
    author = "neur0map",
    about = "Natural-language query interpreter and result ranker for chat search",
    long_about = "Smartsearch turns free-text queries such as \"files from alice last week\" into \
                  a structured filter plus a cleaned full-text query, then ranks and highlights \
                  matching results from a search provider."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/smartsearch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interpret a query and print the extracted filter
    Parse {
        /// Query text
        query: String,

        /// Show output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run a query against a JSON file of results
    Search {
        /// Query text
        query: String,

        /// JSON array of raw results to search
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Maximum number of results to print
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show recent searches
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration and keyword vocabulary
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
