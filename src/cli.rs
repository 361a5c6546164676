//! Command-line argument parsing for the `analyst` binary.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use sql_analyst::config::Config;

/// Validate, run and chart LLM-authored SQL against Postgres.
#[derive(Parser, Debug)]
#[command(name = "analyst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// PostgreSQL connection string (overrides config file and DATABASE_URL)
    #[arg(long, value_name = "URL", global = true)]
    pub database_url: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH", env = "ANALYST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check whether a query would be accepted, without running it
    Validate {
        /// SQL text, or "-" to read from stdin
        sql: String,
    },

    /// Run a query and print the tool response as JSON
    Run {
        /// SQL text, or "-" to read from stdin
        sql: String,

        /// Pretty-print the JSON response
        #[arg(long)]
        pretty: bool,

        /// Print insights as prose with an embedded chart block instead of JSON
        #[arg(long)]
        narrative: bool,
    },

    /// Extract embedded chart blocks from text and print them as JSON
    Extract {
        /// Input file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path (from CLI or default).
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

/// Reads an argument that may be "-" for stdin.
pub fn read_input(arg: &str) -> std::io::Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(arg.to_string())
    }
}
