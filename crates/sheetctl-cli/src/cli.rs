//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use sheetctl_google::ValueInputOption;

/// sheetctl - create, write and read Google Sheets from the terminal
#[derive(Debug, Parser)]
#[command(name = "sheetctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "SHEETCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the OAuth client credentials JSON
    #[arg(long, env = "SHEETCTL_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Path to the stored token
    #[arg(long, env = "SHEETCTL_TOKEN")]
    pub token: Option<PathBuf>,

    /// Request timeout in seconds (default: no timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize access to Google Sheets and store the token
    Auth {
        /// Re-authorize even if a token is already stored
        #[arg(long, short)]
        force: bool,

        /// Also open the authorization URL in a browser
        #[arg(long)]
        open: bool,
    },

    /// Delete the stored token
    Logout,

    /// Create a spreadsheet and print its id
    Create {
        /// Spreadsheet title
        title: String,
    },

    /// Overwrite a range with the given values
    Write {
        spreadsheet_id: String,

        /// A1-notation range, e.g. "Sheet1!A1:D1"
        range: String,

        /// Cell values: cells separated by ',', rows by ';' or newlines
        values: String,

        /// How the API interprets the values
        #[arg(long, value_enum, default_value_t = InputOption::Raw)]
        input_option: InputOption,
    },

    /// Print the values in a range
    Read {
        spreadsheet_id: String,

        /// A1-notation range, e.g. "Class Data!A2:E"
        range: String,

        /// Print a JSON array of rows instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Value input option as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputOption {
    Raw,
    UserEntered,
}

impl From<InputOption> for ValueInputOption {
    fn from(option: InputOption) -> Self {
        match option {
            InputOption::Raw => ValueInputOption::Raw,
            InputOption::UserEntered => ValueInputOption::UserEntered,
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration
    Dump,

    /// Show configuration file path
    Path,
}
