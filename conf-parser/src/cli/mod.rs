use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

pub use commands::{load_store, persist_store};

/// Command-line arguments for the conf line editor.
///
/// Every command works on a single file given with `--config`. Passing `-`
/// reads the file from stdin; edits made to stdin input are always printed to
/// stdout since there is nothing to save them to.
#[derive(Parser, Debug)]
#[command(name = "conf-edit")]
#[command(about = "Read and edit key = value config files without losing comments or layout")]
#[command(version)]
pub struct Args {
    /// Config file to operate on (`-` for stdin)
    #[arg(short, long)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available operations on a config file.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value of an active key
    Get {
        /// Key to look up
        key: String,

        /// Also consider commented-out lines
        #[arg(long)]
        include_commented: bool,

        /// Value to print if the key is missing
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Print whether the first line for a key is commented out
    IsCommented {
        /// Key to check
        key: String,
    },

    /// List active entries in file order
    List {
        /// Include commented-out entries (prefixed with `#`)
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set a key, appending it if it does not exist
    Set {
        /// Key to set
        key: String,

        /// New value
        value: String,

        /// Output to stdout instead of modifying file
        #[arg(long)]
        stdout: bool,
    },

    /// Comment out the first active line for a key
    Comment {
        /// Key to comment out
        key: String,

        /// Output to stdout instead of modifying file
        #[arg(long)]
        stdout: bool,
    },

    /// Re-activate the first commented line for a key
    Uncomment {
        /// Key to uncomment
        key: String,

        /// Output to stdout instead of modifying file
        #[arg(long)]
        stdout: bool,
    },

    /// Print the file exactly as loaded
    Cat,
}

/// Output format options for `list`.
///
/// # Formats
/// - `Text` - One `key = value` line per entry
/// - `Json` - Compact JSON
/// - `JsonPretty` - Pretty-printed JSON with indentation
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

pub fn execute(args: Args) -> Result<()> {
    use Command::*;

    let path = args.config;
    match args.command {
        Get {
            key,
            include_commented,
            default,
        } => commands::execute_get(&path, &key, include_commented, default),
        IsCommented { key } => commands::execute_is_commented(&path, &key),
        List { all, format } => commands::execute_list(&path, all, format),
        Set { key, value, stdout } => commands::execute_set(&path, &key, &value, stdout),
        Comment { key, stdout } => commands::execute_comment(&path, &key, stdout),
        Uncomment { key, stdout } => commands::execute_uncomment(&path, &key, stdout),
        Cat => commands::execute_cat(&path),
    }
}
