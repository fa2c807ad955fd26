//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::config::StoreOptions;
use crate::errors::Result;
use crate::store::{Encryption, IniStore};

/// inivault CLI: inspect and edit a crash-safe INI store.
#[derive(Parser)]
#[command(
    name = "inivault",
    about = "Crash-safe, optionally encrypted INI settings store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store file to open (created if missing)
    #[arg(short, long, default_value = "settings.ini", global = true)]
    pub file: PathBuf,

    /// TOML file with store options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Encrypt with this passphrase
    #[arg(long, env = "INIVAULT_PASSPHRASE", hide_env_values = true, global = true)]
    pub passphrase: Option<String>,

    /// Encrypt with a key bound to this user and machine
    #[arg(long, global = true, conflicts_with = "passphrase")]
    pub machine_key: bool,

    /// Do not write or verify the checksum trailer
    #[arg(long, global = true)]
    pub no_checksum: bool,

    /// Do not keep a .backup copy on save
    #[arg(long, global = true)]
    pub no_backup: bool,

    /// Log load/save steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// List all sections
    Sections,

    /// List the keys of a section
    Keys {
        /// Section name
        section: String,
    },

    /// Print a value
    Get {
        /// Section name
        section: String,
        /// Key name
        key: String,
        /// Printed (and not stored) when the key is missing
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Set a value (add or update)
    Set {
        /// Section name
        section: String,
        /// Key name
        key: String,
        /// Value (single line)
        value: String,
    },

    /// Remove a key, or a whole section when no key is given
    Delete {
        /// Section name
        section: String,
        /// Key name
        key: Option<String>,
    },

    /// Rename a section
    RenameSection {
        from: String,
        to: String,
    },

    /// Rename a key within a section
    RenameKey {
        section: String,
        from: String,
        to: String,
    },

    /// Show a section as a table
    Dump {
        /// Section name
        section: String,
    },

    /// Find keys or values containing a substring
    Search {
        /// Text to look for
        needle: String,
        /// Case-insensitive match
        #[arg(short, long)]
        ignore_case: bool,
    },

    /// Print the whole store as plain INI text
    Export,

    /// Print the passphrase needed to open this store elsewhere
    ExportPassphrase,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Build store options from `--config` and the command-line overrides.
///
/// Mutating commands save exactly once, explicitly, so autosave and
/// save-on-dispose are off.  One commit per command keeps `.backup` at
/// the version before that command.
pub fn store_options(cli: &Cli) -> Result<StoreOptions> {
    let mut options = match &cli.config {
        Some(path) => StoreOptions::load(path)?,
        None => StoreOptions::default(),
    };
    if cli.no_checksum {
        options.checksum = false;
    }
    if cli.no_backup {
        options.autobackup = false;
    }
    options.autosave = false;
    options.save_on_dispose = false;
    Ok(options)
}

/// The encryption mode selected on the command line.
pub fn encryption(cli: &Cli) -> Encryption {
    match (&cli.passphrase, cli.machine_key) {
        (Some(passphrase), _) if !passphrase.is_empty() => {
            Encryption::Passphrase(passphrase.clone())
        }
        (_, true) => Encryption::machine(),
        _ => Encryption::None,
    }
}

/// Open the store named by the CLI arguments.
///
/// Recovered load failures are shown as warnings.
pub fn open_store(cli: &Cli) -> Result<IniStore> {
    IniStore::builder(&cli.file)
        .options(store_options(cli)?)
        .encryption(encryption(cli))
        .on_error(|e| output::warning(&e.to_string()))
        .open()
}
