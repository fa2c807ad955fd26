//! `inivault export` / `inivault export-passphrase`.

use std::io::{self, Write};

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::ini;

/// Execute the `export` command: the decrypted contents as INI text.
pub fn execute(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    let text = store.read(ini::serialize)?;
    io::stdout().write_all(&text)?;
    Ok(())
}

/// Execute the `export-passphrase` command.
pub fn execute_passphrase(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    match store.export_passphrase()? {
        Some(passphrase) => println!("{passphrase}"),
        None => output::info("This store is not encrypted."),
    }
    Ok(())
}
