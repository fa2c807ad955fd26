//! `inivault rename-section` / `inivault rename-key`.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `rename-section` command.
pub fn execute_section(cli: &Cli, from: &str, to: &str) -> Result<()> {
    let store = open_store(cli)?;
    store.rename_section(from, to)?;
    store.save()?;
    output::success(&format!("Renamed [{from}] to [{to}]"));
    Ok(())
}

/// Execute the `rename-key` command.
pub fn execute_key(cli: &Cli, section: &str, from: &str, to: &str) -> Result<()> {
    let store = open_store(cli)?;
    store.rename_key(section, from, to)?;
    store.save()?;
    output::success(&format!("Renamed [{section}] {from} to {to}"));
    Ok(())
}
