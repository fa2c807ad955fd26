//! `inivault set`: add or update a value.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `set` command.
pub fn execute(cli: &Cli, section: &str, key: &str, value: &str) -> Result<()> {
    let store = open_store(cli)?;

    let existed = store.has_key(section, key)?;
    store.set(section, key, value)?;
    store.save()?;

    let verb = if existed { "updated" } else { "added" };
    output::success(&format!("[{section}] {key} {verb}"));
    Ok(())
}
