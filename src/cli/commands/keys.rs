//! `inivault keys`: list the keys of one section.

use crate::cli::{open_store, Cli};
use crate::errors::{Result, StoreError};

/// Execute the `keys` command.
pub fn execute(cli: &Cli, section: &str) -> Result<()> {
    let store = open_store(cli)?;
    if !store.has_section(section)? {
        return Err(StoreError::SectionNotFound(section.to_string()));
    }

    for key in store.keys(section)? {
        println!("{key}");
    }
    Ok(())
}
