//! `inivault delete`: remove a key or a whole section.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{Result, StoreError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, section: &str, key: Option<&str>) -> Result<()> {
    let store = open_store(cli)?;

    match key {
        Some(key) => {
            if !store.remove_key(section, key)? {
                return Err(StoreError::KeyNotFound {
                    section: section.to_string(),
                    key: key.to_string(),
                });
            }
            store.save()?;
            output::success(&format!("Deleted [{section}] {key}"));
        }
        None => {
            if !store.remove_section(section)? {
                return Err(StoreError::SectionNotFound(section.to_string()));
            }
            store.save()?;
            output::success(&format!("Deleted section [{section}]"));
        }
    }

    Ok(())
}
