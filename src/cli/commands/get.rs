//! `inivault get`: print a single value.

use crate::cli::{open_store, Cli};
use crate::errors::{Result, StoreError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, section: &str, key: &str, default: Option<&str>) -> Result<()> {
    let store = open_store(cli)?;

    let value = match (store.get(section, key)?, default) {
        (Some(value), _) => value,
        (None, Some(default)) => default.to_string(),
        (None, None) => {
            return Err(StoreError::KeyNotFound {
                section: section.to_string(),
                key: key.to_string(),
            })
        }
    };

    println!("{value}");
    Ok(())
}
