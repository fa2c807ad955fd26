//! `inivault dump`: show one section as a table.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{Result, StoreError};

/// Execute the `dump` command.
pub fn execute(cli: &Cli, section: &str) -> Result<()> {
    let store = open_store(cli)?;
    let table = store
        .section(section)?
        .ok_or_else(|| StoreError::SectionNotFound(section.to_string()))?;

    output::print_section_table(section, &table);
    Ok(())
}
