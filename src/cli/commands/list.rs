//! `inivault sections`: list every section.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `sections` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    let sections = store.sections()?;

    if sections.is_empty() {
        output::info(&format!("{} has no sections yet.", cli.file.display()));
        output::tip("Run `inivault set <SECTION> <KEY> <VALUE>` to add one.");
        return Ok(());
    }

    for name in sections {
        println!("{name}");
    }
    Ok(())
}
