//! `inivault search`: substring search over keys and values.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `search` command.
pub fn execute(cli: &Cli, needle: &str, ignore_case: bool) -> Result<()> {
    let store = open_store(cli)?;
    let hits = store.search(needle, ignore_case)?;
    output::print_search_table(&hits);
    Ok(())
}
