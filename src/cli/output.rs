//! Terminal output for the CLI.
//!
//! Data a script might consume (values, section names, exported text)
//! goes to stdout unstyled from the commands themselves.  Status lines go
//! through the helpers below: confirmations and hints on stdout, problems
//! on stderr.

use std::fmt::Display;

use comfy_table::{ContentArrangement, Table};
use console::{style, StyledObject};

use crate::ini::{SearchHit, Section};

fn line(marker: StyledObject<&str>, msg: impl Display) -> String {
    format!("{marker} {msg}")
}

pub fn success(msg: &str) {
    println!("{}", line(style("\u{2713}").green().bold(), msg));
}

/// Fatal command errors.
pub fn error(msg: &str) {
    eprintln!("{}", line(style("\u{2717}").red().bold(), msg));
}

/// Recovered load failures (backup used, unreadable file skipped).
pub fn warning(msg: &str) {
    eprintln!("{}", line(style("!").yellow().bold(), msg));
}

pub fn info(msg: &str) {
    println!("{}", line(style("i").blue().bold(), msg));
}

/// Dimmed follow-up hint.
pub fn tip(msg: &str) {
    println!("{}", line(style("\u{2192}").dim(), style(msg).dim()));
}

/// Print one section as a Key/Value table.
pub fn print_section_table(name: &str, section: &Section) {
    if section.is_empty() {
        info(&format!("[{name}] has no keys."));
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Value"]);

    for (key, value) in section {
        table.add_row(vec![key.clone(), value.clone()]);
    }

    println!("{table}");
}

/// Print search hits as a Section/Key/Value table.
pub fn print_search_table(hits: &[SearchHit]) {
    if hits.is_empty() {
        info("No matches.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Section", "Key", "Value"]);

    for hit in hits {
        table.add_row(vec![hit.section.clone(), hit.key.clone(), hit.value.clone()]);
    }

    println!("{table}");
}
