//! Line-oriented text codec.
//!
//! ```text
//! [section]
//! key = value
//!
//! [other]
//! ...
//! ```
//!
//! No escaping is performed.  Malformed lines are dropped while parsing
//! and never reported.

use super::document::Document;

/// Serialize a document to its text form.
pub fn serialize(doc: &Document) -> Vec<u8> {
    let mut out = String::new();
    for (name, section) in doc.iter() {
        out.push('[');
        out.push_str(name);
        out.push_str("]\n");
        for (key, value) in section {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
    }
    out.into_bytes()
}

/// Parse text into a document.
///
/// Invalid UTF-8 is decoded lossily; a corrupted line simply fails to
/// match and is dropped like any other malformed line.
pub fn parse(bytes: &[u8]) -> Document {
    let text = String::from_utf8_lossy(bytes);
    let mut doc = Document::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = section_header(line) {
            match name {
                Some(name) => {
                    doc.section_entry(name);
                    current = Some(name.to_string());
                }
                // `[]` or `[   ]`: no usable name, keys that follow have no home.
                None => current = None,
            }
            continue;
        }

        let Some(section) = current.as_deref() else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        doc.set(section, key, value);
    }

    doc
}

/// `Some(Some(name))` for a valid header, `Some(None)` for an empty one,
/// `None` if the line is not a header at all.
fn section_header(line: &str) -> Option<Option<&str>> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let name = inner.trim();
    Some((!name.is_empty()).then_some(name))
}
