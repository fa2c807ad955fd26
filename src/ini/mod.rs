//! INI document model and codecs.
//!
//! This module provides:
//! - The in-memory `Document` of sections and keys (`document`)
//! - The text codec that reads and writes `[section]` / `key = value` (`text`)
//! - Typed value conversion through the `IniValue` trait (`value`)

pub mod document;
pub mod text;
pub mod value;

pub use document::{Document, SearchHit, Section};
pub use text::{parse, serialize};
pub use value::IniValue;
