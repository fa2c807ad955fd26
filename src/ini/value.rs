//! Typed conversion between stored strings and Rust values.
//!
//! Each supported type implements [`IniValue`] explicitly.  A value that
//! fails to parse is treated by the store as absent, and the caller's
//! default is returned instead.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

/// A type that can be stored as a single INI value.
pub trait IniValue: Sized {
    /// Parse a stored (already trimmed) string.
    fn from_ini(raw: &str) -> Option<Self>;

    /// Format for storage.  Must not contain line breaks.
    fn to_ini(&self) -> String;
}

impl IniValue for String {
    fn from_ini(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn to_ini(&self) -> String {
        self.clone()
    }
}

impl IniValue for bool {
    fn from_ini(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn to_ini(&self) -> String {
        self.to_string()
    }
}

impl IniValue for char {
    fn from_ini(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn to_ini(&self) -> String {
        self.to_string()
    }
}

impl IniValue for PathBuf {
    fn from_ini(raw: &str) -> Option<Self> {
        Some(PathBuf::from(raw))
    }

    fn to_ini(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

/// RFC 3339, e.g. `2024-05-01T12:00:00+00:00`.
impl IniValue for DateTime<Utc> {
    fn from_ini(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn to_ini(&self) -> String {
        self.to_rfc3339()
    }
}

/// ISO 8601 calendar date, e.g. `2024-05-01`.
impl IniValue for NaiveDate {
    fn from_ini(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    fn to_ini(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

macro_rules! impl_from_str_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IniValue for $ty {
                fn from_ini(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }

                fn to_ini(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_from_str_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
