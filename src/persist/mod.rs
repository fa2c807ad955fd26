//! Persistence engine: framing, atomic writes and backup fallback.
//!
//! This module provides:
//! - The on-disk byte layout with header, encryption and checksum (`format`)
//! - Temp-file staging and atomic replace with backup capture (`atomic`)
//! - The save/load protocol with failure routing (`engine`)

pub mod atomic;
pub mod engine;
pub mod format;

pub use atomic::{backup_path, temp_path};
pub use engine::{Engine, ErrorHandler, LoadSource, Loaded};
pub use format::Framing;
