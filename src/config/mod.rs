//! Store options, loadable from a TOML file.

pub mod settings;

pub use settings::StoreOptions;
