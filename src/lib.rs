pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod ini;
pub mod persist;
pub mod store;

pub use config::StoreOptions;
pub use errors::{FailureClass, Result, StoreError};
pub use ini::{Document, IniValue, SearchHit, Section};
pub use persist::LoadSource;
pub use store::{Encryption, IniStore, StoreBuilder};
