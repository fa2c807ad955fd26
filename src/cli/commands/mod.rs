//! One module per subcommand.

pub mod delete;
pub mod dump;
pub mod export;
pub mod get;
pub mod keys;
pub mod list;
pub mod rename;
pub mod search;
pub mod set;
