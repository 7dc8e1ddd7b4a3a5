//! Configuration for iconsmith
//!
//! Provides types, discovery and loading for `iconsmith.toml`.

pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, ConfigError};
pub use schema::*;
