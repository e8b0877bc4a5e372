//! # randtoken-core
//!
//! Configuration types shared across the randtoken crates.
//!
//! Configuration is loaded from a single YAML file (`randtoken.yaml` by
//! default). Every field has a default, so an absent file or an empty
//! document yields a usable configuration.

pub mod config;

pub use config::{
    ConfigError, DisplayConfig, RandtokenConfig, StorageConfig, TokenPolicy,
    DEFAULT_CONFIG_FILE,
};
