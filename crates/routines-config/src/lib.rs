//! Configuration for the routines client.
//!
//! TOML-based configuration with:
//! - Config file layering (user config + project-local overrides)
//! - Environment overrides through a swappable lookup
//! - Defaults filled in by accessors, so partial files stay partial

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    config_dir, load_config, load_config_file, load_config_with_options, user_config_path,
    ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use types::*;
