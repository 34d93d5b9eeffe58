//! Shared types, error model, and configuration for figforge.
//!
//! This crate is the foundation depended on by all other figforge crates.
//! It provides:
//! - [`FigforgeError`] — the unified error type
//! - [`ImageAttachment`] — binary reference images for model calls
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GeminiConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_api_key,
};
pub use error::{FigforgeError, Result};
pub use types::ImageAttachment;
