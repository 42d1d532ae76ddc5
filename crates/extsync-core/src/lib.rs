//! # extsync-core
//!
//! Core library for extsync providing:
//! - Extension record types shared by the engine and the CLI
//! - Hierarchical configuration loading (embedded defaults, user file, env)
//! - Error types for configuration and record parsing

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::{ExtensionRecord, SyncConfig};
pub use utils::get_home_dir;
