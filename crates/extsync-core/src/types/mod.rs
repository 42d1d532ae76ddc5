//! Type definitions for extsync configuration and extension records

mod extension_types;
mod sync_config;

pub use extension_types::*;
pub use sync_config::*;
