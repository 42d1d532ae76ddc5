//! Common test utilities for extsync-engine
//!
//! - Record and configuration builders
//! - In-memory inventory, registry and progress mocks
//! - Package archive fixtures and wiremock endpoints

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod fixtures;
pub mod mock_server;
pub mod mocks;

pub use builders::*;
pub use fixtures::*;
pub use mock_server::*;
pub use mocks::*;
