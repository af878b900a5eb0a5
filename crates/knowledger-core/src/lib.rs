//! # knowledger-core
//!
//! Core types, traits, and abstractions for the knowledger library.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other knowledger crates depend on: the domain models (tenants, ibits,
//! the three tag vocabularies), the error taxonomy, and the repository and
//! inference traits the storage and pipeline crates implement.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use uuid_utils::new_v7;
