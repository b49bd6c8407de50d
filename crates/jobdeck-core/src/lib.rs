//! # jobdeck-core
//!
//! Core types, traits, and abstractions for the jobdeck job-search data layer.
//!
//! This crate provides the data model shared by the HTTP client and the
//! reactive state crate, the error taxonomy, and the collaborator traits
//! through which the state layer reaches the outside world.

pub mod defaults;
pub mod error;
pub mod logging;
#[cfg(feature = "mock")]
pub mod mock;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, FetchError, Result};
pub use models::*;
pub use traits::*;
