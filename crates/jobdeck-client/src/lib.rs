//! # jobdeck-client
//!
//! HTTP client for the remote job listing API.
//!
//! ## Example
//!
//! ```ignore
//! use jobdeck_client::{ClientConfig, HttpJobApi};
//! use jobdeck_core::JobApi;
//!
//! let api = HttpJobApi::new(ClientConfig::from_env())?;
//! let items = api.search("react").await?;
//! let detail = api.job_item(items[0].id).await?;
//! ```

pub mod config;
pub mod http;

pub use config::{ClientConfig, ConfigError, ConfigResult};
pub use http::HttpJobApi;
