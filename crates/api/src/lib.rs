//! TaaS API client utilities.
//!
//! This crate provides a lightweight client for the testing-as-a-service API
//! and the platform API it integrates with. It focuses on:
//!
//! - Resolving base URLs, credentials and feature flags ([`TaasConfig`])
//! - Constructing an HTTP client with sensible defaults ([`TaasClient`])
//! - A [`Transport`] seam so command handlers can be exercised without a network
//! - Typed endpoints over that transport ([`TaasApi`])
//! - Streaming live log output ([`LogStreamer`])
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use taas_api::{TaasApi, TaasClient, TaasConfig};
//!
//! async fn print_tests() -> anyhow::Result<()> {
//!     let config = TaasConfig::load()?;
//!     let api = TaasApi::new(Arc::new(TaasClient::new(&config)?));
//!     for test in api.list_tests().await? {
//!         println!("{}", test.test_name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod path;
pub mod resources;

pub use client::{ApiRequest, LogStreamer, Service, TaasClient, Transport};
pub use config::{ConfigFile, TaasConfig};
pub use error::{ApiError, ConfigError, StreamError, describe_body};
pub use path::build_path;
pub use resources::{HookKind, TaasApi};
pub use reqwest::Method;
