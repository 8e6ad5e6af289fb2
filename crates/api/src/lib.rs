//! Remote model service access.
//!
//! The parameter panel never owns parameter state; it talks to an external
//! model/execution service that interprets command text and reports the
//! authoritative parameter list. This crate defines that seam:
//!
//! - [`ModelService`]: the async trait every consumer depends on
//! - [`ModelClient`]: an HTTP implementation configured from the environment
//! - [`ServiceConfig`]: base URL, token and timeout resolution
//!
//! # Example
//!
//! ```ignore
//! use paramdeck_api::{ModelClient, ModelService, ServiceConfig};
//!
//! async fn run() -> anyhow::Result<()> {
//!     let client = ModelClient::new(ServiceConfig::from_env()?)?;
//!     client.issue_command("top.driver.clear_parameters();").await?;
//!     Ok(())
//! }
//! ```

use paramdeck_types::{ComponentDetail, ComponentRef, Parameter};
use thiserror::Error;

mod client;

pub use client::{ModelClient, ServiceConfig, DEFAULT_API_BASE};

/// Errors surfaced by a [`ModelService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error("could not decode response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Unavailable(String),
}

/// The remote model/execution service.
///
/// All calls are asynchronous. `issue_command` reports only transport
/// success; the effect of a command is observed through a later
/// `fetch_parameters` snapshot.
#[async_trait::async_trait]
pub trait ModelService: Send + Sync {
    /// Submit one command for the remote interpreter.
    async fn issue_command(&self, command: &str) -> Result<(), ServiceError>;

    /// Ordered component listing of the workflow owned by `path`.
    async fn get_workflow(&self, path: &str) -> Result<Vec<ComponentRef>, ServiceError>;

    /// Declared interface of the component at `path`.
    async fn get_component(&self, path: &str) -> Result<ComponentDetail, ServiceError>;

    /// Current parameter rows of `entity`.
    ///
    /// `Ok(None)` means the service answered without a usable row list.
    async fn fetch_parameters(&self, entity: &str) -> Result<Option<Vec<Parameter>>, ServiceError>;
}
