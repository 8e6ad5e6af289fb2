//! # Paramdeck TUI
//!
//! Terminal panel for inspecting and editing the parameters attached to a
//! remote optimization model entity.
//!
//! ## Architecture
//!
//! The panel follows the same component layout as the rest of the
//! workspace: state lives in [`app::App`], components translate input into
//! state changes and `Effect`s, and `cmd` turns effects into spawned calls
//! against the [`ModelService`]. Rows are never edited locally; every change
//! is a command sent to the service, and the table re-renders from the
//! snapshots delivered by the parameter feed.

mod app;
mod cmd;
mod controller;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use paramdeck_api::ModelService;

pub use app::PanelConfig;

/// Runs the panel until the user quits.
///
/// # Errors
///
/// Returns an error when the terminal cannot be put into raw mode or the
/// alternate screen, or when drawing a frame fails.
pub async fn run(config: PanelConfig, service: Arc<dyn ModelService>) -> Result<()> {
    ui::runtime::run_app(config, service).await
}
