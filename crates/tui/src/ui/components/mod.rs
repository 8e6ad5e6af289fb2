//! UI components: parameter table, add dialog, activity log.

pub mod activity;
pub mod common;
pub mod component;
pub mod parameters;

pub use activity::ActivityComponent;
pub use parameters::{ParameterDialogComponent, ParameterTableComponent};
