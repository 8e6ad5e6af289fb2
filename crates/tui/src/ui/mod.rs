//! UI layer: components, the top-level view, theming and the runtime loop.

pub mod components;
pub mod main_component;
pub mod runtime;
pub mod theme;
