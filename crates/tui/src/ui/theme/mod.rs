//! Theme styling for the panel.
//!
//! Components style themselves through the semantic [`Theme`] roles and the
//! helpers in [`theme_helpers`] rather than hard-coding colors.

pub mod dracula;
pub mod roles;
pub mod theme_helpers;

pub use dracula::DraculaTheme;
pub use roles::Theme;

/// The panel ships a single dark palette.
pub fn load() -> Box<dyn Theme> {
    Box::new(DraculaTheme::new())
}
