//! Component system for the parameter panel.
//!
//! Components are self-contained UI elements. They read and mutate the
//! shared [`App`] state in response to input, render themselves into a
//! provided `Rect`, and report side effects back to the runtime as
//! [`Effect`]s instead of performing I/O themselves.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect};

use crate::app::{App, Effect};

/// A UI component with its own local behavior.
///
/// # Component Lifecycle
///
/// 1. **Event Handling**: input arrives through `handle_key_events` and
///    `handle_mouse_events`; the returned effects are executed by the runtime
/// 2. **Rendering**: `render` draws the component and may record hit areas
///    used by later mouse events
pub(crate) trait Component {
    /// Handle a key event while this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle a mouse event routed to this component.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    ///
    /// Implementations should only draw and remember layout; state changes
    /// belong in the event handlers.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}

/// Returns true when the terminal cell lies inside `area`.
pub(crate) fn hit(area: Rect, column: u16, row: u16) -> bool {
    area.contains(ratatui::layout::Position { x: column, y: row })
}
