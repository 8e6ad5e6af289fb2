//! Timestamped notices shown under the table.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use paramdeck_types::Severity;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

const MAX_ENTRIES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub at: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

/// Bounded history of notices, newest last.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        if self.entries.len() == MAX_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry {
            at: Local::now(),
            severity,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Default)]
pub struct ActivityComponent;

impl Component for ActivityComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = app.theme.as_ref();
        let block = th::block(theme, Some("Activity"), false);
        let visible = usize::from(block.inner(rect).height);
        let items: Vec<ListItem> = app
            .activity
            .entries()
            .rev()
            .take(visible)
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(entry.at.format("%H:%M:%S ").to_string(), theme.text_muted_style()),
                    Span::styled(entry.message.clone(), theme.severity_style(entry.severity)),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded_and_keeps_newest() {
        let mut log = ActivityLog::default();
        for index in 0..(MAX_ENTRIES + 5) {
            log.push(Severity::Info, format!("entry {index}"));
        }
        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.entries().next().map(|entry| entry.message.as_str()), Some("entry 5"));
        assert_eq!(
            log.latest().map(|entry| entry.message.clone()),
            Some(format!("entry {}", MAX_ENTRIES + 4))
        );
    }
}
