//! Top-level view: header, table, action bar, activity log and the add
//! dialog overlay. Routes input to whichever part currently owns it.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use super::components::component::{Component, hit};
use super::components::{ActivityComponent, ParameterDialogComponent, ParameterTableComponent};
use super::theme::theme_helpers as th;
use crate::app::{App, Effect, FeedStatus};

const BUTTON_WIDTH: u16 = 11;

/// Clickable actions in the bar under the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelAction {
    Add,
    Clear,
    Refresh,
}

impl PanelAction {
    const ALL: [PanelAction; 3] = [Self::Add, Self::Clear, Self::Refresh];

    fn label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Clear => "Clear",
            Self::Refresh => "Refresh",
        }
    }
}

#[derive(Debug, Default)]
pub struct MainView {
    table_view: ParameterTableComponent,
    dialog_view: ParameterDialogComponent,
    activity_view: ActivityComponent,
    button_areas: Vec<(PanelAction, Rect)>,
}

impl MainView {
    fn trigger(app: &mut App, action: PanelAction) -> Vec<Effect> {
        match action {
            PanelAction::Add => app.controller.request_add(),
            PanelAction::Clear => app.controller.request_clear(),
            PanelAction::Refresh => vec![Effect::RefreshParameters],
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let (status, severity) = match &app.feed_status {
            FeedStatus::Waiting => ("waiting for data".to_string(), paramdeck_types::Severity::Info),
            FeedStatus::Live => (format!("{} parameters", app.table.rows().len()), paramdeck_types::Severity::Success),
            FeedStatus::NoData => ("no parameter data".to_string(), paramdeck_types::Severity::Warning),
            FeedStatus::Unreachable(_) => ("service unreachable".to_string(), paramdeck_types::Severity::Error),
        };
        let mut spans = vec![
            Span::styled(app.config.entity.clone(), theme.accent_emphasis_style()),
            Span::raw("  "),
            Span::styled(status, theme.severity_style(severity)),
        ];
        if let Some(frame_glyph) = app.throbber() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(frame_glyph, theme.text_secondary_style()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_actions(&mut self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let [buttons_area, hints_area] = Layout::horizontal([Constraint::Length(3 * (BUTTON_WIDTH + 1)), Constraint::Fill(1)]).areas(area);
        let button_rects: [Rect; 3] = Layout::horizontal([Constraint::Length(BUTTON_WIDTH); 3])
            .flex(Flex::Start)
            .spacing(1)
            .areas(buttons_area);
        self.button_areas.clear();
        for (action, rect) in PanelAction::ALL.into_iter().zip(button_rects) {
            // One dialog at a time: Add is disabled while it is open.
            let enabled = !(action == PanelAction::Add && app.controller.is_dialog_open());
            th::render_button(frame, rect, action.label(), enabled, false, theme);
            self.button_areas.push((action, rect));
        }

        let hints = if app.table.editing().is_some() {
            "Enter commit · Esc discard"
        } else if app.table.is_editable() {
            "a add · c clear · r refresh · d delete · e edit · q quit"
        } else {
            "a add · c clear · r refresh · d delete · q quit"
        };
        let [hint_line] = Layout::vertical([Constraint::Length(1)]).flex(Flex::Center).areas(hints_area);
        frame.render_widget(Paragraph::new(Span::styled(hints, theme.text_muted_style())), hint_line);
    }
}

impl Component for MainView {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if app.controller.is_dialog_open() {
            return self.dialog_view.handle_key_events(app, key);
        }
        if app.table.editing().is_some() {
            return self.table_view.handle_key_events(app, key);
        }
        match key.code {
            KeyCode::Char('a') => Self::trigger(app, PanelAction::Add),
            KeyCode::Char('c') => Self::trigger(app, PanelAction::Clear),
            KeyCode::Char('r') => Self::trigger(app, PanelAction::Refresh),
            KeyCode::Char('q') | KeyCode::Esc => vec![Effect::Quit],
            _ => self.table_view.handle_key_events(app, key),
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if app.controller.is_dialog_open() {
            return self.dialog_view.handle_mouse_events(app, mouse);
        }
        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && let Some((action, _)) = self.button_areas.iter().find(|(_, area)| hit(*area, mouse.column, mouse.row))
        {
            return Self::trigger(app, *action);
        }
        self.table_view.handle_mouse_events(app, mouse)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        frame.render_widget(Block::default().style(th::panel_style(app.theme.as_ref())), rect);
        let [header, table, actions, activity] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(8),
        ])
        .areas(rect);

        Self::render_header(frame, header, app);
        self.table_view.render(frame, table, app);
        self.render_actions(frame, actions, app);
        self.activity_view.render(frame, activity, app);

        if app.controller.is_dialog_open() {
            self.dialog_view.render(frame, rect, app);
        }
    }
}
