use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, Paragraph},
};

use super::dialog::{DialogEvent, DialogField, Discovery, ParameterDialog};
use crate::app::{App, Effect};
use crate::ui::components::component::{Component, hit};
use crate::ui::theme::theme_helpers as th;

const DIALOG_WIDTH: u16 = 64;
const LABEL_WIDTH: u16 = 8;

/// Modal view over the controller's [`ParameterDialog`].
#[derive(Debug, Default)]
pub struct ParameterDialogComponent {
    field_areas: Vec<(DialogField, Rect)>,
    suggestions_area: Rect,
    add_button: Rect,
    cancel_button: Rect,
}

impl ParameterDialogComponent {
    /// Hand a terminal event to the controller, which drops the dialog.
    fn settle(app: &mut App, event: Option<DialogEvent>) -> Vec<Effect> {
        match event {
            Some(event) => app.controller.settle_dialog(event),
            None => Vec::new(),
        }
    }

    fn dialog_area(area: Rect, height: u16) -> Rect {
        let [row] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);
        let [column] = Layout::horizontal([Constraint::Length(DIALOG_WIDTH)]).flex(Flex::Center).areas(row);
        column
    }

    fn discovery_line(dialog: &ParameterDialog) -> (String, paramdeck_types::Severity) {
        use paramdeck_types::Severity;
        match dialog.discovery() {
            Discovery::Pending => ("discovering candidates…".to_string(), Severity::Info),
            Discovery::Ready(candidates) if candidates.is_empty() => ("no candidates found".to_string(), Severity::Warning),
            Discovery::Ready(candidates) => (format!("{} candidates", candidates.len()), Severity::Success),
            Discovery::Failed(message) => (format!("discovery failed: {message}"), Severity::Error),
        }
    }
}

impl Component for ParameterDialogComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let Some(dialog) = app.controller.dialog_mut() else {
            return Vec::new();
        };
        let on_target = dialog.focused() == DialogField::Target;
        let has_suggestions = on_target && !dialog.suggestions().is_empty();
        match key.code {
            KeyCode::Esc => {
                let event = dialog.cancel();
                return Self::settle(app, event);
            }
            KeyCode::Enter => {
                if dialog.accept_suggestion() {
                    return Vec::new();
                }
                let event = dialog.confirm();
                return Self::settle(app, event);
            }
            KeyCode::Tab => {
                if !dialog.accept_suggestion() {
                    dialog.focus_next();
                }
            }
            KeyCode::BackTab => dialog.focus_previous(),
            KeyCode::Down if has_suggestions => dialog.highlight_next(),
            KeyCode::Up if has_suggestions => dialog.highlight_previous(),
            KeyCode::Down => dialog.focus_next(),
            KeyCode::Up => dialog.focus_previous(),
            KeyCode::Left => dialog.edit(|input| input.move_left()),
            KeyCode::Right => dialog.edit(|input| input.move_right()),
            KeyCode::Home => dialog.edit(|input| input.move_home()),
            KeyCode::End => dialog.edit(|input| input.move_end()),
            KeyCode::Backspace => dialog.edit(|input| input.backspace()),
            KeyCode::Delete => dialog.edit(|input| input.delete()),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => dialog.edit(|input| input.insert_char(c)),
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        let Some(dialog) = app.controller.dialog_mut() else {
            return Vec::new();
        };
        let (column, row) = (mouse.column, mouse.row);
        if hit(self.add_button, column, row) {
            let event = dialog.confirm();
            return Self::settle(app, event);
        }
        if hit(self.cancel_button, column, row) {
            let event = dialog.cancel();
            return Self::settle(app, event);
        }
        if hit(self.suggestions_area, column, row) {
            dialog.highlight(usize::from(row - self.suggestions_area.y));
            dialog.accept_suggestion();
            return Vec::new();
        }
        if let Some((field, _)) = self.field_areas.iter().find(|(_, area)| hit(*area, column, row)) {
            dialog.focus(*field);
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let Some(dialog) = app.controller.dialog() else {
            return;
        };
        let theme = app.theme.as_ref();
        let suggestion_rows = u16::try_from(dialog.suggestions().len()).unwrap_or(u16::MAX);
        // fields + status + suggestions + error + buttons + borders
        let height = DialogField::ALL.len() as u16 + 1 + suggestion_rows + 1 + 3 + 2;
        let area = Self::dialog_area(rect, height.min(rect.height));
        frame.render_widget(Clear, area);
        let block = th::block(theme, Some("Add parameter"), true).style(theme.modal_background_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [fields_area, status_area, suggestions_area, error_area, buttons_area] = Layout::vertical([
            Constraint::Length(DialogField::ALL.len() as u16),
            Constraint::Length(1),
            Constraint::Length(suggestion_rows),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(inner);

        self.field_areas.clear();
        let mut cursor = None;
        for (offset, field) in DialogField::ALL.into_iter().enumerate() {
            let row = Rect {
                y: fields_area.y + offset as u16,
                height: 1,
                ..fields_area
            };
            if row.y >= fields_area.bottom() {
                break;
            }
            let [label_area, input_area] =
                Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Fill(1)]).areas(row);
            let focused = dialog.focused() == field;
            let label_style = if focused { theme.accent_emphasis_style() } else { theme.text_secondary_style() };
            let input = dialog.input(field);
            let valid = !(field == DialogField::Target && dialog.error().is_some());
            frame.render_widget(Paragraph::new(Span::styled(field.label(), label_style)), label_area);
            frame.render_widget(
                Paragraph::new(input.input().to_string()).style(th::input_style(theme, valid, focused)),
                input_area,
            );
            if focused {
                cursor = Some(Position::new(
                    input_area.x.saturating_add(input.cursor_column()).min(input_area.right().saturating_sub(1)),
                    input_area.y,
                ));
            }
            self.field_areas.push((field, row));
        }

        let (status, severity) = Self::discovery_line(dialog);
        frame.render_widget(Paragraph::new(Span::styled(status, theme.severity_style(severity))), status_area);

        self.suggestions_area = suggestions_area;
        let items: Vec<ListItem> = dialog
            .suggestions()
            .iter()
            .enumerate()
            .map(|(index, suggestion)| {
                let style = if dialog.highlighted() == Some(index) {
                    th::table_selected_style(theme)
                } else {
                    theme.text_primary_style()
                };
                ListItem::new(Line::from(Span::styled(format!("  {suggestion}"), style)))
            })
            .collect();
        frame.render_widget(List::new(items), suggestions_area);

        if let Some(error) = dialog.error() {
            frame.render_widget(
                Paragraph::new(Span::styled(error.to_string(), theme.severity_style(paramdeck_types::Severity::Error))),
                error_area,
            );
        }

        let [add_button, cancel_button] = Layout::horizontal([Constraint::Length(12), Constraint::Length(12)])
            .flex(Flex::End)
            .spacing(1)
            .areas(buttons_area);
        let can_submit = !dialog.input(DialogField::Target).is_blank();
        th::render_button(frame, add_button, "Add", can_submit, false, theme);
        th::render_button(frame, cancel_button, "Cancel", true, false, theme);
        self.add_button = add_button;
        self.cancel_button = cancel_button;

        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }
}
