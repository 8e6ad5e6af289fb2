use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use paramdeck_types::ParameterField;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::app::{App, Effect};
use crate::ui::components::component::{Component, hit};
use crate::ui::theme::theme_helpers as th;

const DELETE_GLYPH: &str = "✕";
const COLUMN_SPACING: u16 = 1;

/// Renders the parameter rows and turns row actions into commands.
#[derive(Debug, Default)]
pub struct ParameterTableComponent {
    table_state: TableState,
    /// First data row on screen, below the header.
    rows_area: Rect,
    /// Screen columns for Target, the five fields, then delete.
    column_areas: Vec<Rect>,
}

impl ParameterTableComponent {
    fn constraints() -> [Constraint; 7] {
        [
            Constraint::Fill(3),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Length(3),
        ]
    }

    fn handle_edit_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Enter => {
                let command = app.table.commit_edit(app.controller.builder());
                return app.controller.submit(command);
            }
            KeyCode::Esc => app.table.cancel_edit(),
            code => {
                if let Some(edit) = app.table.editing_mut() {
                    let input = &mut edit.input;
                    match code {
                        KeyCode::Left => input.move_left(),
                        KeyCode::Right => input.move_right(),
                        KeyCode::Home => input.move_home(),
                        KeyCode::End => input.move_end(),
                        KeyCode::Backspace => input.backspace(),
                        KeyCode::Delete => input.delete(),
                        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
                        _ => {}
                    }
                }
            }
        }
        Vec::new()
    }

    fn row_at(&self, row: u16) -> Option<usize> {
        if row < self.rows_area.y || row >= self.rows_area.bottom() {
            return None;
        }
        Some(self.table_state.offset() + usize::from(row - self.rows_area.y))
    }
}

impl Component for ParameterTableComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if app.table.editing().is_some() {
            return Self::handle_edit_key(app, key);
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.table.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.table.select_next(),
            KeyCode::Left | KeyCode::Char('h') => app.table.previous_column(),
            KeyCode::Right | KeyCode::Char('l') => app.table.next_column(),
            KeyCode::Enter | KeyCode::Char('e') => {
                app.table.begin_edit();
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                let command = app
                    .table
                    .selected()
                    .and_then(|index| app.table.remove_command(app.controller.builder(), index));
                return app.controller.submit(command);
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        match mouse.kind {
            MouseEventKind::ScrollDown => app.table.select_next(),
            MouseEventKind::ScrollUp => app.table.select_previous(),
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(index) = self.row_at(mouse.row).filter(|index| *index < app.table.rows().len()) else {
                    return Vec::new();
                };
                if app.table.editing().is_some() {
                    app.table.cancel_edit();
                }
                app.table.select(index);
                let column = self.column_areas.iter().position(|area| mouse.column >= area.x && mouse.column < area.right());
                match column {
                    Some(6) => {
                        let command = app.table.remove_command(app.controller.builder(), index);
                        return app.controller.submit(command);
                    }
                    Some(column @ 1..=5) => app.table.select_field(ParameterField::ALL[column - 1]),
                    _ => {}
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = app.theme.as_ref();
        let title = if app.table.is_editable() { "Parameters" } else { "Parameters (read-only)" };
        let block = th::block(theme, Some(title), !app.controller.is_dialog_open());
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        if app.table.is_empty() {
            self.rows_area = Rect::default();
            let hint = Paragraph::new(Line::from(Span::styled(
                format!("No parameters on {}. Press 'a' to add one.", app.table.owner()),
                theme.text_muted_style(),
            )));
            frame.render_widget(hint, inner);
            return;
        }

        self.column_areas = Layout::horizontal(Self::constraints())
            .spacing(COLUMN_SPACING)
            .split(inner)
            .to_vec();
        self.rows_area = Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        };

        let header = Row::new(
            std::iter::once("Target")
                .chain(ParameterField::ALL.iter().map(ParameterField::as_str))
                .chain(std::iter::once("")),
        )
        .style(th::table_header_row_style(theme));

        let selected = app.table.selected();
        let selected_field = app.table.selected_field();
        let editing = app.table.editing();
        let mut cursor = None;
        let rows = app.table.rows().iter().enumerate().map(|(index, parameter)| {
            let mut cells = vec![Cell::from(parameter.target.clone())];
            for field in ParameterField::ALL {
                let editing_here = editing.filter(|edit| edit.identity == parameter.identity() && edit.field == field);
                let cell = match editing_here {
                    Some(edit) => {
                        cursor = Some((field, index, edit.input.cursor_column()));
                        Cell::from(edit.input.input().to_string()).style(th::input_style(theme, true, true))
                    }
                    None => {
                        let text = parameter.field(field).unwrap_or_default().to_string();
                        let cell = Cell::from(text);
                        if selected == Some(index) && field == selected_field && app.table.is_editable() {
                            cell.style(theme.accent_emphasis_style())
                        } else {
                            cell
                        }
                    }
                };
                cells.push(cell);
            }
            cells.push(Cell::from(DELETE_GLYPH).style(theme.severity_style(paramdeck_types::Severity::Error)));
            Row::new(cells).style(th::table_row_style(theme, index))
        });

        let table = Table::new(rows.collect::<Vec<_>>(), Self::constraints())
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(th::table_selected_style(theme));
        self.table_state.select(selected);
        frame.render_stateful_widget(table, inner, &mut self.table_state);

        if let Some((field, index, column)) = cursor
            && let Some(offset) = index.checked_sub(self.table_state.offset())
            && let Some(area) = ParameterField::ALL
                .iter()
                .position(|candidate| *candidate == field)
                .and_then(|position| self.column_areas.get(position + 1))
            && let Ok(offset) = u16::try_from(offset)
            && offset < self.rows_area.height
        {
            let position = Position::new(area.x.saturating_add(column).min(area.right().saturating_sub(1)), self.rows_area.y + offset);
            if hit(self.rows_area, position.x, position.y) {
                frame.set_cursor_position(position);
            }
        }
    }
}
