//! Row state for the parameter table.
//!
//! The table is a read-through view: rows are replaced wholesale by
//! [`ParameterTableState::load_data`] and never patched locally. Deleting a
//! row or committing a cell edit only produces a [`ParameterCommand`]; the
//! visible change arrives with the next snapshot.

use paramdeck_engine::{CommandBuilder, ParameterCommand};
use paramdeck_types::{Parameter, ParameterField};
use tracing::warn;

use crate::ui::components::common::TextInputState;

/// An in-progress cell edit.
///
/// Keyed by row identity so it survives snapshot reloads that reorder rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub identity: String,
    pub field: ParameterField,
    pub input: TextInputState,
}

#[derive(Debug)]
pub struct ParameterTableState {
    owner: String,
    editable: bool,
    rows: Vec<Parameter>,
    selected: usize,
    column: usize,
    editing: Option<CellEdit>,
}

impl ParameterTableState {
    pub fn new(owner: impl Into<String>, editable: bool) -> Self {
        Self {
            owner: owner.into(),
            editable,
            rows: Vec::new(),
            selected: 0,
            column: 0,
            editing: None,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Replace every row with the latest snapshot.
    ///
    /// `None` empties the table and returns a notice naming the owning
    /// entity.
    pub fn load_data(&mut self, rows: Option<Vec<Parameter>>) -> Option<String> {
        let notice = match rows {
            Some(rows) => {
                self.rows = rows;
                None
            }
            None => {
                self.rows.clear();
                warn!(owner = %self.owner, "no parameter rows available; table cleared");
                Some(format!("no parameter data available for {}", self.owner))
            }
        };
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        if let Some(edit) = &self.editing
            && !self.rows.iter().any(|row| row.identity() == edit.identity)
        {
            self.editing = None;
        }
        notice
    }

    pub fn rows(&self) -> &[Parameter] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.selected)
    }

    pub fn selected_row(&self) -> Option<&Parameter> {
        self.rows.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.rows.len() {
            self.selected = index;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Editable column under the cursor.
    pub fn selected_field(&self) -> ParameterField {
        ParameterField::ALL[self.column]
    }

    pub fn select_field(&mut self, field: ParameterField) {
        if let Some(column) = ParameterField::ALL.iter().position(|candidate| *candidate == field) {
            self.column = column;
        }
    }

    pub fn next_column(&mut self) {
        self.column = (self.column + 1).min(ParameterField::ALL.len() - 1);
    }

    pub fn previous_column(&mut self) {
        self.column = self.column.saturating_sub(1);
    }

    pub fn editing(&self) -> Option<&CellEdit> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut CellEdit> {
        self.editing.as_mut()
    }

    /// Start editing the selected cell. No-op on a read-only table.
    pub fn begin_edit(&mut self) -> bool {
        if !self.editable || self.editing.is_some() {
            return false;
        }
        let field = self.selected_field();
        let Some(row) = self.selected_row() else {
            return false;
        };
        self.editing = Some(CellEdit {
            identity: row.identity().to_string(),
            field,
            input: TextInputState::with_text(row.field(field).unwrap_or_default()),
        });
        true
    }

    /// Finish the edit and build the matching assignment command.
    ///
    /// The typed value is passed through untouched; an unchanged value
    /// produces no command.
    pub fn commit_edit(&mut self, builder: &CommandBuilder) -> Option<ParameterCommand> {
        let edit = self.editing.take()?;
        let current = self
            .rows
            .iter()
            .find(|row| row.identity() == edit.identity)
            .and_then(|row| row.field(edit.field));
        if current.unwrap_or_default() == edit.input.input() {
            return None;
        }
        Some(builder.set_field(&edit.identity, edit.field, edit.input.input()))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Removal command for the row at `index`.
    pub fn remove_command(&self, builder: &CommandBuilder, index: usize) -> Option<ParameterCommand> {
        self.rows.get(index).map(|row| builder.remove(row.identity()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(target: &str, name: Option<&str>, low: Option<&str>) -> Parameter {
        Parameter {
            target: target.into(),
            name: name.map(str::to_string),
            low: low.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn missing_rows_clear_the_table_with_a_notice() {
        let mut table = ParameterTableState::new("top.driver", true);
        assert_eq!(table.load_data(Some(vec![row("a.x", None, None)])), None);
        assert_eq!(table.rows().len(), 1);

        let notice = table.load_data(None);
        assert!(table.is_empty());
        assert!(notice.is_some_and(|text| text.contains("top.driver")));
        assert_eq!(table.selected(), None);
    }

    #[test]
    fn load_replaces_rows_and_clamps_selection() {
        let mut table = ParameterTableState::new("driver", true);
        table.load_data(Some(vec![row("a", None, None), row("b", None, None), row("c", None, None)]));
        table.select(2);
        table.load_data(Some(vec![row("d", None, None)]));
        assert_eq!(table.selected(), Some(0));
        assert_eq!(table.selected_row().map(|row| row.target.as_str()), Some("d"));
    }

    #[test]
    fn remove_uses_alias_then_target() {
        let builder = CommandBuilder::default();
        let mut table = ParameterTableState::new("driver", true);
        table.load_data(Some(vec![row("a.x", Some("p1"), None), row("a.y,a.z", None, None)]));
        assert_eq!(table.remove_command(&builder, 0), Some(builder.remove("p1")));
        assert_eq!(
            table.remove_command(&builder, 1).map(|command| command.to_command_text("driver")),
            Some("driver.remove_parameter((a.y,a.z));".to_string())
        );
        assert_eq!(table.remove_command(&builder, 5), None);
    }

    #[test]
    fn commit_builds_set_field_without_touching_rows() {
        let builder = CommandBuilder::default();
        let mut table = ParameterTableState::new("driver", true);
        table.load_data(Some(vec![row("a.x", Some("p1"), Some("0"))]));
        assert!(table.begin_edit());
        assert_eq!(table.editing().map(|edit| edit.input.input()), Some("0"));

        if let Some(edit) = table.editing_mut() {
            edit.input.set_input("ten");
        }
        assert_eq!(table.commit_edit(&builder), Some(builder.set_field("p1", ParameterField::Low, "ten")));
        assert_eq!(table.rows()[0].low.as_deref(), Some("0"));
        assert!(table.editing().is_none());
    }

    #[test]
    fn unchanged_or_cancelled_edits_build_nothing() {
        let builder = CommandBuilder::default();
        let mut table = ParameterTableState::new("driver", true);
        table.load_data(Some(vec![row("a.x", None, Some("1"))]));
        assert!(table.begin_edit());
        assert_eq!(table.commit_edit(&builder), None);

        table.next_column();
        assert!(table.begin_edit());
        table.cancel_edit();
        assert!(table.editing().is_none());
    }

    #[test]
    fn read_only_table_refuses_edits() {
        let mut table = ParameterTableState::new("driver", false);
        table.load_data(Some(vec![row("a.x", None, None)]));
        assert!(!table.begin_edit());
    }

    #[test]
    fn edit_is_dropped_when_its_row_disappears() {
        let mut table = ParameterTableState::new("driver", true);
        table.load_data(Some(vec![row("a.x", None, None), row("a.y", None, None)]));
        table.select(1);
        assert!(table.begin_edit());
        table.load_data(Some(vec![row("a.y", None, None)]));
        assert!(table.editing().is_some());
        table.load_data(Some(vec![row("a.x", None, None)]));
        assert!(table.editing().is_none());
    }
}
