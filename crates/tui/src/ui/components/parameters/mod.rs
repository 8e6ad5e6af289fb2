//! Parameter table and add dialog.

pub mod dialog;
mod dialog_component;
pub mod table;
mod table_component;

pub use dialog::{DialogEvent, Discovery, ParameterDialog};
pub use dialog_component::ParameterDialogComponent;
pub use table::ParameterTableState;
pub use table_component::ParameterTableComponent;
