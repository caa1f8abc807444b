//! Form domain layer
//!
//! The structured data model shared by every printable form:
//! - `field`: scalar form fields and their editing rules
//! - `validation`: per-form rule sets supplied by the catalog
//! - `dynamic_columns`: runtime-added table columns
//! - `line_items`: repeatable rows with a reserved extension map
//! - `approval`: the sign-off chain and its signature records
//! - `document`: the form values tree and path addressing
//! - `render`: the edit/print rendering contract
//! - `session`: one open form instance, its registries and submit

#![allow(dead_code)]

mod approval;
mod document;
mod dynamic_columns;
mod field;
mod line_items;
mod render;
mod session;
mod validation;

pub use approval::{ApprovalChain, ApprovalEntry, SignatureData, SignatureField};
pub use document::{ChainSection, DocumentSnapshot, FieldPath, FormDocument, TableSection};
pub use dynamic_columns::{ColumnRegistry, DynamicColumn};
pub use field::{accepts_char, FieldKind, FormField};
pub use line_items::{
    format_amount, parse_number, AggregateSpec, CellPath, ColumnSpec, DynamicFieldMap, LineItem,
    LineItemCollection, LineItemTable, DYNAMIC_FIELDS_KEY,
};
pub use render::{render, FieldView, RenderMode, PRINT_PLACEHOLDER};
pub use session::{FormSession, LoggingSubmitHandler, SubmitHandler};
pub use validation::{Rule, ValidationRules};

#[cfg(test)]
pub use render::bind;
#[cfg(test)]
pub use session::{Acknowledgement, MockSubmitHandler};

use thiserror::Error;

/// Errors raised when a requested mutation of a form is refused.
///
/// None of these are fatal: the document is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A dynamic column with the same derived key already exists.
    #[error("a column named '{key}' already exists")]
    DuplicateColumn { key: String },

    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    #[error("unknown line-item table '{key}'")]
    UnknownTable { key: String },

    #[error("unknown approval chain '{key}'")]
    UnknownChain { key: String },

    #[error("unknown column '{key}'")]
    UnknownColumn { key: String },

    /// Derived cells and aggregates are computed, never written.
    #[error("'{key}' is calculated and cannot be edited")]
    ReadOnlyColumn { key: String },

    #[error("row {index} is out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("role {index} is out of range (chain has {len} roles)")]
    RoleOutOfRange { index: usize, len: usize },

    #[error("role names are locked")]
    RoleNamesLocked,

    #[error("{count} field(s) failed validation")]
    ValidationFailed { count: usize },
}
