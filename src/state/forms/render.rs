//! Edit and print presentations of the same value
//!
//! Rendering is a pure function of the document, a path and the mode. It
//! never stores anything, so switching modes can only change how a value
//! looks, never what it is.

use serde::{Deserialize, Serialize};

use super::{FieldPath, FormDocument, ValidationRules};

/// Shown in print mode in place of an empty value
pub const PRINT_PLACEHOLDER: &str = "________";

/// Current presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Edit,
    Print,
}

impl RenderMode {
    pub fn toggle(&self) -> Self {
        match self {
            Self::Edit => Self::Print,
            Self::Print => Self::Edit,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Print => "Print",
        }
    }
}

/// One value as it should be presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldView {
    /// Editable control bound to the value
    Input {
        value: Option<String>,
        error: Option<String>,
        read_only: bool,
    },
    /// Inert text
    Static { value: Option<String> },
}

impl FieldView {
    /// The underlying value, identical in both modes
    pub fn value(&self) -> Option<&str> {
        match self {
            FieldView::Input { value, .. } | FieldView::Static { value } => value.as_deref(),
        }
    }

    /// Text to draw. Print mode substitutes `placeholder` for empty values.
    pub fn display<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            FieldView::Input { value, .. } => value.as_deref().unwrap_or(""),
            FieldView::Static { value } => match value.as_deref() {
                Some(v) if !v.trim().is_empty() => v,
                _ => placeholder,
            },
        }
    }

    /// Validation message; always `None` in print mode
    pub fn error(&self) -> Option<&str> {
        match self {
            FieldView::Input { error, .. } => error.as_deref(),
            FieldView::Static { .. } => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, FieldView::Input { read_only: false, .. })
    }
}

/// Bind a value to a presentation. Validation chrome only appears in edit mode.
pub fn bind(
    value: Option<String>,
    mode: RenderMode,
    error: Option<String>,
    read_only: bool,
) -> FieldView {
    match mode {
        RenderMode::Edit => FieldView::Input {
            value,
            error,
            read_only,
        },
        RenderMode::Print => FieldView::Static { value },
    }
}

/// Present the value at `path` in `mode`
pub fn render(
    doc: &FormDocument,
    path: &FieldPath,
    mode: RenderMode,
    rules: &ValidationRules,
) -> FieldView {
    let value = doc.get(path);
    let error = match mode {
        RenderMode::Edit => path
            .rule_key()
            .and_then(|key| rules.check(&key, value.as_deref().unwrap_or(""))),
        RenderMode::Print => None,
    };
    bind(value, mode, error, is_read_only(doc, path))
}

fn is_read_only(doc: &FormDocument, path: &FieldPath) -> bool {
    match path {
        FieldPath::Aggregate { .. } => true,
        FieldPath::Cell { table, cell, .. } => match cell {
            super::CellPath::Fixed(key) => doc
                .table(table)
                .and_then(|t| t.columns().iter().find(|c| c.key == key))
                .is_some_and(|spec| !spec.is_editable()),
            super::CellPath::Dynamic(_) => false,
        },
        FieldPath::RoleName { chain, .. } => doc.chain(chain).is_some_and(|c| !c.is_editable()),
        FieldPath::Field(_) | FieldPath::Signature { .. } => false,
    }
}
