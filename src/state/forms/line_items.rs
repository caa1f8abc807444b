//! Repeatable line-item tables
//!
//! Every concrete form declares its row as a plain struct implementing
//! [`LineItem`]: the statically known columns are ordinary fields, and the
//! runtime-added columns live in a single [`DynamicFieldMap`] stored under
//! the reserved `dynamicFields` key.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::field::{accepts_char, FieldKind};
use super::FormError;

/// Reserved key holding a row's dynamic column values
pub const DYNAMIC_FIELDS_KEY: &str = "dynamicFields";

/// Parse operator-entered numbers, tolerating thousands separators
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Two-decimal rendering used for derived amounts and totals
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Per-row values for dynamic columns, in the order they were first set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicFieldMap(IndexMap<String, String>);

impl DynamicFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, key: &str, value: String) -> Option<String> {
        self.0.insert(key.to_string(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a fixed column is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
    /// Computed from other cells of the same row on every read
    Derived,
}

/// Static description of one fixed column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: ColumnKind::Text,
        }
    }

    pub const fn number(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: ColumnKind::Number,
        }
    }

    pub const fn date(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: ColumnKind::Date,
        }
    }

    pub const fn derived(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: ColumnKind::Derived,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.kind != ColumnKind::Derived
    }

    /// Keystroke filter for this column
    pub fn accepts(&self, c: char) -> bool {
        match self.kind {
            ColumnKind::Text => accepts_char(FieldKind::Text, c, false),
            ColumnKind::Number => accepts_char(FieldKind::Number, c, false),
            ColumnKind::Date => accepts_char(FieldKind::Date, c, false),
            ColumnKind::Derived => false,
        }
    }
}

/// A column total computed from the current rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// Column whose numeric values are summed
    pub column: &'static str,
}

/// Address of a cell within a row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellPath {
    Fixed(String),
    Dynamic(String),
}

impl CellPath {
    pub fn fixed(key: &str) -> Self {
        CellPath::Fixed(key.to_string())
    }

    pub fn dynamic(key: &str) -> Self {
        CellPath::Dynamic(key.to_string())
    }

    /// `dynamicFields.<key>` addresses the extension map, anything else a fixed column
    pub fn parse(path: &str) -> Self {
        match path
            .strip_prefix(DYNAMIC_FIELDS_KEY)
            .and_then(|rest| rest.strip_prefix('.'))
        {
            Some(key) => CellPath::Dynamic(key.to_string()),
            None => CellPath::Fixed(path.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            CellPath::Fixed(k) | CellPath::Dynamic(k) => k,
        }
    }
}

impl fmt::Display for CellPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellPath::Fixed(key) => write!(f, "{key}"),
            CellPath::Dynamic(key) => write!(f, "{DYNAMIC_FIELDS_KEY}.{key}"),
        }
    }
}

/// A statically typed row with a dynamic extension map
pub trait LineItem: Clone + Default + fmt::Debug + 'static {
    /// Fixed columns in display order
    fn columns() -> &'static [ColumnSpec];

    /// Column totals shown under the table
    fn aggregates() -> &'static [AggregateSpec] {
        &[]
    }

    /// Current value of a fixed (or derived) column
    fn fixed(&self, key: &str) -> Option<String>;

    /// Write an editable fixed column. Only called for keys declared editable.
    fn set_fixed(&mut self, key: &str, value: String) -> Result<(), FormError>;

    fn extension(&self) -> &DynamicFieldMap;

    fn extension_mut(&mut self) -> &mut DynamicFieldMap;

    fn column(key: &str) -> Option<&'static ColumnSpec> {
        Self::columns().iter().find(|c| c.key == key)
    }

    fn cell(&self, path: &CellPath) -> Option<String> {
        match path {
            CellPath::Fixed(key) => self.fixed(key),
            CellPath::Dynamic(key) => self.extension().get(key).map(str::to_string),
        }
    }

    fn set_cell(&mut self, path: &CellPath, value: String) -> Result<(), FormError> {
        match path {
            CellPath::Fixed(key) => match Self::column(key) {
                Some(spec) if spec.is_editable() => self.set_fixed(key, value),
                Some(_) => Err(FormError::ReadOnlyColumn { key: key.clone() }),
                None => Err(FormError::UnknownColumn { key: key.clone() }),
            },
            CellPath::Dynamic(key) => {
                self.extension_mut().set(key, value);
                Ok(())
            }
        }
    }
}

/// Ordered rows of one line-item table
#[derive(Debug, Clone)]
pub struct LineItemCollection<R: LineItem> {
    rows: Vec<R>,
    template: R,
}

impl<R: LineItem> Default for LineItemCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LineItem> LineItemCollection<R> {
    /// An empty table whose new rows start from `R::default()`
    pub fn new() -> Self {
        Self::with_template(R::default())
    }

    /// An empty table whose new rows are clones of `template`
    pub fn with_template(mut template: R) -> Self {
        *template.extension_mut() = DynamicFieldMap::new();
        Self {
            rows: Vec::new(),
            template,
        }
    }

    /// A table opened with `count` blank rows
    pub fn seeded(count: usize) -> Self {
        let mut collection = Self::new();
        for _ in 0..count {
            collection.append_row();
        }
        collection
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a clone of the template, returning its index
    pub fn append_row(&mut self) -> usize {
        self.rows.push(self.template.clone());
        self.rows.len() - 1
    }

    /// Append a prepared row. Its extension map is kept as given.
    pub fn push(&mut self, row: R) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Remove exactly the row at `index`; later rows shift down by one
    pub fn remove_row(&mut self, index: usize) -> Option<R> {
        if index >= self.rows.len() {
            warn!(index, len = self.rows.len(), "ignored out-of-range row removal");
            return None;
        }
        Some(self.rows.remove(index))
    }

    pub fn cell(&self, index: usize, path: &CellPath) -> Option<String> {
        self.rows.get(index)?.cell(path)
    }

    pub fn set_cell(
        &mut self,
        index: usize,
        path: &CellPath,
        value: String,
    ) -> Result<(), FormError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(FormError::RowOutOfRange { index, len })?;
        row.set_cell(path, value)
    }

    /// Sum of a numeric column over the current rows. Blank and
    /// unparseable cells count as zero.
    pub fn sum(&self, column: &str) -> f64 {
        let path = CellPath::fixed(column);
        self.rows
            .iter()
            .filter_map(|row| row.cell(&path))
            .filter_map(|value| parse_number(&value))
            .fold(0.0, |total, value| total + value)
    }
}

/// Object-safe view of a `LineItemCollection<R>` so one document can hold
/// tables of different row types
pub trait LineItemTable: fmt::Debug {
    fn columns(&self) -> &'static [ColumnSpec];
    fn aggregates(&self) -> &'static [AggregateSpec];
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn append_row(&mut self) -> usize;
    fn remove_row(&mut self, index: usize) -> Result<(), FormError>;
    fn cell(&self, row: usize, path: &CellPath) -> Option<String>;
    fn set_cell(&mut self, row: usize, path: &CellPath, value: String) -> Result<(), FormError>;
    fn extension(&self, row: usize) -> Option<&DynamicFieldMap>;
    fn aggregate(&self, key: &str) -> Option<f64>;
    fn box_clone(&self) -> Box<dyn LineItemTable>;
}

impl Clone for Box<dyn LineItemTable> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

impl<R: LineItem> LineItemTable for LineItemCollection<R> {
    fn columns(&self) -> &'static [ColumnSpec] {
        R::columns()
    }

    fn aggregates(&self) -> &'static [AggregateSpec] {
        R::aggregates()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn append_row(&mut self) -> usize {
        let index = LineItemCollection::append_row(self);
        debug!(index, "appended row");
        index
    }

    fn remove_row(&mut self, index: usize) -> Result<(), FormError> {
        let len = self.rows.len();
        LineItemCollection::remove_row(self, index)
            .map(|_| debug!(index, "removed row"))
            .ok_or(FormError::RowOutOfRange { index, len })
    }

    fn cell(&self, row: usize, path: &CellPath) -> Option<String> {
        LineItemCollection::cell(self, row, path)
    }

    fn set_cell(&mut self, row: usize, path: &CellPath, value: String) -> Result<(), FormError> {
        LineItemCollection::set_cell(self, row, path, value)
    }

    fn extension(&self, row: usize) -> Option<&DynamicFieldMap> {
        self.rows.get(row).map(LineItem::extension)
    }

    fn aggregate(&self, key: &str) -> Option<f64> {
        let spec = R::aggregates().iter().find(|a| a.key == key)?;
        Some(self.sum(spec.column))
    }

    fn box_clone(&self) -> Box<dyn LineItemTable> {
        Box::new(self.clone())
    }
}
