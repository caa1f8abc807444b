//! The form values tree and path addressing

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use super::{
    format_amount, ApprovalChain, ApprovalEntry, CellPath, FormError, FormField, LineItemTable,
    SignatureField, DYNAMIC_FIELDS_KEY,
};

/// Address of a single value inside a `FormDocument`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Field(String),
    Cell {
        table: String,
        row: usize,
        cell: CellPath,
    },
    Aggregate {
        table: String,
        key: String,
    },
    RoleName {
        chain: String,
        index: usize,
    },
    Signature {
        chain: String,
        index: usize,
        field: SignatureField,
    },
}

impl FieldPath {
    pub fn field(name: &str) -> Self {
        FieldPath::Field(name.to_string())
    }

    pub fn cell(table: &str, row: usize, cell: CellPath) -> Self {
        FieldPath::Cell {
            table: table.to_string(),
            row,
            cell,
        }
    }

    pub fn aggregate(table: &str, key: &str) -> Self {
        FieldPath::Aggregate {
            table: table.to_string(),
            key: key.to_string(),
        }
    }

    pub fn role_name(chain: &str, index: usize) -> Self {
        FieldPath::RoleName {
            chain: chain.to_string(),
            index,
        }
    }

    pub fn signature(chain: &str, index: usize, field: SignatureField) -> Self {
        FieldPath::Signature {
            chain: chain.to_string(),
            index,
            field,
        }
    }

    /// Key used to look up validation rules: the field name, or
    /// `table.column` for fixed cells
    pub fn rule_key(&self) -> Option<String> {
        match self {
            FieldPath::Field(name) => Some(name.clone()),
            FieldPath::Cell {
                table,
                cell: CellPath::Fixed(key),
                ..
            } => Some(format!("{table}.{key}")),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            FieldPath::Cell { table, .. } | FieldPath::Aggregate { table, .. } => Some(table),
            _ => None,
        }
    }

    pub fn chain(&self) -> Option<&str> {
        match self {
            FieldPath::RoleName { chain, .. } | FieldPath::Signature { chain, .. } => Some(chain),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Field(name) => write!(f, "{name}"),
            FieldPath::Cell { table, row, cell } => write!(f, "{table}[{row}].{cell}"),
            FieldPath::Aggregate { table, key } => write!(f, "{table}.{key}"),
            FieldPath::RoleName { chain, index } => write!(f, "{chain}[{index}].roleName"),
            FieldPath::Signature {
                chain,
                index,
                field,
            } => write!(f, "{chain}[{index}].signature.{}", field.key()),
        }
    }
}

/// A line-item table together with its section heading
#[derive(Debug, Clone)]
pub struct TableSection {
    pub label: String,
    pub table: Box<dyn LineItemTable>,
}

/// An approval chain together with its section heading
#[derive(Debug, Clone)]
pub struct ChainSection {
    pub label: String,
    pub chain: ApprovalChain,
}

/// Root mutable record of one open form
#[derive(Debug, Clone)]
pub struct FormDocument {
    id: Uuid,
    form_id: String,
    title: String,
    fields: IndexMap<String, FormField>,
    tables: IndexMap<String, TableSection>,
    chains: IndexMap<String, ChainSection>,
    attachments: Vec<serde_json::Value>,
    custom_fields: Vec<serde_json::Value>,
}

impl FormDocument {
    pub fn new(form_id: &str, title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            form_id: form_id.to_string(),
            title: title.to_string(),
            fields: IndexMap::new(),
            tables: IndexMap::new(),
            chains: IndexMap::new(),
            attachments: Vec::new(),
            custom_fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn with_table(
        mut self,
        key: &str,
        label: &str,
        table: impl LineItemTable + 'static,
    ) -> Self {
        self.tables.insert(
            key.to_string(),
            TableSection {
                label: label.to_string(),
                table: Box::new(table),
            },
        );
        self
    }

    pub fn with_chain(mut self, key: &str, label: &str, chain: ApprovalChain) -> Self {
        self.chains.insert(
            key.to_string(),
            ChainSection {
                label: label.to_string(),
                chain,
            },
        );
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableSection)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn table(&self, key: &str) -> Option<&dyn LineItemTable> {
        self.tables.get(key).map(|s| s.table.as_ref())
    }

    pub fn table_mut(
        &mut self,
        key: &str,
    ) -> Result<&mut (dyn LineItemTable + 'static), FormError> {
        self.tables
            .get_mut(key)
            .map(|s| s.table.as_mut())
            .ok_or_else(|| FormError::UnknownTable {
                key: key.to_string(),
            })
    }

    pub fn chains(&self) -> impl Iterator<Item = (&str, &ChainSection)> {
        self.chains.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn chains_mut(&mut self) -> impl Iterator<Item = &mut ApprovalChain> {
        self.chains.values_mut().map(|s| &mut s.chain)
    }

    pub fn chain(&self, key: &str) -> Option<&ApprovalChain> {
        self.chains.get(key).map(|s| &s.chain)
    }

    pub fn chain_mut(&mut self, key: &str) -> Result<&mut ApprovalChain, FormError> {
        self.chains
            .get_mut(key)
            .map(|s| &mut s.chain)
            .ok_or_else(|| FormError::UnknownChain {
                key: key.to_string(),
            })
    }

    /// Attachment descriptors, passed through to the upload widget untouched
    pub fn attachments(&self) -> &[serde_json::Value] {
        &self.attachments
    }

    pub fn set_attachments(&mut self, attachments: Vec<serde_json::Value>) {
        self.attachments = attachments;
    }

    /// Free-text custom fields, passed through untouched
    pub fn custom_fields(&self) -> &[serde_json::Value] {
        &self.custom_fields
    }

    pub fn set_custom_fields(&mut self, custom_fields: Vec<serde_json::Value>) {
        self.custom_fields = custom_fields;
    }

    /// Canonical value at `path`. `None` means absent or not computable.
    pub fn get(&self, path: &FieldPath) -> Option<String> {
        match path {
            FieldPath::Field(name) => self.fields.get(name).map(|f| f.as_text().to_string()),
            FieldPath::Cell { table, row, cell } => self.table(table)?.cell(*row, cell),
            FieldPath::Aggregate { table, key } => {
                self.table(table)?.aggregate(key).map(format_amount)
            }
            FieldPath::RoleName { chain, index } => self
                .chain(chain)?
                .entry(*index)
                .map(|e| e.role_name.clone()),
            FieldPath::Signature {
                chain,
                index,
                field,
            } => self
                .chain(chain)?
                .entry(*index)?
                .signature
                .get(*field)
                .map(str::to_string),
        }
    }

    /// Write the value at `path`
    pub fn set(&mut self, path: &FieldPath, value: String) -> Result<(), FormError> {
        debug!(path = %path, "set value");
        match path {
            FieldPath::Field(name) => {
                let field = self
                    .fields
                    .get_mut(name)
                    .ok_or_else(|| FormError::UnknownField { name: name.clone() })?;
                field.set_text(value);
                Ok(())
            }
            FieldPath::Cell { table, row, cell } => {
                self.table_mut(table)?.set_cell(*row, cell, value)
            }
            FieldPath::Aggregate { key, .. } => Err(FormError::ReadOnlyColumn { key: key.clone() }),
            FieldPath::RoleName { chain, index } => {
                self.chain_mut(chain)?.rename_role(*index, &value)
            }
            FieldPath::Signature {
                chain,
                index,
                field,
            } => self
                .chain_mut(chain)?
                .set_signature_field(*index, *field, value),
        }
    }

    /// Serializable copy of the whole document as it stands now
    pub fn snapshot(&self) -> DocumentSnapshot {
        let fields = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.as_text().to_string()))
            .collect();

        let tables = self
            .tables
            .iter()
            .map(|(key, section)| (key.clone(), TableSnapshot::capture(section.table.as_ref())))
            .collect();

        let approvals = self
            .chains
            .iter()
            .map(|(key, section)| (key.clone(), section.chain.entries().to_vec()))
            .collect();

        DocumentSnapshot {
            id: self.id,
            form_id: self.form_id.clone(),
            title: self.title.clone(),
            fields,
            tables,
            approvals,
            attachments: self.attachments.clone(),
            custom_fields: self.custom_fields.clone(),
        }
    }
}

/// Rows flattened to ordered maps, with the `dynamicFields` bucket nested
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub rows: Vec<IndexMap<String, serde_json::Value>>,
    pub aggregates: IndexMap<String, f64>,
}

impl TableSnapshot {
    fn capture(table: &dyn LineItemTable) -> Self {
        let rows = (0..table.len())
            .map(|row| {
                let mut values: IndexMap<String, serde_json::Value> = table
                    .columns()
                    .iter()
                    .map(|spec| {
                        let value = table
                            .cell(row, &CellPath::fixed(spec.key))
                            .map(serde_json::Value::String)
                            .unwrap_or(serde_json::Value::Null);
                        (spec.key.to_string(), value)
                    })
                    .collect();
                let dynamic = table
                    .extension(row)
                    .and_then(|map| serde_json::to_value(map).ok())
                    .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
                values.insert(DYNAMIC_FIELDS_KEY.to_string(), dynamic);
                values
            })
            .collect();

        let aggregates = table
            .aggregates()
            .iter()
            .filter_map(|spec| table.aggregate(spec.key).map(|v| (spec.key.to_string(), v)))
            .collect();

        Self { rows, aggregates }
    }
}

/// Immutable copy of a document handed to submit handlers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub id: Uuid,
    pub form_id: String,
    pub title: String,
    pub fields: IndexMap<String, String>,
    pub tables: IndexMap<String, TableSnapshot>,
    pub approvals: IndexMap<String, Vec<ApprovalEntry>>,
    pub attachments: Vec<serde_json::Value>,
    pub custom_fields: Vec<serde_json::Value>,
}
