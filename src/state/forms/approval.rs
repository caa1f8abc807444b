//! Approval role chain
//!
//! An ordered list of sign-off slots. Role names are free text and may
//! repeat, so entries are addressed by position only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::FormError;

/// Opaque signature payload produced by an external capture widget
/// (a data URL, stroke data, a typed mark). Only ever copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureData(String);

impl SignatureData {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One attribute of a signature record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureField {
    Name,
    Designation,
    Date,
    SignatureData,
}

impl SignatureField {
    pub const ALL: [SignatureField; 4] = [
        SignatureField::Name,
        SignatureField::Designation,
        SignatureField::Date,
        SignatureField::SignatureData,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Designation => "designation",
            Self::Date => "date",
            Self::SignatureData => "signatureData",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Designation => "Designation",
            Self::Date => "Date",
            Self::SignatureData => "Signature",
        }
    }
}

/// Every attribute is optional; an unfilled one prints as a placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub date: Option<String>,
    pub signature_data: Option<SignatureData>,
}

impl SignatureRecord {
    pub fn get(&self, field: SignatureField) -> Option<&str> {
        match field {
            SignatureField::Name => self.name.as_deref(),
            SignatureField::Designation => self.designation.as_deref(),
            SignatureField::Date => self.date.as_deref(),
            SignatureField::SignatureData => {
                self.signature_data.as_ref().map(SignatureData::as_str)
            }
        }
    }

    /// Set one attribute. An empty value clears it.
    pub fn set(&mut self, field: SignatureField, value: String) {
        let value = (!value.is_empty()).then_some(value);
        match field {
            SignatureField::Name => self.name = value,
            SignatureField::Designation => self.designation = value,
            SignatureField::Date => self.date = value,
            SignatureField::SignatureData => self.signature_data = value.map(SignatureData),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature_data.is_some()
    }
}

/// One named slot in the chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEntry {
    pub role_name: String,
    pub signature: SignatureRecord,
}

impl ApprovalEntry {
    pub fn new(role_name: &str) -> Self {
        Self {
            role_name: role_name.to_string(),
            signature: SignatureRecord::default(),
        }
    }
}

/// Ordered sign-off chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalChain {
    entries: Vec<ApprovalEntry>,
    /// Whether role names may be changed
    editable: bool,
}

impl Default for ApprovalChain {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            editable: true,
        }
    }
}

impl ApprovalChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain seeded with fixed roles, each with an empty signature
    pub fn with_roles(roles: &[&str]) -> Self {
        Self {
            entries: roles.iter().map(|r| ApprovalEntry::new(r)).collect(),
            editable: true,
        }
    }

    pub fn entries(&self) -> &[ApprovalEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&ApprovalEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Append a role with an empty signature, returning its index
    pub fn add_role(&mut self, default_name: &str) -> usize {
        self.entries.push(ApprovalEntry::new(default_name));
        debug!(role = default_name, "added approval role");
        self.entries.len() - 1
    }

    /// Remove the entry at `index`; later entries shift down by one
    pub fn remove_role(&mut self, index: usize) -> Result<ApprovalEntry, FormError> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        debug!(index, role = %removed.role_name, "removed approval role");
        Ok(removed)
    }

    /// Rename a role. Refused while the chain is locked.
    pub fn rename_role(&mut self, index: usize, new_name: &str) -> Result<(), FormError> {
        if !self.editable {
            return Err(FormError::RoleNamesLocked);
        }
        self.check_index(index)?;
        self.entries[index].role_name = new_name.to_string();
        Ok(())
    }

    /// Set one attribute of one entry's signature record
    pub fn set_signature_field(
        &mut self,
        index: usize,
        field: SignatureField,
        value: String,
    ) -> Result<(), FormError> {
        self.check_index(index)?;
        self.entries[index].signature.set(field, value);
        Ok(())
    }

    /// Store data handed over by the signature capture widget
    pub fn set_signature_data(
        &mut self,
        index: usize,
        data: SignatureData,
    ) -> Result<(), FormError> {
        self.check_index(index)?;
        self.entries[index].signature.signature_data = Some(data);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(FormError::RoleOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}
