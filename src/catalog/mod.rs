//! Catalog of printable business forms
//!
//! Each form is a thin instantiation of the shared model: a few scalar
//! fields, one line-item table with a typed row, a seeded sign-off chain
//! and a rule set.

mod asset_register;
mod food_safety;
mod tax_invoice;

use crate::state::{FormDocument, FormSession, ValidationRules};

/// Static description of one form in the catalog
#[derive(Debug, Clone, Copy)]
pub struct FormDefinition {
    pub id: &'static str,
    pub title: &'static str,
    /// Section shown in the sidebar (e.g. "Billing")
    pub category: &'static str,
    pub open: fn() -> FormDocument,
    pub rules: fn() -> ValidationRules,
    /// Whether operators may rename the sign-off roles
    pub roles_editable: bool,
}

impl FormDefinition {
    /// Start a new session on this form
    pub fn start(&self) -> FormSession {
        let mut session = FormSession::new(self.open, (self.rules)());
        session.set_roles_editable(self.roles_editable);
        session
    }
}

const FORMS: &[FormDefinition] = &[
    tax_invoice::DEFINITION,
    asset_register::DEFINITION,
    food_safety::DEFINITION,
];

/// All forms in sidebar order
pub fn all() -> &'static [FormDefinition] {
    FORMS
}

/// Position of a form in the catalog, if it exists
pub fn position(id: &str) -> Option<usize> {
    FORMS.iter().position(|f| f.id == id)
}
