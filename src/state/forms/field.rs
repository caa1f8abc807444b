//! Form field value objects

use serde::{Deserialize, Serialize};

/// Input discipline of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    /// ISO-8601 calendar date (`YYYY-MM-DD`)
    Date,
}

/// Type-safe field values.
///
/// Numbers and dates keep the raw text the operator typed so a partially
/// entered value ("12." or "2024-0") survives between keystrokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Number(String),
    Date(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Number => FieldValue::Number(String::new()),
            FieldKind::Date => FieldValue::Date(String::new()),
        }
    }

    fn raw(&self) -> &str {
        match self {
            FieldValue::Text(s) | FieldValue::Number(s) | FieldValue::Date(s) => s,
        }
    }

    fn raw_mut(&mut self) -> &mut String {
        match self {
            FieldValue::Text(s) | FieldValue::Number(s) | FieldValue::Date(s) => s,
        }
    }
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: FieldValue,
    pub is_multiline: bool,
}

impl FormField {
    /// Create a new text field
    pub fn text(name: &str, label: &str, is_multiline: bool) -> Self {
        Self::new(name, label, FieldKind::Text, is_multiline)
    }

    /// Create a new numeric field
    pub fn number(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Number, false)
    }

    /// Create a new date field
    pub fn date(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Date, false)
    }

    fn new(name: &str, label: &str, kind: FieldKind, is_multiline: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: FieldValue::empty(kind),
            is_multiline,
        }
    }

    /// Builder-style initial value
    #[cfg(test)]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_text(value.into());
        self
    }

    pub fn kind(&self) -> FieldKind {
        match self.value {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    /// The canonical stored text, whatever the kind
    pub fn as_text(&self) -> &str {
        self.value.raw()
    }

    /// Replace the stored text, keeping the field kind
    pub fn set_text(&mut self, value: String) {
        *self.value.raw_mut() = value;
    }

    /// Whether a typed character is acceptable for this field kind
    pub fn accepts(&self, c: char) -> bool {
        accepts_char(self.kind(), c, self.is_multiline)
    }
}

/// Keystroke filter shared by scalar fields and table cells
pub fn accepts_char(kind: FieldKind, c: char, is_multiline: bool) -> bool {
    match kind {
        FieldKind::Text => c != '\n' || is_multiline,
        FieldKind::Number => c.is_ascii_digit() || matches!(c, '.' | '-' | ','),
        FieldKind::Date => c.is_ascii_digit() || c == '-',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod text_field {
        use super::*;

        #[test]
        fn test_new_text_field_is_empty() {
            let field = FormField::text("customer", "Customer", false);
            assert_eq!(field.name, "customer");
            assert_eq!(field.label, "Customer");
            assert_eq!(field.as_text(), "");
            assert_eq!(field.kind(), FieldKind::Text);
        }

        #[test]
        fn test_single_line_rejects_newline() {
            let field = FormField::text("customer", "Customer", false);
            assert!(field.accepts('A'));
            assert!(!field.accepts('\n'));
        }

        #[test]
        fn test_multiline_accepts_newline() {
            let field = FormField::text("notes", "Notes", true);
            assert!(field.accepts('\n'));
        }

        #[test]
        fn test_with_value() {
            let field = FormField::text("customer", "Customer", false).with_value("Acme");
            assert_eq!(field.as_text(), "Acme");
        }
    }

    mod number_field {
        use super::*;

        #[test]
        fn test_rejects_letters() {
            let field = FormField::number("qty", "Quantity");
            let kept: String = "1a2.5x".chars().filter(|c| field.accepts(*c)).collect();
            assert_eq!(kept, "12.5");
        }

        #[test]
        fn test_partial_input_is_kept() {
            let field = FormField::number("qty", "Quantity").with_value("12.");
            assert_eq!(field.as_text(), "12.");
        }

        #[test]
        fn test_set_text_keeps_kind() {
            let mut field = FormField::number("qty", "Quantity");
            field.set_text("7".to_string());
            assert_eq!(field.kind(), FieldKind::Number);
            assert_eq!(field.as_text(), "7");
        }
    }

    mod date_field {
        use super::*;

        #[test]
        fn test_accepts_digits_and_dashes() {
            let field = FormField::date("invoice_date", "Invoice Date");
            assert!(field.accepts('2'));
            assert!(field.accepts('-'));
            assert!(!field.accepts('/'));
            assert_eq!(field.kind(), FieldKind::Date);
        }
    }
}
