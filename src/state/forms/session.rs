//! One open form instance
//!
//! A session owns the document, the dynamic column registries of its
//! tables (kept beside the document, not inside it), the validation rules
//! and the current render mode.

use anyhow::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    render, ApprovalEntry, CellPath, ColumnRegistry, DocumentSnapshot, DynamicColumn, FieldPath,
    FieldView, FormDocument, FormError, RenderMode, SignatureData, SignatureField,
    ValidationRules,
};

/// Receipt returned by a submit handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            message: message.into(),
        }
    }
}

/// Caller-supplied submit callback
#[cfg_attr(test, mockall::automock)]
pub trait SubmitHandler {
    fn submit(&mut self, snapshot: &DocumentSnapshot) -> Result<Acknowledgement>;
}

/// Default handler: log the snapshot and acknowledge it
#[derive(Debug, Default)]
pub struct LoggingSubmitHandler;

impl SubmitHandler for LoggingSubmitHandler {
    fn submit(&mut self, snapshot: &DocumentSnapshot) -> Result<Acknowledgement> {
        let json = serde_json::to_string(snapshot)?;
        info!(
            form = %snapshot.form_id,
            document = %snapshot.id,
            bytes = json.len(),
            "form submitted"
        );
        debug!(snapshot = %json);
        Ok(Acknowledgement::new(format!("{} submitted", snapshot.title)))
    }
}

/// Signature attributes an operator fills in by hand
const TYPED_SIGNATURE_FIELDS: [SignatureField; 3] = [
    SignatureField::Name,
    SignatureField::Designation,
    SignatureField::Date,
];

pub struct FormSession {
    document: FormDocument,
    open: fn() -> FormDocument,
    rules: ValidationRules,
    registries: IndexMap<String, ColumnRegistry>,
    mode: RenderMode,
    roles_editable: bool,
}

impl FormSession {
    /// Open a fresh document in edit mode
    pub fn new(open: fn() -> FormDocument, rules: ValidationRules) -> Self {
        let document = open();
        let registries = document
            .tables()
            .map(|(key, _)| (key.to_string(), ColumnRegistry::new()))
            .collect();
        info!(form = %document.form_id(), "opened form");
        let mut session = Self {
            document,
            open,
            rules,
            registries,
            mode: RenderMode::Edit,
            roles_editable: true,
        };
        session.apply_role_lock();
        session
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        if self.mode != mode {
            info!(form = %self.document.form_id(), mode = mode.label(), "switched mode");
        }
        self.mode = mode;
        self.apply_role_lock();
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggle());
    }

    /// Allow or forbid renaming approval roles (only ever allowed in edit mode)
    pub fn set_roles_editable(&mut self, editable: bool) {
        self.roles_editable = editable;
        self.apply_role_lock();
    }

    fn apply_role_lock(&mut self) {
        let editable = self.roles_editable && self.mode.is_edit();
        for chain in self.document.chains_mut() {
            chain.set_editable(editable);
        }
    }

    /// Present the value at `path` in the current mode
    pub fn render(&self, path: &FieldPath) -> FieldView {
        render(&self.document, path, self.mode, &self.rules)
    }

    pub fn get(&self, path: &FieldPath) -> Option<String> {
        self.document.get(path)
    }

    /// Write a value. Dynamic cells must belong to a registered column.
    pub fn set(&mut self, path: &FieldPath, value: String) -> Result<(), FormError> {
        if let FieldPath::Cell {
            table,
            cell: CellPath::Dynamic(key),
            ..
        } = path
        {
            if !self.registry(table)?.contains(key) {
                return Err(FormError::UnknownColumn { key: key.clone() });
            }
        }
        self.document.set(path, value)
    }

    pub fn registry(&self, table: &str) -> Result<&ColumnRegistry, FormError> {
        self.registries
            .get(table)
            .ok_or_else(|| FormError::UnknownTable {
                key: table.to_string(),
            })
    }

    fn registry_mut(&mut self, table: &str) -> Result<&mut ColumnRegistry, FormError> {
        self.registries
            .get_mut(table)
            .ok_or_else(|| FormError::UnknownTable {
                key: table.to_string(),
            })
    }

    /// Add a dynamic column to `table`. `Ok(None)` means the label was blank.
    pub fn add_column(
        &mut self,
        table: &str,
        label: &str,
    ) -> Result<Option<DynamicColumn>, FormError> {
        self.registry_mut(table)?.add_column(label)
    }

    /// Drop a dynamic column descriptor. Values already entered stay in the rows.
    pub fn remove_column(
        &mut self,
        table: &str,
        key: &str,
    ) -> Result<Option<DynamicColumn>, FormError> {
        Ok(self.registry_mut(table)?.remove_column(key))
    }

    pub fn append_row(&mut self, table: &str) -> Result<usize, FormError> {
        Ok(self.document.table_mut(table)?.append_row())
    }

    pub fn remove_row(&mut self, table: &str, index: usize) -> Result<(), FormError> {
        self.document.table_mut(table)?.remove_row(index)
    }

    pub fn add_role(&mut self, chain: &str, default_name: &str) -> Result<usize, FormError> {
        Ok(self.document.chain_mut(chain)?.add_role(default_name))
    }

    pub fn remove_role(&mut self, chain: &str, index: usize) -> Result<ApprovalEntry, FormError> {
        self.document.chain_mut(chain)?.remove_role(index)
    }

    pub fn rename_role(
        &mut self,
        chain: &str,
        index: usize,
        new_name: &str,
    ) -> Result<(), FormError> {
        self.document.chain_mut(chain)?.rename_role(index, new_name)
    }

    pub fn set_signature_field(
        &mut self,
        chain: &str,
        index: usize,
        field: SignatureField,
        value: String,
    ) -> Result<(), FormError> {
        self.document
            .chain_mut(chain)?
            .set_signature_field(index, field, value)
    }

    pub fn set_signature_data(
        &mut self,
        chain: &str,
        index: usize,
        data: SignatureData,
    ) -> Result<(), FormError> {
        self.document.chain_mut(chain)?.set_signature_data(index, data)
    }

    pub fn set_attachments(&mut self, attachments: Vec<serde_json::Value>) {
        self.document.set_attachments(attachments);
    }

    pub fn set_custom_fields(&mut self, custom_fields: Vec<serde_json::Value>) {
        self.document.set_custom_fields(custom_fields);
    }

    /// Every path an operator can type into, in reading order
    pub fn editable_paths(&self) -> Vec<FieldPath> {
        let mut paths: Vec<FieldPath> = self
            .document
            .fields()
            .map(|f| FieldPath::field(&f.name))
            .collect();

        for (key, section) in self.document.tables() {
            let dynamic: Vec<&DynamicColumn> = self
                .registries
                .get(key)
                .map(|r| r.columns().collect())
                .unwrap_or_default();
            for row in 0..section.table.len() {
                for spec in section.table.columns().iter().filter(|c| c.is_editable()) {
                    paths.push(FieldPath::cell(key, row, CellPath::fixed(spec.key)));
                }
                for column in &dynamic {
                    paths.push(FieldPath::cell(key, row, CellPath::dynamic(&column.key)));
                }
            }
        }

        for (key, section) in self.document.chains() {
            for index in 0..section.chain.len() {
                if section.chain.is_editable() {
                    paths.push(FieldPath::role_name(key, index));
                }
                for field in TYPED_SIGNATURE_FIELDS {
                    paths.push(FieldPath::signature(key, index, field));
                }
            }
        }

        paths
    }

    /// All fields and fixed cells currently failing a rule
    pub fn validation_errors(&self) -> Vec<(FieldPath, String)> {
        self.editable_paths()
            .into_iter()
            .filter_map(|path| {
                let key = path.rule_key()?;
                let value = self.document.get(&path).unwrap_or_default();
                self.rules.check(&key, &value).map(|msg| (path, msg))
            })
            .collect()
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        self.document.snapshot()
    }

    /// Hand a snapshot to `handler`. On acknowledgement the document is
    /// replaced by a freshly opened one; on any failure it is left as is.
    pub fn submit(&mut self, handler: &mut dyn SubmitHandler) -> Result<Acknowledgement> {
        let failures = self.validation_errors();
        if !failures.is_empty() {
            warn!(
                form = %self.document.form_id(),
                count = failures.len(),
                "submit blocked by validation"
            );
            return Err(FormError::ValidationFailed {
                count: failures.len(),
            }
            .into());
        }

        let snapshot = self.document.snapshot();
        let ack = handler.submit(&snapshot)?;
        info!(form = %snapshot.form_id, ack = %ack.id, "submission acknowledged");
        self.reset();
        Ok(ack)
    }

    /// Discard the document and open a fresh one. Column registries survive.
    pub fn reset(&mut self) {
        self.document = (self.open)();
        for (key, _) in self.document.tables() {
            if !self.registries.contains_key(key) {
                self.registries.insert(key.to_string(), ColumnRegistry::new());
            }
        }
        self.apply_role_lock();
    }

    /// The whole document rendered in print mode as plain text
    pub fn print_text(&self, placeholder: &str) -> String {
        let print = |path: &FieldPath| {
            render(&self.document, path, RenderMode::Print, &self.rules)
                .display(placeholder)
                .to_string()
        };

        let mut out = String::new();
        out.push_str(self.document.title());
        out.push('\n');
        out.push_str(&"=".repeat(self.document.title().chars().count()));
        out.push('\n');

        for field in self.document.fields() {
            out.push_str(&format!("{}: {}\n", field.label, print(&FieldPath::field(&field.name))));
        }

        for (key, section) in self.document.tables() {
            let table = section.table.as_ref();
            let dynamic: Vec<&DynamicColumn> = self
                .registries
                .get(key)
                .map(|r| r.columns().collect())
                .unwrap_or_default();

            out.push_str(&format!("\n[{}]\n", section.label));
            let mut header: Vec<&str> = table.columns().iter().map(|c| c.label).collect();
            header.extend(dynamic.iter().map(|c| c.label.as_str()));
            out.push_str(&header.join(" | "));
            out.push('\n');

            for row in 0..table.len() {
                let mut cells: Vec<String> = table
                    .columns()
                    .iter()
                    .map(|c| print(&FieldPath::cell(key, row, CellPath::fixed(c.key))))
                    .collect();
                cells.extend(
                    dynamic
                        .iter()
                        .map(|c| print(&FieldPath::cell(key, row, CellPath::dynamic(&c.key)))),
                );
                out.push_str(&cells.join(" | "));
                out.push('\n');
            }

            for aggregate in table.aggregates() {
                out.push_str(&format!(
                    "{}: {}\n",
                    aggregate.label,
                    print(&FieldPath::aggregate(key, aggregate.key))
                ));
            }
        }

        for (key, section) in self.document.chains() {
            out.push_str(&format!("\n[{}]\n", section.label));
            for index in 0..section.chain.len() {
                out.push_str(&format!("{}\n", print(&FieldPath::role_name(key, index))));
                for field in SignatureField::ALL {
                    let path = FieldPath::signature(key, index, field);
                    let text = match field {
                        SignatureField::SignatureData if self.document.get(&path).is_some() => {
                            "[signed]".to_string()
                        }
                        _ => print(&path),
                    };
                    out.push_str(&format!("  {}: {}\n", field.label(), text));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::line_items::tests::TestLine;
    use crate::state::forms::{ApprovalChain, FormField, LineItemCollection, Rule};

    fn open_test_form() -> FormDocument {
        FormDocument::new("purchase-order", "Purchase Order")
            .with_field(FormField::text("vendor", "Vendor", false))
            .with_table("lines", "Order Lines", LineItemCollection::<TestLine>::seeded(1))
            .with_chain(
                "approvals",
                "Approvals",
                ApprovalChain::with_roles(&["Prepared By", "Reviewed By", "Approved By"]),
            )
    }

    fn session() -> FormSession {
        FormSession::new(open_test_form, ValidationRules::new())
    }

    fn strict_session() -> FormSession {
        FormSession::new(
            open_test_form,
            ValidationRules::new()
                .rule("vendor", Rule::Required)
                .rule("lines.quantity", Rule::Numeric),
        )
    }

    fn item(session: &FormSession, row: usize) -> Option<String> {
        session.get(&FieldPath::cell("lines", row, CellPath::fixed("item")))
    }

    fn set_item(session: &mut FormSession, row: usize, value: &str) {
        session
            .set(&FieldPath::cell("lines", row, CellPath::fixed("item")), value.to_string())
            .unwrap();
    }

    fn roles(session: &FormSession) -> Vec<String> {
        session
            .document()
            .chain("approvals")
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.role_name.clone())
            .collect()
    }

    mod scenarios {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_append_two_rows_then_remove_middle() {
            let mut session = session();
            assert_eq!(session.document().table("lines").unwrap().len(), 1);
            set_item(&mut session, 0, "first");

            let second = session.append_row("lines").unwrap();
            set_item(&mut session, second, "second");
            let third = session.append_row("lines").unwrap();
            set_item(&mut session, third, "third");

            session.remove_row("lines", 1).unwrap();

            assert_eq!(session.document().table("lines").unwrap().len(), 2);
            assert_eq!(item(&session, 0), Some("first".to_string()));
            assert_eq!(item(&session, 1), Some("third".to_string()));
        }

        #[test]
        fn test_dynamic_column_value_only_on_new_row() {
            let mut session = session();
            session.add_column("lines", "Batch Ref").unwrap();
            let row = session.append_row("lines").unwrap();
            session
                .set(
                    &FieldPath::cell("lines", row, CellPath::dynamic("BatchRef")),
                    "B-100".to_string(),
                )
                .unwrap();

            let table = session.document().table("lines").unwrap();
            for other in 0..row {
                assert!(!table.extension(other).unwrap().contains_key("BatchRef"));
            }
            let json = serde_json::to_value(table.extension(row).unwrap()).unwrap();
            assert_eq!(json, serde_json::json!({"BatchRef": "B-100"}));
        }

        #[test]
        fn test_add_role_then_remove_second() {
            let mut session = session();
            session.add_role("approvals", "Custom Signature").unwrap();
            session.remove_role("approvals", 1).unwrap();
            assert_eq!(
                roles(&session),
                vec!["Prepared By", "Approved By", "Custom Signature"]
            );
        }
    }

    mod dynamic_columns {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_added_column_does_not_seed_existing_rows() {
            let mut session = session();
            session.append_row("lines").unwrap();
            session.add_column("lines", "Foo").unwrap();
            session
                .set(&FieldPath::cell("lines", 0, CellPath::dynamic("Foo")), "x".to_string())
                .unwrap();

            assert_eq!(
                session.get(&FieldPath::cell("lines", 1, CellPath::dynamic("Foo"))),
                None
            );
        }

        #[test]
        fn test_removing_column_keeps_row_values() {
            let mut session = session();
            session.add_column("lines", "Foo").unwrap();
            let path = FieldPath::cell("lines", 0, CellPath::dynamic("Foo"));
            session.set(&path, "kept".to_string()).unwrap();

            let removed = session.remove_column("lines", "Foo").unwrap();
            assert_eq!(removed.map(|c| c.key), Some("Foo".to_string()));

            let table = session.document().table("lines").unwrap();
            assert_eq!(table.extension(0).unwrap().get("Foo"), Some("kept"));
            assert_eq!(session.get(&path), Some("kept".to_string()));
        }

        #[test]
        fn test_unregistered_dynamic_key_is_refused() {
            let mut session = session();
            let result = session.set(
                &FieldPath::cell("lines", 0, CellPath::dynamic("Ghost")),
                "x".to_string(),
            );
            assert_eq!(
                result,
                Err(FormError::UnknownColumn {
                    key: "Ghost".to_string()
                })
            );
        }

        #[test]
        fn test_duplicate_column_leaves_document_untouched() {
            let mut session = session();
            session.add_column("lines", "Risk Level").unwrap();
            let before = session.snapshot();
            let result = session.add_column("lines", "Risk  Level");
            assert!(matches!(result, Err(FormError::DuplicateColumn { .. })));
            assert_eq!(session.snapshot(), before);
            assert_eq!(session.registry("lines").unwrap().len(), 1);
        }

        #[test]
        fn test_unknown_table() {
            let mut session = session();
            assert!(matches!(
                session.add_column("nope", "Foo"),
                Err(FormError::UnknownTable { .. })
            ));
        }

        #[test]
        fn test_dynamic_columns_appear_in_editable_paths() {
            let mut session = session();
            session.add_column("lines", "Foo").unwrap();
            let paths = session.editable_paths();
            assert!(paths.contains(&FieldPath::cell("lines", 0, CellPath::dynamic("Foo"))));
            assert!(!paths.contains(&FieldPath::cell("lines", 0, CellPath::fixed("amount"))));
        }
    }

    mod mode_switching {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_toggle_never_changes_data() {
            let mut session = session();
            session
                .set(&FieldPath::field("vendor"), "Globex".to_string())
                .unwrap();
            session.add_column("lines", "Foo").unwrap();
            session
                .set(&FieldPath::cell("lines", 0, CellPath::dynamic("Foo")), "1".to_string())
                .unwrap();
            let before = session.snapshot();

            let paths = session.editable_paths();
            let edit_values: Vec<Option<String>> = paths
                .iter()
                .map(|p| session.render(p).value().map(str::to_string))
                .collect();

            session.toggle_mode();
            assert_eq!(session.mode(), RenderMode::Print);
            let print_values: Vec<Option<String>> = paths
                .iter()
                .map(|p| session.render(p).value().map(str::to_string))
                .collect();

            session.toggle_mode();
            assert_eq!(edit_values, print_values);
            assert_eq!(session.snapshot(), before);
        }

        #[test]
        fn test_print_mode_locks_role_names() {
            let mut session = session();
            session.set_mode(RenderMode::Print);
            assert_eq!(
                session.rename_role("approvals", 0, "X"),
                Err(FormError::RoleNamesLocked)
            );
            session.set_mode(RenderMode::Edit);
            session.rename_role("approvals", 0, "X").unwrap();
            assert_eq!(roles(&session)[0], "X");
        }

        #[test]
        fn test_roles_locked_by_configuration() {
            let mut session = session();
            session.set_roles_editable(false);
            assert!(!session
                .editable_paths()
                .contains(&FieldPath::role_name("approvals", 0)));
            assert_eq!(
                session.rename_role("approvals", 0, "X"),
                Err(FormError::RoleNamesLocked)
            );
        }
    }

    mod signatures {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_entries_are_independent() {
            let mut session = session();
            session
                .set_signature_field("approvals", 0, SignatureField::Name, "A".to_string())
                .unwrap();
            let before = session.document().chain("approvals").unwrap().entry(0).cloned();

            session
                .set_signature_field("approvals", 1, SignatureField::Name, "B".to_string())
                .unwrap();
            session
                .set_signature_data("approvals", 1, SignatureData::new("typed:B"))
                .unwrap();

            let after = session.document().chain("approvals").unwrap().entry(0).cloned();
            assert_eq!(before, after);
        }
    }

    mod validation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_collects_failures() {
            let mut session = strict_session();
            session
                .set(&FieldPath::cell("lines", 0, CellPath::fixed("quantity")), "x".to_string())
                .unwrap();
            let errors = session.validation_errors();
            let paths: Vec<String> = errors.iter().map(|(p, _)| p.to_string()).collect();
            assert_eq!(paths, vec!["vendor", "lines[0].quantity"]);
        }

        #[test]
        fn test_failure_does_not_block_editing() {
            let mut session = strict_session();
            assert!(!session.validation_errors().is_empty());
            set_item(&mut session, 0, "still editable");
            assert_eq!(item(&session, 0), Some("still editable".to_string()));
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;
        use crate::state::forms::MockSubmitHandler;

        #[test]
        fn test_submit_passes_snapshot_and_reopens() {
            let mut session = session();
            session
                .set(&FieldPath::field("vendor"), "Globex".to_string())
                .unwrap();
            session.append_row("lines").unwrap();
            session.add_column("lines", "Foo").unwrap();
            let old_id = session.document().id();

            let mut handler = MockSubmitHandler::new();
            handler
                .expect_submit()
                .withf(|snapshot| {
                    snapshot.fields["vendor"] == "Globex"
                        && snapshot.tables["lines"].rows.len() == 2
                })
                .times(1)
                .returning(|_| Ok(Acknowledgement::new("received")));

            let ack = session.submit(&mut handler).unwrap();
            assert_eq!(ack.message, "received");

            assert_ne!(session.document().id(), old_id);
            assert_eq!(session.get(&FieldPath::field("vendor")), Some(String::new()));
            assert_eq!(session.document().table("lines").unwrap().len(), 1);
            assert!(session.registry("lines").unwrap().contains("Foo"));
        }

        #[test]
        fn test_handler_failure_keeps_document() {
            let mut session = session();
            session
                .set(&FieldPath::field("vendor"), "Globex".to_string())
                .unwrap();
            let before = session.snapshot();

            let mut handler = MockSubmitHandler::new();
            handler
                .expect_submit()
                .times(1)
                .returning(|_| Err(anyhow::anyhow!("offline")));

            assert!(session.submit(&mut handler).is_err());
            assert_eq!(session.snapshot(), before);
        }

        #[test]
        fn test_validation_blocks_submit() {
            let mut session = strict_session();
            let mut handler = MockSubmitHandler::new();
            handler.expect_submit().never();

            let err = session.submit(&mut handler).unwrap_err();
            assert_eq!(
                err.downcast_ref::<FormError>(),
                Some(&FormError::ValidationFailed { count: 1 })
            );
        }

        #[test]
        fn test_logging_handler_acknowledges() {
            let mut session = session();
            let ack = session.submit(&mut LoggingSubmitHandler).unwrap();
            assert_eq!(ack.message, "Purchase Order submitted");
        }
    }

    mod print_text {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_placeholders_and_columns() {
            let mut session = session();
            session.add_column("lines", "Batch Ref").unwrap();
            set_item(&mut session, 0, "Bolts");
            session
                .set_signature_data("approvals", 0, SignatureData::new("typed:A"))
                .unwrap();

            let text = session.print_text("___");
            assert!(text.starts_with("Purchase Order\n==============\n"));
            assert!(text.contains("Vendor: ___\n"));
            assert!(text.contains("Item | Qty | Rate | Amount | Batch Ref\n"));
            assert!(text.contains("Bolts | ___ | ___ | ___ | ___\n"));
            assert!(text.contains("Total: 0.00\n"));
            assert!(text.contains("Prepared By\n  Name: ___\n"));
            assert!(text.contains("  Signature: [signed]\n"));
        }

        #[test]
        fn test_does_not_change_mode_or_data() {
            let session = session();
            let before = session.snapshot();
            session.print_text("_");
            assert_eq!(session.mode(), RenderMode::Edit);
            assert_eq!(session.snapshot(), before);
        }
    }
}
