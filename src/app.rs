//! Application state and core logic

use crate::catalog;
use crate::config::FormdeskConfig;
use crate::platform::is_shortcut;
use crate::state::{
    accepts_char, AppState, CellPath, FieldKind, FieldPath, FormError, FormSession,
    LoggingSubmitHandler, Prompt, RenderMode, SignatureData, SignatureField, SubmitHandler,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Second Ctrl+C within this window quits
const QUIT_WINDOW: Duration = Duration::from_millis(1500);

/// Shortcuts that change rows, columns, roles or signatures
const STRUCTURAL_SHORTCUTS: [char; 7] = ['r', 'd', 'k', 'x', 'a', 'e', 'g'];

/// Default name for roles added from the keyboard
const NEW_ROLE_NAME: &str = "New Role";

/// Main application struct
pub struct App {
    /// Navigation, prompt and error state
    pub state: AppState,
    /// One open session per catalog form, in catalog order
    pub sessions: Vec<FormSession>,
    pub config: FormdeskConfig,
    submitter: Box<dyn SubmitHandler>,
    /// Whether the app should quit
    quit: bool,
    /// Transient status message (copy, submit, refusals)
    pub copy_message: Option<String>,
    /// Timestamp of last Ctrl+C press for double-tap quit
    pub last_ctrl_c: Option<Instant>,
}

impl App {
    /// Create a new App instance
    pub fn new(config: FormdeskConfig) -> Self {
        Self::with_handler(config, Box::new(LoggingSubmitHandler))
    }

    /// Create an App that submits through `submitter`
    pub fn with_handler(config: FormdeskConfig, submitter: Box<dyn SubmitHandler>) -> Self {
        let sessions = catalog::all()
            .iter()
            .map(|definition| {
                let mut session = definition.start();
                if !config.roles_editable() {
                    session.set_roles_editable(false);
                }
                if config.start_in_print_mode() {
                    session.set_mode(RenderMode::Print);
                }
                session
            })
            .collect();

        let mut state = AppState::default();
        if let Some(id) = &config.default_form {
            match catalog::position(id) {
                Some(index) => state.select_form(index),
                None => state.push_error(format!("Unknown form '{id}' in config")),
            }
        }

        Self {
            state,
            sessions,
            config,
            submitter,
            quit: false,
            copy_message: None,
            last_ctrl_c: None,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    pub fn session(&self) -> &FormSession {
        &self.sessions[self.state.selected_form]
    }

    fn session_mut(&mut self) -> &mut FormSession {
        &mut self.sessions[self.state.selected_form]
    }

    /// Path of the value that has keyboard focus
    pub fn focused_path(&self) -> Option<FieldPath> {
        self.session().editable_paths().get(self.state.focus).cloned()
    }

    fn focus_count(&self) -> usize {
        self.session().editable_paths().len()
    }

    /// Move focus onto `path` if it is editable
    fn focus_on(&mut self, path: &FieldPath) {
        if let Some(index) = self.session().editable_paths().iter().position(|p| p == path) {
            self.state.focus = index;
        }
    }

    /// Table under focus, or the form's first table
    fn target_table(&self) -> Option<String> {
        self.focused_path()
            .and_then(|p| p.table().map(str::to_string))
            .or_else(|| self.session().document().tables().next().map(|(k, _)| k.to_string()))
    }

    /// Chain under focus, or the form's first chain
    fn target_chain(&self) -> Option<String> {
        self.focused_path()
            .and_then(|p| p.chain().map(str::to_string))
            .or_else(|| self.session().document().chains().next().map(|(k, _)| k.to_string()))
    }

    /// Report a refused mutation and keep going
    fn report<T>(&mut self, result: Result<T, FormError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push_error(e.to_string());
                None
            }
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_ctrl_c();
            return Ok(());
        }
        self.last_ctrl_c = None;

        // Prompt dialog (modal)
        if self.state.prompt.is_some() {
            self.handle_prompt_key(key);
            return Ok(());
        }

        // Clear any status messages on key press
        self.copy_message = None;

        if is_shortcut(key.modifiers) {
            if let KeyCode::Char(c) = key.code {
                return self.handle_shortcut(c.to_ascii_lowercase());
            }
        }

        let count = self.focus_count();
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.state.next_focus(count),
            KeyCode::BackTab | KeyCode::Up => self.state.prev_focus(count),
            KeyCode::PageDown => self.state.next_form(self.sessions.len()),
            KeyCode::PageUp => self.state.prev_form(self.sessions.len()),
            KeyCode::Esc => {
                if !self.session().mode().is_edit() {
                    self.session_mut().set_mode(RenderMode::Edit);
                }
            }
            KeyCode::Enter => {
                if self.focused_is_multiline() {
                    self.input_char('\n');
                } else {
                    self.state.next_focus(count);
                }
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) => self.input_char(c),
            _ => {}
        }

        Ok(())
    }

    fn handle_ctrl_c(&mut self) {
        let now = Instant::now();
        match self.last_ctrl_c {
            Some(prev) if now.duration_since(prev) < QUIT_WINDOW => self.quit = true,
            _ => {
                self.last_ctrl_c = Some(now);
                self.copy_message = Some("Press Ctrl+C again to quit".to_string());
            }
        }
    }

    fn handle_shortcut(&mut self, c: char) -> Result<()> {
        if STRUCTURAL_SHORTCUTS.contains(&c) && !self.session().mode().is_edit() {
            debug!(shortcut = %c, "ignored in print mode");
            self.copy_message = Some("Print view is read-only (Esc to edit)".to_string());
            return Ok(());
        }
        match c {
            'p' => {
                self.session_mut().toggle_mode();
                let count = self.focus_count();
                self.state.clamp_focus(count);
            }
            'r' => self.add_row(),
            'd' => self.remove_focused_row(),
            'k' => match self.target_table() {
                Some(table) => self.state.prompt = Some(Prompt::add_column(&table)),
                None => self.copy_message = Some("This form has no table".to_string()),
            },
            'x' => self.remove_focused_column(),
            'a' => self.add_role(),
            'e' => self.remove_focused_role(),
            'g' => self.sign_focused_role(),
            's' => self.submit(),
            'y' => self.copy_print_text(),
            _ => {}
        }
        Ok(())
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.state.prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.prompt = None,
            KeyCode::Backspace => prompt.pop_char(),
            KeyCode::Char(c) => prompt.push_char(c),
            KeyCode::Enter => {
                if let Some(prompt) = self.state.prompt.take() {
                    self.confirm_prompt(prompt);
                }
            }
            _ => {}
        }
    }

    fn confirm_prompt(&mut self, prompt: Prompt) {
        match prompt {
            Prompt::AddColumn { table, input } => {
                let result = self.session_mut().add_column(&table, &input);
                if let Some(Some(column)) = self.report(result) {
                    self.copy_message = Some(format!("Added column {}", column.label));
                }
            }
        }
    }

    fn focused_is_multiline(&self) -> bool {
        match self.focused_path() {
            Some(FieldPath::Field(name)) => self
                .session()
                .document()
                .field(&name)
                .is_some_and(|f| f.is_multiline),
            _ => false,
        }
    }

    /// Keystroke filter for the value at `path`
    fn accepts(&self, path: &FieldPath, c: char) -> bool {
        let doc = self.session().document();
        match path {
            FieldPath::Field(name) => doc.field(name).is_some_and(|f| f.accepts(c)),
            FieldPath::Cell {
                table,
                cell: CellPath::Fixed(key),
                ..
            } => doc
                .table(table)
                .and_then(|t| t.columns().iter().find(|spec| spec.key == key))
                .is_some_and(|spec| spec.accepts(c)),
            FieldPath::Signature {
                field: SignatureField::Date,
                ..
            } => accepts_char(FieldKind::Date, c, false),
            FieldPath::Signature {
                field: SignatureField::SignatureData,
                ..
            } => false,
            _ => accepts_char(FieldKind::Text, c, false),
        }
    }

    fn input_char(&mut self, c: char) {
        let Some(path) = self.focused_path() else {
            return;
        };
        if !self.session().render(&path).is_editable() || !self.accepts(&path, c) {
            return;
        }
        let mut value = self.session().get(&path).unwrap_or_default();
        value.push(c);
        let result = self.session_mut().set(&path, value);
        self.report(result);
    }

    fn backspace(&mut self) {
        let Some(path) = self.focused_path() else {
            return;
        };
        if !self.session().render(&path).is_editable() {
            return;
        }
        let Some(mut value) = self.session().get(&path) else {
            return;
        };
        if value.pop().is_some() {
            let result = self.session_mut().set(&path, value);
            self.report(result);
        }
    }

    fn add_row(&mut self) {
        let Some(table) = self.target_table() else {
            self.copy_message = Some("This form has no table".to_string());
            return;
        };
        let result = self.session_mut().append_row(&table);
        if let Some(row) = self.report(result) {
            let first = self.session().editable_paths().into_iter().find(|p| {
                matches!(p, FieldPath::Cell { table: t, row: r, .. } if *t == table && *r == row)
            });
            if let Some(path) = first {
                self.focus_on(&path);
            }
        }
    }

    fn remove_focused_row(&mut self) {
        let Some(FieldPath::Cell { table, row, .. }) = self.focused_path() else {
            self.copy_message = Some("Focus a row to remove it".to_string());
            return;
        };
        let result = self.session_mut().remove_row(&table, row);
        if self.report(result).is_some() {
            let count = self.focus_count();
            self.state.clamp_focus(count);
        }
    }

    fn remove_focused_column(&mut self) {
        let Some(FieldPath::Cell {
            table,
            cell: CellPath::Dynamic(key),
            ..
        }) = self.focused_path()
        else {
            self.copy_message = Some("Focus an added column to remove it".to_string());
            return;
        };
        let result = self.session_mut().remove_column(&table, &key);
        if let Some(Some(column)) = self.report(result) {
            self.copy_message = Some(format!("Removed column {}", column.label));
            let count = self.focus_count();
            self.state.clamp_focus(count);
        }
    }

    fn add_role(&mut self) {
        let Some(chain) = self.target_chain() else {
            return;
        };
        let result = self.session_mut().add_role(&chain, NEW_ROLE_NAME);
        if let Some(index) = self.report(result) {
            let path = if self.session().document().chain(&chain).is_some_and(|c| c.is_editable()) {
                FieldPath::role_name(&chain, index)
            } else {
                FieldPath::signature(&chain, index, SignatureField::Name)
            };
            self.focus_on(&path);
        }
    }

    fn focused_role(&self) -> Option<(String, usize)> {
        match self.focused_path()? {
            FieldPath::RoleName { chain, index } | FieldPath::Signature { chain, index, .. } => {
                Some((chain, index))
            }
            _ => None,
        }
    }

    fn remove_focused_role(&mut self) {
        let Some((chain, index)) = self.focused_role() else {
            self.copy_message = Some("Focus a role to remove it".to_string());
            return;
        };
        let result = self.session_mut().remove_role(&chain, index);
        if let Some(entry) = self.report(result) {
            self.copy_message = Some(format!("Removed {}", entry.role_name));
            let count = self.focus_count();
            self.state.clamp_focus(count);
        }
    }

    /// Capture a typed signature for the focused role from its name
    fn sign_focused_role(&mut self) {
        let Some((chain, index)) = self.focused_role() else {
            self.copy_message = Some("Focus a role to sign it".to_string());
            return;
        };
        let name = self
            .session()
            .get(&FieldPath::signature(&chain, index, SignatureField::Name))
            .unwrap_or_default();
        if name.trim().is_empty() {
            self.push_error("Enter a name before signing");
            return;
        }
        let data = SignatureData::new(format!("typed:{}", name.trim()));
        let result = self.session_mut().set_signature_data(&chain, index, data);
        if self.report(result).is_some() {
            debug!(chain = %chain, index, "captured signature");
            self.copy_message = Some(format!("Signed as {}", name.trim()));
        }
    }

    fn submit(&mut self) {
        let index = self.state.selected_form;
        let result = self.sessions[index].submit(self.submitter.as_mut());
        match result {
            Ok(ack) => {
                self.state.focus = 0;
                self.copy_message = Some(ack.message);
            }
            Err(e) => {
                let mut message = e.to_string();
                if matches!(
                    e.downcast_ref::<FormError>(),
                    Some(FormError::ValidationFailed { .. })
                ) {
                    for (path, error) in self.session().validation_errors() {
                        message.push_str(&format!("\n{path}: {error}"));
                    }
                }
                self.push_error(message);
            }
        }
    }

    fn copy_print_text(&mut self) {
        let text = self.session().print_text(self.config.placeholder());
        match self.copy_to_clipboard(&text) {
            Ok(()) => {
                info!(form = %self.session().document().form_id(), "copied print text");
                self.copy_message = Some("Copied print view".to_string());
            }
            Err(e) => self.push_error(format!("Failed to copy: {e}")),
        }
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        use arboard::Clipboard;
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Acknowledgement, MockSubmitHandler};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app() -> App {
        App::new(FormdeskConfig::default())
    }

    fn press(app: &mut App, keys: &[KeyEvent]) {
        for k in keys {
            app.handle_key(*k).unwrap();
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn focus(app: &mut App, path: &FieldPath) {
        app.focus_on(path);
        assert_eq!(app.focused_path().as_ref(), Some(path));
    }

    mod startup {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_one_session_per_form() {
            let app = app();
            assert_eq!(app.sessions.len(), catalog::all().len());
            assert_eq!(app.state.selected_form, 0);
            assert!(!app.should_quit());
        }

        #[test]
        fn test_default_form_from_config() {
            let app = App::new(FormdeskConfig {
                default_form: Some("asset-register".to_string()),
                ..Default::default()
            });
            assert_eq!(app.session().document().form_id(), "asset-register");
        }

        #[test]
        fn test_unknown_default_form_is_reported() {
            let app = App::new(FormdeskConfig {
                default_form: Some("nope".to_string()),
                ..Default::default()
            });
            assert_eq!(app.state.selected_form, 0);
            assert!(app.state.has_errors());
        }

        #[test]
        fn test_print_mode_and_role_lock_from_config() {
            let mut app = App::new(FormdeskConfig {
                start_in_print_mode: Some(true),
                roles_editable: Some(false),
                ..Default::default()
            });
            for session in &app.sessions {
                assert_eq!(session.mode(), RenderMode::Print);
                for (_, section) in session.document().chains() {
                    assert!(!section.chain.is_editable());
                }
            }
            // the lock outlives the switch back to edit mode
            for session in &mut app.sessions {
                session.set_mode(RenderMode::Edit);
                for (_, section) in session.document().chains() {
                    assert!(!section.chain.is_editable());
                }
            }
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_typing_edits_focused_field() {
            let mut app = app();
            type_text(&mut app, "INV-1");
            assert_eq!(
                app.session().get(&FieldPath::field("invoice_no")),
                Some("INV-1".to_string())
            );
            press(&mut app, &[key(KeyCode::Backspace)]);
            assert_eq!(
                app.session().get(&FieldPath::field("invoice_no")),
                Some("INV-".to_string())
            );
        }

        #[test]
        fn test_number_cell_filters_letters() {
            let mut app = app();
            let path = FieldPath::cell("lines", 0, CellPath::fixed("quantity"));
            focus(&mut app, &path);
            type_text(&mut app, "1a2");
            assert_eq!(app.session().get(&path), Some("12".to_string()));
        }

        #[test]
        fn test_tab_wraps_around() {
            let mut app = app();
            let count = app.session().editable_paths().len();
            for _ in 0..count {
                press(&mut app, &[key(KeyCode::Tab)]);
            }
            assert_eq!(app.state.focus, 0);
            press(&mut app, &[key(KeyCode::BackTab)]);
            assert_eq!(app.state.focus, count - 1);
        }

        #[test]
        fn test_enter_in_multiline_inserts_newline() {
            let mut app = app();
            let path = FieldPath::field("notes");
            focus(&mut app, &path);
            type_text(&mut app, "a");
            press(&mut app, &[key(KeyCode::Enter)]);
            type_text(&mut app, "b");
            assert_eq!(app.session().get(&path), Some("a\nb".to_string()));
        }

        #[test]
        fn test_print_mode_refuses_structural_shortcuts() {
            let mut app = app();
            let sign_path = FieldPath::signature("approvals", 0, SignatureField::Name);
            focus(&mut app, &sign_path);
            type_text(&mut app, "A");
            let before = app.session().snapshot();

            press(&mut app, &[ctrl('p')]);
            assert_eq!(app.session().mode(), RenderMode::Print);
            for c in STRUCTURAL_SHORTCUTS {
                press(&mut app, &[ctrl(c)]);
                assert!(app.state.prompt.is_none());
                assert!(!app.state.has_errors());
            }

            assert_eq!(app.session().snapshot(), before);
            assert_eq!(app.session().registry("lines").map(|r| r.len()), Ok(0));
            assert_eq!(
                app.copy_message.as_deref(),
                Some("Print view is read-only (Esc to edit)")
            );

            press(&mut app, &[key(KeyCode::Esc), ctrl('r')]);
            assert_eq!(app.session().document().table("lines").map(|t| t.len()), Some(2));
        }

        #[test]
        fn test_print_mode_ignores_typing() {
            let mut app = app();
            press(&mut app, &[ctrl('p')]);
            assert_eq!(app.session().mode(), RenderMode::Print);
            type_text(&mut app, "x");
            assert_eq!(app.session().get(&FieldPath::field("invoice_no")), Some(String::new()));
            press(&mut app, &[key(KeyCode::Esc)]);
            assert_eq!(app.session().mode(), RenderMode::Edit);
        }
    }

    mod rows_and_columns {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_add_row_focuses_new_row() {
            let mut app = app();
            press(&mut app, &[ctrl('r')]);
            assert_eq!(app.session().document().table("lines").map(|t| t.len()), Some(2));
            assert!(matches!(
                app.focused_path(),
                Some(FieldPath::Cell { row: 1, .. })
            ));
        }

        #[test]
        fn test_remove_focused_row() {
            let mut app = app();
            press(&mut app, &[ctrl('r')]);
            type_text(&mut app, "second");
            focus(&mut app, &FieldPath::cell("lines", 0, CellPath::fixed("description")));
            press(&mut app, &[ctrl('d')]);
            assert_eq!(
                app.session()
                    .get(&FieldPath::cell("lines", 0, CellPath::fixed("description"))),
                Some("second".to_string())
            );
        }

        #[test]
        fn test_add_column_through_prompt() {
            let mut app = app();
            press(&mut app, &[ctrl('k')]);
            assert!(app.state.prompt.is_some());
            type_text(&mut app, "Batch Ref");
            press(&mut app, &[key(KeyCode::Enter)]);
            assert!(app.state.prompt.is_none());
            assert!(app.session().registry("lines").unwrap().contains("BatchRef"));

            let path = FieldPath::cell("lines", 0, CellPath::dynamic("BatchRef"));
            focus(&mut app, &path);
            type_text(&mut app, "B-9");
            assert_eq!(app.session().get(&path), Some("B-9".to_string()));

            press(&mut app, &[ctrl('x')]);
            assert!(!app.session().registry("lines").unwrap().contains("BatchRef"));
        }

        #[test]
        fn test_duplicate_column_shows_error() {
            let mut app = app();
            press(&mut app, &[ctrl('k')]);
            type_text(&mut app, "Batch Ref");
            press(&mut app, &[key(KeyCode::Enter), ctrl('k')]);
            type_text(&mut app, "BatchRef");
            press(&mut app, &[key(KeyCode::Enter)]);
            assert!(app.state.has_errors());
            assert_eq!(app.session().registry("lines").unwrap().len(), 1);
            // any other key is swallowed until the error is dismissed
            press(&mut app, &[key(KeyCode::Tab)]);
            assert!(app.state.has_errors());
            press(&mut app, &[key(KeyCode::Esc)]);
            assert!(!app.state.has_errors());
        }

        #[test]
        fn test_blank_column_name_is_ignored() {
            let mut app = app();
            press(&mut app, &[ctrl('k'), key(KeyCode::Char(' ')), key(KeyCode::Enter)]);
            assert!(!app.state.has_errors());
            assert!(app.state.prompt.is_none());
            assert_eq!(app.copy_message, None);
            assert!(app.session().registry("lines").unwrap().is_empty());
        }
    }

    mod roles {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_add_rename_and_remove_role() {
            let mut app = app();
            press(&mut app, &[ctrl('a')]);
            let path = FieldPath::role_name("approvals", 3);
            assert_eq!(app.focused_path(), Some(path.clone()));
            for _ in 0..NEW_ROLE_NAME.len() {
                press(&mut app, &[key(KeyCode::Backspace)]);
            }
            type_text(&mut app, "Auditor");
            assert_eq!(app.session().get(&path), Some("Auditor".to_string()));

            press(&mut app, &[ctrl('e')]);
            assert_eq!(app.session().document().chain("approvals").map(|c| c.len()), Some(3));
        }

        #[test]
        fn test_sign_requires_name() {
            let mut app = app();
            focus(&mut app, &FieldPath::signature("approvals", 0, SignatureField::Name));
            press(&mut app, &[ctrl('g')]);
            assert!(app.state.has_errors());
            press(&mut app, &[key(KeyCode::Enter)]);

            type_text(&mut app, "R. Iyer");
            press(&mut app, &[ctrl('g')]);
            assert_eq!(
                app.session().get(&FieldPath::signature(
                    "approvals",
                    0,
                    SignatureField::SignatureData
                )),
                Some("typed:R. Iyer".to_string())
            );
        }

        #[test]
        fn test_locked_roles_skip_role_names() {
            let mut app = app();
            press(&mut app, &[key(KeyCode::PageDown), key(KeyCode::PageDown)]);
            assert_eq!(app.session().document().form_id(), "food-safety-inspection");
            assert!(!app
                .session()
                .editable_paths()
                .iter()
                .any(|p| matches!(p, FieldPath::RoleName { .. })));
            press(&mut app, &[ctrl('a')]);
            assert_eq!(
                app.focused_path(),
                Some(FieldPath::signature("approvals", 3, SignatureField::Name))
            );
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        fn fill_invoice(app: &mut App) {
            let session = app.session_mut();
            for (name, value) in [
                ("invoice_no", "INV-7"),
                ("invoice_date", "2024-04-01"),
                ("supplier_gstin", "27AAPFU0939F1ZV"),
                ("customer_name", "Acme"),
            ] {
                session.set(&FieldPath::field(name), value.to_string()).unwrap();
            }
        }

        #[test]
        fn test_invalid_form_is_not_submitted() {
            let mut handler = MockSubmitHandler::new();
            handler.expect_submit().never();
            let mut app = App::with_handler(FormdeskConfig::default(), Box::new(handler));
            press(&mut app, &[ctrl('s')]);
            let error = app.state.current_error().unwrap_or_default().to_string();
            assert!(error.contains("failed validation"));
            assert!(error.contains("invoice_no: This field is required"));
        }

        #[test]
        fn test_submit_resets_form() {
            let mut handler = MockSubmitHandler::new();
            handler
                .expect_submit()
                .withf(|snapshot| {
                    snapshot.fields.get("invoice_no").map(String::as_str) == Some("INV-7")
                })
                .times(1)
                .returning(|_| Ok(Acknowledgement::new("Tax Invoice submitted")));
            let mut app = App::with_handler(FormdeskConfig::default(), Box::new(handler));
            fill_invoice(&mut app);
            press(&mut app, &[key(KeyCode::Tab), ctrl('s')]);

            assert!(!app.state.has_errors());
            assert_eq!(app.state.focus, 0);
            assert_eq!(app.copy_message.as_deref(), Some("Tax Invoice submitted"));
            assert_eq!(app.session().get(&FieldPath::field("invoice_no")), Some(String::new()));
        }

        #[test]
        fn test_handler_failure_keeps_document() {
            let mut handler = MockSubmitHandler::new();
            handler
                .expect_submit()
                .returning(|_| Err(anyhow::anyhow!("server unavailable")));
            let mut app = App::with_handler(FormdeskConfig::default(), Box::new(handler));
            fill_invoice(&mut app);
            press(&mut app, &[ctrl('s')]);

            assert_eq!(app.state.current_error(), Some("server unavailable"));
            assert_eq!(
                app.session().get(&FieldPath::field("invoice_no")),
                Some("INV-7".to_string())
            );
        }
    }

    mod quit {
        use super::*;

        #[test]
        fn test_double_ctrl_c_quits() {
            let mut app = app();
            press(&mut app, &[ctrl('c')]);
            assert!(!app.should_quit());
            assert!(app.copy_message.is_some());
            press(&mut app, &[ctrl('c')]);
            assert!(app.should_quit());
        }

        #[test]
        fn test_other_key_resets_ctrl_c() {
            let mut app = app();
            press(&mut app, &[ctrl('c'), key(KeyCode::Tab), ctrl('c')]);
            assert!(!app.should_quit());
        }
    }
}
