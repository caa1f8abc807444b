//! Application state definitions

use std::collections::VecDeque;

/// Modal text prompt shown over the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Label for a new dynamic column on `table`
    AddColumn { table: String, input: String },
}

impl Prompt {
    pub fn add_column(table: &str) -> Self {
        Self::AddColumn {
            table: table.to_string(),
            input: String::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::AddColumn { .. } => "Add Column",
        }
    }

    pub fn input(&self) -> &str {
        match self {
            Self::AddColumn { input, .. } => input,
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self {
            Self::AddColumn { input, .. } => input.push(c),
        }
    }

    pub fn pop_char(&mut self) {
        match self {
            Self::AddColumn { input, .. } => {
                input.pop();
            }
        }
    }
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Index into the catalog
    pub selected_form: usize,
    /// Index into the current session's editable paths
    pub focus: usize,
    pub prompt: Option<Prompt>,
    /// Errors waiting to be acknowledged, oldest first
    errors: VecDeque<String>,
}

impl AppState {
    /// Move focus to the next editable value, wrapping around
    pub fn next_focus(&mut self, count: usize) {
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    /// Move focus to the previous editable value, wrapping around
    pub fn prev_focus(&mut self, count: usize) {
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Keep focus in range after rows, columns or roles were removed
    pub fn clamp_focus(&mut self, count: usize) {
        if self.focus >= count {
            self.focus = count.saturating_sub(1);
        }
    }

    /// Switch to another form; focus restarts at the first field
    pub fn select_form(&mut self, index: usize) {
        if self.selected_form != index {
            self.selected_form = index;
            self.focus = 0;
            self.prompt = None;
        }
    }

    pub fn next_form(&mut self, count: usize) {
        if count > 0 {
            self.select_form((self.selected_form + 1) % count);
        }
    }

    pub fn prev_form(&mut self, count: usize) {
        if count > 0 {
            self.select_form((self.selected_form + count - 1) % count);
        }
    }

    pub fn push_error(&mut self, message: String) {
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    /// Notices queued behind the one on screen
    pub fn pending_errors(&self) -> usize {
        self.errors.len().saturating_sub(1)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }
}
