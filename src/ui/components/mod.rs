//! Reusable UI components

mod dialog;

pub use dialog::{render_error_dialog, render_prompt_dialog};
