//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;

use crate::app::App;
use components::{render_error_dialog, render_prompt_dialog};
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Draw the main layout with sidebar
    let (sidebar_area, main_area) = layout::create_layout(area);

    layout::draw_sidebar(frame, sidebar_area, app);
    forms::draw_form(frame, main_area, app);
    layout::draw_status_bar(frame, app);

    // Modal overlays, errors on top
    if let Some(prompt) = &app.state.prompt {
        render_prompt_dialog(frame, prompt);
    }
    if let Some(error) = app.state.current_error() {
        render_error_dialog(frame, error, app.state.pending_errors());
    }
}
