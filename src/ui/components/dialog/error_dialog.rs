//! Error dialog component

use super::base::{key_span, render_dialog, DialogConfig};
use ratatui::{style::Color, text::Span, Frame};

/// Render the front of the notice queue centered on the screen
pub fn render_error_dialog(frame: &mut Frame, error_message: &str, pending: usize) {
    let title = dialog_title(pending);
    let mut hint = vec![
        Span::raw("Press "),
        key_span("Enter"),
        Span::raw(" or "),
        key_span("Esc"),
        Span::raw(" to dismiss"),
    ];
    if pending > 0 {
        hint.push(Span::raw(" and see the next"));
    }

    render_dialog(
        frame,
        DialogConfig {
            title: &title,
            title_color: Color::Red,
            border_color: Color::Red,
            message: error_message,
            hint: Some(hint),
            ..Default::default()
        },
    );
}

fn dialog_title(pending: usize) -> String {
    match pending {
        0 => "Error".to_string(),
        n => format!("Error (+{n} more)"),
    }
}
