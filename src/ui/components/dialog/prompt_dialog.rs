//! Text prompt dialog

use super::base::{key_span, render_dialog, DialogConfig};
use crate::state::Prompt;
use ratatui::{style::Color, text::Span, Frame};

pub fn render_prompt_dialog(frame: &mut Frame, prompt: &Prompt) {
    let message = match prompt {
        Prompt::AddColumn { .. } => "Column name (spaces are dropped from its key):",
    };
    let hint = vec![
        key_span("Enter"),
        Span::raw(" add  "),
        key_span("Esc"),
        Span::raw(" cancel"),
    ];

    render_dialog(
        frame,
        DialogConfig {
            title: prompt.title(),
            title_color: Color::Cyan,
            border_color: Color::Cyan,
            message,
            input: Some(prompt.input()),
            hint: Some(hint),
            max_width: 50,
        },
    );
}
