//! Field rendering utilities for forms

use crate::state::FieldView;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const CURSOR: &str = "▌";

/// Style of a value: focus, read-only and error state all show in edit mode only
pub fn value_style(view: &FieldView, is_active: bool) -> Style {
    match view {
        FieldView::Static { .. } => Style::default().fg(Color::White),
        FieldView::Input { .. } if view.error().is_some() => Style::default().fg(Color::Red),
        FieldView::Input { read_only: true, .. } => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
        FieldView::Input { .. } if is_active => Style::default().fg(Color::Cyan),
        FieldView::Input { .. } => Style::default().fg(Color::Gray),
    }
}

/// Spans for one value; multi-line text is folded onto one line
pub fn value_spans(view: &FieldView, is_active: bool, placeholder: &str) -> Vec<Span<'static>> {
    let text = view.display(placeholder).replace('\n', " ⏎ ");
    let mut spans = vec![Span::styled(text, value_style(view, is_active))];
    if is_active && view.is_editable() {
        spans.push(Span::styled(CURSOR, Style::default().fg(Color::Cyan)));
    }
    spans
}

/// Field label, marked when the field is required in edit mode
pub fn display_label(label: &str, required: bool) -> String {
    if required {
        format!("{label} *")
    } else {
        label.to_string()
    }
}

/// `Label: value` line, with the validation message appended in edit mode
pub fn field_line<'a>(
    label: &'a str,
    label_width: usize,
    view: &'a FieldView,
    is_active: bool,
    placeholder: &'a str,
) -> Line<'a> {
    let label_style = if is_active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let marker = if is_active { "› " } else { "  " };

    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{label:<label_width$}  "), label_style),
    ];
    spans.extend(value_spans(view, is_active, placeholder));
    if let Some(error) = view.error() {
        spans.push(Span::styled(format!("  ✗ {error}"), Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{bind, RenderMode};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_print_line_uses_placeholder() {
        let view = bind(None, RenderMode::Print, None, false);
        let line = field_line("Customer", 8, &view, false, "____");
        assert_eq!(text(&line), "  Customer  ____");
    }

    #[test]
    fn test_edit_line_shows_cursor_and_error() {
        let error = Some("This field is required".to_string());
        let view = bind(Some(String::new()), RenderMode::Edit, error, false);
        let line = field_line("Customer", 8, &view, true, "____");
        assert_eq!(text(&line), "› Customer  ▌  ✗ This field is required");
    }

    #[test]
    fn test_read_only_has_no_cursor() {
        let view = bind(Some("12.00".into()), RenderMode::Edit, None, true);
        let spans = value_spans(&view, true, "____");
        assert_eq!(spans.len(), 1);
        assert!(value_style(&view, true).add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_required_label_is_marked() {
        assert_eq!(display_label("Invoice No.", true), "Invoice No. *");
        assert_eq!(display_label("Notes", false), "Notes");
    }

    #[test]
    fn test_multiline_is_folded() {
        let view = bind(Some("a\nb".into()), RenderMode::Print, None, false);
        let spans = value_spans(&view, false, "____");
        assert_eq!(spans[0].content, "a ⏎ b");
    }
}
