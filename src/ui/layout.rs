//! Layout components (sidebar, status bar)

use crate::app::App;
use crate::catalog;
use crate::platform::shortcut_label;
use crate::state::RenderMode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 26;

/// Create the main layout with sidebar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    // Reserve bottom line for status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDEBAR_WIDTH), // Sidebar
            Constraint::Min(0),                // Main content
        ])
        .split(rows[0]);

    (chunks[0], chunks[1])
}

/// Draw the form catalog, grouped by category
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = catalog::all()
        .iter()
        .zip(&app.sessions)
        .map(|(definition, session)| {
            let mode = match session.mode() {
                RenderMode::Edit => Span::raw(""),
                RenderMode::Print => Span::styled(" ⎙", Style::default().fg(Color::White)),
            };
            ListItem::new(vec![
                Line::from(vec![Span::raw(definition.title), mode]),
                Line::from(Span::styled(
                    format!("  {}", definition.category),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Forms ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("› ");

    // Stateful render keeps the selected form scrolled into view
    let mut list_state = ListState::default().with_selected(Some(app.state.selected_form));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mode = app.session().mode();
    let mut spans = vec![Span::styled(
        format!(" {} ", mode.label()),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    )];
    spans.push(Span::raw(" "));
    spans.push(Span::styled(mode_hints(mode), Style::default().fg(Color::Gray)));

    if mode.is_edit() {
        let failing = app.session().validation_errors().len();
        if failing > 0 {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("{failing} to fix"),
                Style::default().fg(Color::Red),
            ));
        }
    }

    // Copy message
    if let Some(msg) = &app.copy_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    // Quit hint on the right (double Ctrl+C to quit)
    let quit_hint = " ^C^C:quit ";
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Keyboard hints for the current mode
fn mode_hints(mode: RenderMode) -> String {
    let k = shortcut_label;
    match mode {
        RenderMode::Edit => {
            let groups: [&[(char, &str)]; 6] = [
                &[('r', "row+"), ('d', "row-")],
                &[('k', "col+"), ('x', "col-")],
                &[('a', "role+"), ('e', "role-")],
                &[('g', "sign")],
                &[('s', "submit")],
                &[('p', "print")],
            ];
            let hints: Vec<String> = groups
                .iter()
                .map(|group| {
                    let keys: Vec<String> =
                        group.iter().map(|(c, what)| format!("{}:{what}", k(*c))).collect();
                    keys.join(" ")
                })
                .collect();
            format!("Tab:next  {}  PgUp/PgDn:form", hints.join("  "))
        }
        RenderMode::Print => format!(
            "{}:copy  {}/Esc:edit  PgUp/PgDn:form",
            k('y'),
            k('p')
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_reserves_status_line() {
        let (sidebar, main) = create_layout(Rect::new(0, 0, 100, 30));
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(main.width, 100 - SIDEBAR_WIDTH);
        assert_eq!(main.height, 29);
    }

    #[test]
    fn test_print_hints_omit_editing_keys() {
        let hints = mode_hints(RenderMode::Print);
        assert!(hints.contains(":copy"));
        assert!(!hints.contains(":row+"));
        assert!(mode_hints(RenderMode::Edit).contains(":submit"));
    }
}
