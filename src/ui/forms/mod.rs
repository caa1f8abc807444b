//! Form rendering module
//!
//! This module draws one open form in either mode:
//! - `field_renderer`: scalar values as `Label  value` lines
//! - `line_items`: line-item tables with aggregate footers
//! - `approvals`: the sign-off chain as a grid of cards

mod approvals;
mod field_renderer;
mod line_items;

use crate::app::App;
use crate::state::{FieldPath, RenderMode};
use field_renderer::{display_label, field_line};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the selected form
pub fn draw_form(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let doc = session.document();
    let focused = app.focused_path();
    let focused = focused.as_ref();
    let placeholder = app.config.placeholder();
    let is_edit = session.mode().is_edit();

    let field_count = doc.fields().count() as u16;
    let mut constraints = vec![Constraint::Length(1), Constraint::Length(field_count + 2)];
    for (_, section) in doc.tables() {
        constraints.push(Constraint::Length(line_items::table_height(section)));
    }
    for (_, section) in doc.chains() {
        constraints.push(Constraint::Length(approvals::chain_height(section, area.width)));
    }
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_header(frame, chunks[0], doc.title(), session.mode());

    let views: Vec<_> = doc
        .fields()
        .map(|f| {
            let required = is_edit && session.rules().is_required(&f.name);
            let path = FieldPath::field(&f.name);
            let view = session.render(&path);
            (display_label(&f.label, required), path, view)
        })
        .collect();
    let label_width = views
        .iter()
        .map(|(label, _, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let lines: Vec<Line> = views
        .iter()
        .map(|(label, path, view)| {
            field_line(label, label_width, view, focused == Some(path), placeholder)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Details ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        chunks[1],
    );

    let mut next = 2;
    for (key, section) in doc.tables() {
        line_items::draw_table(frame, chunks[next], session, key, section, focused, placeholder);
        next += 1;
    }
    for (key, section) in doc.chains() {
        approvals::draw_chain(frame, chunks[next], session, key, section, focused, placeholder);
        next += 1;
    }

    if is_edit {
        draw_validation_summary(frame, chunks[next], app);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, title: &str, mode: RenderMode) {
    let badge_style = match mode {
        RenderMode::Edit => Style::default().fg(Color::Black).bg(Color::Cyan),
        RenderMode::Print => Style::default().fg(Color::Black).bg(Color::White),
    };
    let header = Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", mode.label().to_uppercase()), badge_style),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Failing fields, listed under the form in edit mode only
fn draw_validation_summary(frame: &mut Frame, area: Rect, app: &App) {
    if area.height == 0 {
        return;
    }
    let errors = app.session().validation_errors();
    if errors.is_empty() {
        return;
    }
    let lines: Vec<Line> = errors
        .iter()
        .take(area.height as usize)
        .map(|(path, message)| {
            Line::from(vec![
                Span::styled(" ✗ ", Style::default().fg(Color::Red)),
                Span::styled(path.to_string(), Style::default().fg(Color::Gray)),
                Span::raw(": "),
                Span::styled(message.clone(), Style::default().fg(Color::Red)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
