//! Line-item table rendering

use super::field_renderer::value_spans;
use crate::state::{CellPath, FieldPath, FormSession, TableSection};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

/// One visible column: fixed or added at runtime
struct ColumnHead {
    label: String,
    cell: CellPath,
}

fn column_heads(session: &FormSession, key: &str, section: &TableSection) -> Vec<ColumnHead> {
    let mut heads: Vec<ColumnHead> = section
        .table
        .columns()
        .iter()
        .map(|spec| ColumnHead {
            label: spec.label.to_string(),
            cell: CellPath::fixed(spec.key),
        })
        .collect();
    if let Ok(registry) = session.registry(key) {
        heads.extend(registry.columns().map(|column| ColumnHead {
            label: column.label.clone(),
            cell: CellPath::dynamic(&column.key),
        }));
    }
    heads
}

/// Rows needed to draw a table: borders, header, rows and aggregate lines
pub fn table_height(section: &TableSection) -> u16 {
    let aggregates = section.table.aggregates().len();
    (2 + 1 + section.table.len() + aggregates) as u16
}

/// Draw one line-item table with its aggregate footer
pub fn draw_table(
    frame: &mut Frame,
    area: Rect,
    session: &FormSession,
    key: &str,
    section: &TableSection,
    focused: Option<&FieldPath>,
    placeholder: &str,
) {
    let table = section.table.as_ref();
    let heads = column_heads(session, key, section);

    let has_focus = focused.and_then(|p| p.table()) == Some(key);
    let border_color = if has_focus { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .title(format!(" {} ", section.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let aggregates = table.aggregates();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(aggregates.len() as u16),
        ])
        .split(inner);

    let header = Row::new(heads.iter().map(|h| {
        Cell::from(h.label.clone()).style(Style::default().add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().fg(Color::Yellow));

    let rows: Vec<Row> = (0..table.len())
        .map(|row| {
            Row::new(heads.iter().map(|head| {
                let path = FieldPath::cell(key, row, head.cell.clone());
                let view = session.render(&path);
                let is_active = focused == Some(&path);
                Cell::from(Line::from(value_spans(&view, is_active, placeholder)))
            }))
        })
        .collect();

    let widths = vec![Constraint::Fill(1); heads.len().max(1)];
    frame.render_widget(Table::new(rows, widths).header(header).column_spacing(1), chunks[0]);

    let footer: Vec<Line> = aggregates
        .iter()
        .map(|spec| {
            let view = session.render(&FieldPath::aggregate(key, spec.key));
            Line::from(vec![
                Span::styled(format!("{}: ", spec.label), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    view.display(placeholder).to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
            .right_aligned()
        })
        .collect();
    frame.render_widget(Paragraph::new(footer), chunks[1]);
}
