//! Approval chain rendering as a wrapping grid of signature cards

use super::field_renderer::value_spans;
use crate::state::{ChainSection, FieldPath, FieldView, FormSession, SignatureField};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const CARD_WIDTH: u16 = 30;
/// Borders plus one line per signature attribute
const CARD_HEIGHT: u16 = 2 + SignatureField::ALL.len() as u16;

/// Cards per grid row for a given width
pub fn cards_per_row(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

/// Rows needed to draw the whole chain at `width`
pub fn chain_height(section: &ChainSection, width: u16) -> u16 {
    let inner = width.saturating_sub(2);
    let grid_rows = section.chain.len().div_ceil(cards_per_row(inner));
    2 + grid_rows.max(1) as u16 * CARD_HEIGHT
}

pub fn draw_chain(
    frame: &mut Frame,
    area: Rect,
    session: &FormSession,
    key: &str,
    section: &ChainSection,
    focused: Option<&FieldPath>,
    placeholder: &str,
) {
    let has_focus = focused.and_then(|p| p.chain()) == Some(key);
    let border_color = if has_focus { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .title(format!(" {} ", section.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if section.chain.is_empty() {
        frame.render_widget(
            Paragraph::new("No roles").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let per_row = cards_per_row(inner.width);
    for index in 0..section.chain.len() {
        let x = inner.x + (index % per_row) as u16 * CARD_WIDTH;
        let y = inner.y + (index / per_row) as u16 * CARD_HEIGHT;
        if y + CARD_HEIGHT > inner.y + inner.height {
            break;
        }
        let card = Rect {
            x,
            y,
            width: CARD_WIDTH.min(inner.x + inner.width - x),
            height: CARD_HEIGHT,
        };
        draw_card(frame, card, session, key, index, focused, placeholder);
    }
}

fn draw_card(
    frame: &mut Frame,
    area: Rect,
    session: &FormSession,
    chain: &str,
    index: usize,
    focused: Option<&FieldPath>,
    placeholder: &str,
) {
    let role_path = FieldPath::role_name(chain, index);
    let role_view = session.render(&role_path);
    let role_active = focused == Some(&role_path);
    let card_active = matches!(
        focused,
        Some(p) if p.chain() == Some(chain) && card_index(p) == Some(index)
    );

    let mut title = vec![Span::raw(" ")];
    title.extend(value_spans(&role_view, role_active, placeholder));
    title.push(Span::raw(" "));

    let lines: Vec<Line> = SignatureField::ALL
        .iter()
        .map(|field| {
            let path = FieldPath::signature(chain, index, *field);
            let view = session.render(&path);
            let is_active = focused == Some(&path);
            let mut spans = vec![Span::styled(
                format!("{:<6} ", field.label()),
                Style::default().fg(Color::DarkGray),
            )];
            if *field == SignatureField::SignatureData {
                spans.push(signature_span(&view, placeholder));
            } else {
                spans.extend(value_spans(&view, is_active, placeholder));
            }
            Line::from(spans)
        })
        .collect();

    let border_style = if card_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::default()
        .title(Line::from(title).style(Style::default().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(border_style);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Signature data is opaque; only whether it exists is shown
fn signature_span(view: &FieldView, placeholder: &str) -> Span<'static> {
    match view.value() {
        Some(_) => Span::styled("✓ signed", Style::default().fg(Color::Green)),
        None => Span::styled(
            view.display(placeholder).to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    }
}

fn card_index(path: &FieldPath) -> Option<usize> {
    match path {
        FieldPath::RoleName { index, .. } | FieldPath::Signature { index, .. } => Some(*index),
        _ => None,
    }
}
