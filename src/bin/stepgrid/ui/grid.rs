//! Step grid widget - one row per column, one cell per step

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use stepgrid::grid::Column;

use super::View;

const LABEL_WIDTH: u16 = 8;
const CELL_WIDTH: u16 = 6;

/// First visible step, scrolled so the cursor stays on screen
fn first_visible(cursor: usize, visible: usize, len: usize) -> usize {
    if visible >= len {
        0
    } else {
        cursor.saturating_sub(visible / 2).min(len - visible)
    }
}

pub fn render_grid(frame: &mut Frame, area: Rect, view: &View) {
    if area.height < 2 || area.width < LABEL_WIDTH + CELL_WIDTH {
        return;
    }

    let store = view.store;
    let len = store.len();
    let visible = ((area.width - LABEL_WIDTH) / CELL_WIDTH) as usize;
    let first = first_visible(view.cursor.step, visible, len);
    let steps = first..(first + visible).min(len);

    let mut lines = Vec::with_capacity(Column::COUNT + 1);

    // Step numbers, held steps marked with '*'
    let mut header = vec![Span::raw(" ".repeat(LABEL_WIDTH as usize))];
    for step in steps.clone() {
        let mark = if store.is_held(step) { '*' } else { ' ' };
        let style = if view.playhead == Some(step) {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        header.push(Span::styled(
            format!("{:>4}{mark} ", step + 1),
            style,
        ));
    }
    lines.push(Line::from(header));

    for column in Column::ALL {
        let mut spans = vec![Span::styled(
            format!("{:<width$}", column.label(), width = LABEL_WIDTH as usize),
            Style::default().fg(if column == view.cursor.column {
                Color::White
            } else {
                Color::DarkGray
            }),
        )];

        for step in steps.clone() {
            let text = store
                .cell(step)
                .map(|cell| column.format(cell.value(column)))
                .unwrap_or_default();

            let mut style = Style::default().fg(if store.is_held(step) {
                Color::Magenta
            } else {
                Color::Cyan
            });
            if view.playhead == Some(step) {
                style = style.bg(Color::DarkGray);
            }
            if view.cursor.step == step && view.cursor.column == column {
                style = style.add_modifier(Modifier::REVERSED);
            }

            spans.push(Span::styled(
                format!("{:>5} ", text),
                style,
            ));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
