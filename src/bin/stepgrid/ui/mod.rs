//! TUI module for stepgrid
//!
//! Draws the transport bar, the step grid with the sounding step highlighted,
//! and an oscilloscope of the audio output.

mod grid;
mod transport;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use stepgrid::grid::{Column, SequenceStore};

use grid::render_grid;
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

/// Edit position in the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub step: usize,
    pub column: Column,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            step: 0,
            column: Column::Pitch,
        }
    }
}

/// Everything one frame needs, borrowed from the app
pub struct View<'a> {
    pub store: &'a SequenceStore,
    pub cursor: Cursor,
    /// Step the audio clock has reached, if playing
    pub playhead: Option<usize>,
    pub bpm: f64,
    pub running: bool,
    pub tick: u64,
    pub audio_time: f64,
    pub sample_rate: f32,
    pub scope: &'a [f32],
}

pub fn render(frame: &mut Frame, view: &View) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                          // Transport bar
            Constraint::Length(Column::COUNT as u16 + 4),   // Grid
            Constraint::Min(6),                             // Waveform
            Constraint::Length(1),                          // Help bar
        ])
        .split(area);

    render_transport(frame, chunks[0], view, &AudioStats::from_buffer(view.scope));

    let grid_block = Block::default()
        .title(format!(" Steps ({}) ", view.store.len()))
        .borders(Borders::ALL);
    let grid_inner = grid_block.inner(chunks[1]);
    frame.render_widget(grid_block, chunks[1]);
    render_grid(frame, grid_inner, view);

    render_waveform(frame, chunks[2], view.scope);

    let help = Paragraph::new(
        " [Space] Play/Stop  [←→↑↓] Move  [+/-] Edit  [H] Hold  [r/R] Randomize  [[ ]] Shift  [, .] Length  [C] Clear  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}
