//! Transport bar widget - tempo, play state, position and output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::View;

/// Output level of the scope buffer
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(frame: &mut Frame, area: Rect, view: &View, stats: &AudioStats) {
    let block = Block::default().title(" stepgrid ").borders(Borders::ALL);

    let (symbol, state) = if view.running {
        ("▶", "Playing")
    } else {
        ("■", "Stopped")
    };

    let position = match view.playhead {
        Some(step) => format!("Step {:>2}/{}  ", step + 1, view.store.len()),
        None => format!("Step --/{}  ", view.store.len()),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", view.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{symbol} {state}  "),
            Style::default().fg(if view.running {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            format!("tick {}  {:.2}s  ", view.tick, view.audio_time),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{:.1}kHz  ", view.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
