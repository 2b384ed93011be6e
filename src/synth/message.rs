use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::Waveform;
use crate::grid::{Cell, Column};

/// MIDI note of pitch 0, octave 0 (middle C)
pub const BASE_NOTE: i32 = 60;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// A cell translated into what a voice needs to play it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteParams {
    pub note: u8,
    pub frequency: f32,
    pub gain: f32,
    pub cutoff_hz: f32,
    pub lfo_rate_hz: f32,
    pub decay_secs: f32,
    pub waveform: Waveform,
}

impl NoteParams {
    pub fn from_cell(cell: &Cell) -> Self {
        let pitch = cell.value(Column::Pitch) as i32;
        let octave = cell.value(Column::Octave) as i32;
        let note = (BASE_NOTE + pitch + 12 * octave).clamp(0, 127) as u8;

        Self {
            note,
            frequency: midi_note_to_freq(note),
            gain: cell.value(Column::Gain),
            cutoff_hz: cell.value(Column::Filter),
            lfo_rate_hz: cell.value(Column::Lfo),
            decay_secs: cell.value(Column::Decay),
            waveform: Waveform::from_index(cell.value(Column::Waveform) as usize),
        }
    }
}

/// A note to start at an audio-clock time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub start_time: f64,
    pub params: NoteParams,
}

/// Lock-free SPSC queue from the tick path to the audio thread
pub fn note_channel(capacity: usize) -> (Producer<NoteEvent>, Consumer<NoteEvent>) {
    RingBuffer::new(capacity)
}
