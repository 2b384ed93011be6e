// Purpose: note engine for the sequencer
// Sits on the audio thread, below the scheduler: notes arrive over a
// lock-free ring with a start time and are rendered sample-accurately

pub mod engine;
pub mod message;
pub mod voice;

pub use engine::{Engine, EngineConfig};
pub use message::{midi_note_to_freq, note_channel, NoteEvent, NoteParams};
pub use voice::{Voice, VoiceState};
