//! Low-level DSP primitives used by the synth voices.
//!
//! Everything here is per-sample, allocation-free and realtime-safe, so the
//! blocks can live inline inside a voice struct on the audio thread.

/// One-shot attack/exponential-decay envelope.
pub mod decay;
/// Trapezoidal state-variable low-pass filter.
pub mod filter;
/// Control-rate sine LFO.
pub mod lfo;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;

pub use decay::{DecayEnvelope, DecayStage};
pub use filter::LowPass;
pub use lfo::Lfo;
pub use oscillator::{Oscillator, Waveform};
