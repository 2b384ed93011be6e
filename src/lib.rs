pub mod dsp; // Per-sample building blocks for the voices
pub mod grid; // Step cells, column scales and the edit reducer
pub mod runtime;
pub mod sequencing; // Beat and visual scheduling against the audio clock
pub mod synth; // Voice pool and note engine
