//! Low frequency oscillator for filter sweeps.

/*
An LFO is the same phase accumulator as an audio oscillator, run at a
control rate (here 0.5 to 8 Hz) and used to move a parameter instead of
being heard. Output is bipolar, -1 to +1, so a sweep goes both above and
below the base value.

The phase is reset on every note, so a given cell always sweeps the same way
(synced, not free-running).
*/

use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, Default)]
pub struct Lfo {
    rate_hz: f32,
    phase: f32,
}

impl Lfo {
    pub fn new(rate_hz: f32) -> Self {
        Self {
            rate_hz: rate_hz.max(0.0),
            phase: 0.0,
        }
    }

    /// Rate 0 means the LFO is off and always outputs 0
    pub fn is_active(&self) -> bool {
        self.rate_hz > 0.0
    }

    /// Bipolar sine output, then advance one sample
    #[inline]
    pub fn next_value(&mut self, sample_rate: f32) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let out = (TAU * self.phase).sin();
        self.phase = (self.phase + self.rate_hz / sample_rate).fract();
        out
    }
}
