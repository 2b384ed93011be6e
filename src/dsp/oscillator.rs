use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Oscillator
==========

A phase accumulator: `phase` walks from 0 to 1 once per cycle, advancing by
`frequency / sample_rate` each sample, and the waveform maps phase to an
output in [-1, 1].

  Sine      fundamental only            smooth, hollow
  Triangle  odd harmonics, 1/n^2        soft, mellow
  Sawtooth  all harmonics, 1/n          bright, buzzy
  Square    odd harmonics, 1/n          hollow, woody

Saw and square have hard edges that alias at high pitches. PolyBLEP smooths
each discontinuity over one sample on either side, which removes most of the
audible aliasing for the cost of a couple of multiplies.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    Triangle,
    #[default]
    Sawtooth,
    Square,
}

impl Waveform {
    /// Waveform by grid index (sine, triangle, saw, square). Out-of-range
    /// indices clamp to the last shape.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Waveform::Sine,
            1 => Waveform::Triangle,
            2 => Waveform::Sawtooth,
            _ => Waveform::Square,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Restart the cycle at phase 0
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Output the current sample, then advance the phase
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let dt = (frequency / sample_rate).clamp(0.0, 0.5);
        let t = self.phase;

        let out = match self.waveform {
            Waveform::Sine => (TAU * t).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
            Waveform::Sawtooth => (2.0 * t - 1.0) - poly_blep(t, dt),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5).fract(), dt)
            }
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }
}

/// Band-limited step correction around a discontinuity at phase 0
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}
