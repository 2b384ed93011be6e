use std::f32::consts::PI;

/*
State Variable Filter
=====================

Trapezoidal (zero-delay feedback) SVF. Two integrators whose states live in
`ic1eq` and `ic2eq`; each sample solves the loop in closed form:

    g  = tan(pi * cutoff / sample_rate)      prewarped integrator gain
    k  = 2 - 2 * resonance                   damping (2 = no resonance)
    h  = 1 / (1 + g * (g + k))

    v3 = x - ic2eq
    v1 = h * (ic1eq + g * v3)                band-pass
    v2 = ic2eq + g * v1                      low-pass

Only the low-pass output is used here. `g` is a `tan`, so the cutoff is only
recomputed when it actually changes (the LFO moves it every sample, which is
why the voice caches the last value it asked for).
*/

const MIN_CUTOFF: f32 = 20.0;

#[derive(Debug, Clone, Copy)]
pub struct LowPass {
    ic1eq: f32,
    ic2eq: f32,
    g: f32,
    k: f32,
    cutoff_hz: f32,
}

impl LowPass {
    pub fn new(cutoff_hz: f32, resonance: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            k: 2.0 - 2.0 * resonance.clamp(0.0, 0.95),
            cutoff_hz: 0.0,
        };
        filter.set_cutoff(cutoff_hz, sample_rate);
        filter
    }

    /// Update the cutoff, clamped below Nyquist
    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        let cutoff = cutoff_hz.clamp(MIN_CUTOFF, sample_rate * 0.49);
        if cutoff != self.cutoff_hz {
            self.cutoff_hz = cutoff;
            self.g = (PI * cutoff / sample_rate).tan();
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let h = 1.0 / (1.0 + self.g * (self.g + self.k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + self.g * v3);
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
