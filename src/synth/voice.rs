use crate::dsp::{DecayEnvelope, Lfo, LowPass, Oscillator, Waveform};
use crate::synth::message::NoteParams;

/// LFO depth on the filter cutoff, in octaves either side
const LFO_DEPTH_OCTAVES: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,    // Available for allocation
    Playing, // Envelope running
}

/// One-shot voice: oscillator -> LFO-swept low-pass -> decay envelope -> gain
pub struct Voice {
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    params: Option<NoteParams>,

    osc: Oscillator,
    filter: LowPass,
    lfo: Lfo,
    env: DecayEnvelope,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            params: None,
            osc: Oscillator::new(Waveform::default()),
            filter: LowPass::new(1_000.0, 0.2, sample_rate),
            lfo: Lfo::default(),
            env: DecayEnvelope::new(),
        }
    }

    /// (Re)start the voice from silence
    pub fn start(&mut self, params: NoteParams, age: u64) {
        self.state = VoiceState::Playing;
        self.age = age;
        self.params = Some(params);

        self.osc.set_waveform(params.waveform);
        self.osc.reset();
        self.filter.reset();
        self.filter.set_cutoff(params.cutoff_hz, self.sample_rate);
        self.lfo = Lfo::new(params.lfo_rate_hz);
        self.env.trigger(params.decay_secs, self.sample_rate);
    }

    /// Mix this voice into `out`. Frees itself when the envelope finishes.
    pub fn render_add(&mut self, out: &mut [f32]) {
        let Some(params) = self.params else {
            return;
        };
        if self.state == VoiceState::Free {
            return;
        }

        let sr = self.sample_rate;
        for sample in out.iter_mut() {
            if self.lfo.is_active() {
                let sweep = (self.lfo.next_value(sr) * LFO_DEPTH_OCTAVES).exp2();
                self.filter.set_cutoff(params.cutoff_hz * sweep, sr);
            }

            let raw = self.osc.next_sample(params.frequency, sr);
            let level = self.env.next_sample();
            *sample += self.filter.process(raw) * level * params.gain;

            if !self.env.is_active() {
                self.free();
                break;
            }
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.params = None;
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn params(&self) -> Option<&NoteParams> {
        self.params.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, Column};

    const SR: f32 = 48_000.0;

    fn params(decay: f32) -> NoteParams {
        NoteParams::from_cell(&Cell::default().with_value(Column::Decay, decay))
    }

    #[test]
    fn free_voice_is_silent() {
        let mut voice = Voice::new(SR);
        let mut out = vec![0.0; 64];
        voice.render_add(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn plays_then_frees_itself() {
        let mut voice = Voice::new(SR);
        voice.start(params(0.05), 1);
        assert_eq!(voice.state(), VoiceState::Playing);

        let mut out = vec![0.0; 1_024];
        voice.render_add(&mut out);
        assert!(out.iter().any(|&s| s.abs() > 0.01));

        // 50 ms decay plus 2 ms attack fit in 2.5k samples
        let mut tail = vec![0.0; 2_048];
        voice.render_add(&mut tail);
        assert!(voice.is_free());
    }

    #[test]
    fn first_sample_is_silent_onset() {
        let mut voice = Voice::new(SR);
        voice.start(params(0.3), 0);
        let mut out = vec![0.0; 4];
        voice.render_add(&mut out);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn lfo_voice_still_renders() {
        let cell = Cell::default().with_value(Column::Lfo, 8.0);
        let mut voice = Voice::new(SR);
        voice.start(NoteParams::from_cell(&cell), 0);

        let mut out = vec![0.0; 4_800];
        voice.render_add(&mut out);
        assert!(out.iter().all(|s| s.is_finite()));
        assert!(out.iter().any(|&s| s.abs() > 0.01));
    }
}
