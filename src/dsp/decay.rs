/*
One-Shot Decay Envelope
=======================

A step sequencer note has no gate length: it is triggered and rings out.
So instead of attack/decay/sustain/release this envelope has two stages.

  Level
    1.0 ┐ ╱╲
        │╱  ╲_
        │      ╲__
    0.0 └─────────‾‾‾────→ Time
        A   decay (to -60 dB)

Attack is a short linear ramp (2 ms) that keeps the note onset from
clicking. Decay is exponential: every sample the level is multiplied by a
fixed coefficient chosen so the level reaches 0.001 (-60 dB) exactly
`decay` seconds after the peak.

    coeff = 0.001 ^ (1 / (decay * sample_rate))

At that point the envelope goes idle and the voice can be reused.
*/

/// Linear attack time in seconds
pub const ATTACK_TIME: f32 = 0.002;

/// Level at which the decay is considered finished (-60 dB)
pub const SILENCE: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayStage {
    Idle,
    Attack,
    Decay,
}

#[derive(Debug, Clone, Copy)]
pub struct DecayEnvelope {
    stage: DecayStage,
    level: f32,
    attack_samples: u32,
    elapsed: u32,
    decay_coeff: f32,
}

impl DecayEnvelope {
    pub fn new() -> Self {
        Self {
            stage: DecayStage::Idle,
            level: 0.0,
            attack_samples: 1,
            elapsed: 0,
            decay_coeff: 0.0,
        }
    }

    /// Start from zero with the given decay time
    pub fn trigger(&mut self, decay_secs: f32, sample_rate: f32) {
        let decay_samples = (decay_secs * sample_rate).max(1.0);

        self.attack_samples = (ATTACK_TIME * sample_rate).round().max(1.0) as u32;
        self.elapsed = 0;
        self.decay_coeff = SILENCE.powf(1.0 / decay_samples);
        self.level = 0.0;
        self.stage = DecayStage::Attack;
    }

    /// Current level, then advance one sample
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = self.level;
        match self.stage {
            DecayStage::Idle => {}
            DecayStage::Attack => {
                self.elapsed += 1;
                if self.elapsed >= self.attack_samples {
                    self.level = 1.0;
                    self.stage = DecayStage::Decay;
                } else {
                    self.level = self.elapsed as f32 / self.attack_samples as f32;
                }
            }
            DecayStage::Decay => {
                self.level *= self.decay_coeff;
                if self.level <= SILENCE {
                    self.level = 0.0;
                    self.stage = DecayStage::Idle;
                }
            }
        }
        out
    }

    pub fn is_active(&self) -> bool {
        self.stage != DecayStage::Idle
    }

    pub fn stage(&self) -> DecayStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

impl Default for DecayEnvelope {
    fn default() -> Self {
        Self::new()
    }
}
