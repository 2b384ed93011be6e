//! Audio-thread note engine.
//!
//! The engine owns a fixed pool of voices and the [`SampleClock`] the beat
//! scheduler reads. Each call to [`Engine::render`] drains queued
//! [`NoteEvent`]s, starts every note on the exact frame its start time maps
//! to, and then advances the clock by the block length. Notes whose start
//! frame has already passed start on the first frame of the block.

use rtrb::Consumer;

use crate::sequencing::SampleClock;
use crate::synth::message::NoteEvent;
use crate::synth::voice::Voice;

/// Notes held back for a future block. Anything beyond this stays in the
/// ring until there is room.
const MAX_PENDING: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_voices: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_voices: 16,
        }
    }
}

impl EngineConfig {
    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }
}

pub struct Engine {
    config: EngineConfig,
    voices: Vec<Voice>,
    rx: Consumer<NoteEvent>,
    pending: Vec<NoteEvent>,
    clock: SampleClock,
    next_age: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, rx: Consumer<NoteEvent>) -> Self {
        let max_voices = config.max_voices.max(1);
        let voices = (0..max_voices)
            .map(|_| Voice::new(config.sample_rate))
            .collect();

        Self {
            config: EngineConfig {
                max_voices,
                ..config
            },
            voices,
            rx,
            pending: Vec::with_capacity(MAX_PENDING),
            clock: SampleClock::new(config.sample_rate as f64),
            next_age: 0,
        }
    }

    /// Handle on the audio clock this engine drives
    pub fn clock(&self) -> SampleClock {
        self.clock.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    /// Notes received but not yet due
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Render one mono block and advance the clock by its length
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        while self.pending.len() < MAX_PENDING {
            match self.rx.pop() {
                Ok(event) => self.pending.push(event),
                Err(_) => break,
            }
        }

        let block_start = self.clock.frames();
        let block_end = block_start + out.len() as u64;

        // Sorting in place keeps this allocation-free
        self.pending
            .sort_unstable_by(|a, b| a.start_time.total_cmp(&b.start_time));
        let clock = &self.clock;
        let due = self
            .pending
            .partition_point(|e| clock.frame_at(e.start_time) < block_end);

        let mut cursor = 0;
        for i in 0..due {
            let event = self.pending[i];
            let frame = self.clock.frame_at(event.start_time);
            let offset = frame.saturating_sub(block_start) as usize;

            if offset > cursor {
                self.render_voices(&mut out[cursor..offset]);
                cursor = offset;
            }
            if frame < block_start {
                log::debug!(
                    "late note: {:.1} ms behind",
                    (block_start - frame) as f64 * 1_000.0 / self.clock.sample_rate()
                );
            }
            self.start_voice(event);
        }
        self.render_voices(&mut out[cursor..]);
        self.pending.drain(..due);

        self.clock.advance(out.len() as u64);
    }

    fn render_voices(&mut self, out: &mut [f32]) {
        if out.is_empty() {
            return;
        }
        for voice in self.voices.iter_mut().filter(|v| !v.is_free()) {
            voice.render_add(out);
        }
    }

    fn start_voice(&mut self, event: NoteEvent) {
        let age = self.next_age;
        self.next_age += 1;

        let idx = match self.voices.iter().position(|v| v.is_free()) {
            Some(idx) => idx,
            None => {
                // Pool is full: steal the oldest
                let oldest = self
                    .voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(idx, _)| idx)
                    .unwrap_or(0);
                log::trace!("stealing voice {oldest}");
                oldest
            }
        };
        self.voices[idx].start(event.params, age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::sequencing::AudioClock;
    use crate::synth::message::{note_channel, NoteParams};

    const SR: f32 = 48_000.0;

    fn event(start_time: f64) -> NoteEvent {
        NoteEvent {
            start_time,
            params: NoteParams::from_cell(&Cell::default()),
        }
    }

    fn first_sound(buffer: &[f32]) -> Option<usize> {
        buffer.iter().position(|&s| s != 0.0)
    }

    #[test]
    fn advances_clock_per_block() {
        let (_tx, rx) = note_channel(4);
        let mut engine = Engine::new(EngineConfig::default(), rx);
        let clock = engine.clock();

        let mut out = vec![0.0; 480];
        engine.render(&mut out);
        engine.render(&mut out);
        assert_eq!(clock.frames(), 960);
        assert!((clock.now() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn starts_note_on_its_exact_frame() {
        let (mut tx, rx) = note_channel(4);
        let mut engine = Engine::new(EngineConfig::default(), rx);

        // Frame 100 of the first block. The envelope's first sample is 0, so
        // sound begins one frame later.
        tx.push(event(100.0 / SR as f64)).unwrap();
        let mut out = vec![0.0; 256];
        engine.render(&mut out);

        assert_eq!(first_sound(&out), Some(101));
        assert_eq!(engine.active_voices(), 1);
    }

    #[test]
    fn holds_future_notes_for_later_blocks() {
        let (mut tx, rx) = note_channel(4);
        let mut engine = Engine::new(EngineConfig::default(), rx);

        tx.push(event(300.0 / SR as f64)).unwrap();
        let mut out = vec![0.0; 256];
        engine.render(&mut out);
        assert_eq!(first_sound(&out), None);
        assert_eq!(engine.pending(), 1);

        engine.render(&mut out);
        // Frame 300 is offset 44 in the second block
        assert_eq!(first_sound(&out), Some(45));
        assert_eq!(engine.pending(), 0);
    }

    #[test]
    fn late_notes_start_immediately() {
        let (mut tx, rx) = note_channel(4);
        let mut engine = Engine::new(EngineConfig::default(), rx);

        let mut out = vec![0.0; 256];
        engine.render(&mut out);

        tx.push(event(0.0)).unwrap();
        engine.render(&mut out);
        assert_eq!(first_sound(&out), Some(1));
    }

    #[test]
    fn steals_oldest_voice_when_full() {
        let (mut tx, rx) = note_channel(8);
        let mut engine = Engine::new(EngineConfig::default().max_voices(2), rx);

        for i in 0..3 {
            tx.push(event(i as f64 * 0.001)).unwrap();
        }
        let mut out = vec![0.0; 512];
        engine.render(&mut out);
        assert_eq!(engine.active_voices(), 2);
        assert!(out.iter().all(|s| s.is_finite()));
    }
}
