//! cpal output stream running the note engine

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, SupportedStreamConfig};
use rtrb::Producer;

use stepgrid::synth::Engine;

/// Largest block handed to the engine in one call
const BLOCK_SIZE: usize = 1024;

/// Headroom for overlapping voices
const MASTER_GAIN: f32 = 0.5;

pub struct Output {
    pub device: Device,
    pub config: SupportedStreamConfig,
}

impl Output {
    pub fn default_device() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        log::info!(
            "audio output: {} Hz, {} channels",
            config.sample_rate().0,
            config.channels()
        );
        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate().0 as f32
    }

    /// Move the engine onto the audio thread and start playing.
    ///
    /// Every rendered sample is also offered to `scope`; samples the UI has
    /// not collected yet are dropped.
    pub fn play(self, mut engine: Engine, mut scope: Producer<f32>) -> Result<Stream> {
        let Output { device, config } = self;
        let channels = config.channels() as usize;
        let mut buffer = vec![0.0f32; BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    for chunk in data.chunks_mut(BLOCK_SIZE * channels) {
                        let frames = chunk.len() / channels;
                        let block = &mut buffer[..frames];
                        engine.render(block);

                        for (frame, &sample) in chunk.chunks_mut(channels).zip(block.iter()) {
                            let sample = (sample * MASTER_GAIN).clamp(-1.0, 1.0);
                            frame.fill(sample);
                            let _ = scope.push(sample);
                        }
                    }
                },
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;
        Ok(stream)
    }
}
