//! Audio device setup and the hand-off between audio and UI threads.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};
use rtrb::RingBuffer;

use keybed::{
    synth::{RealtimeRenderer, RingBackend},
    EngineConfig, PolyphonyEngine, VoiceRegistry,
};

use crate::ui::UiApp;

/// Samples buffered for the oscilloscope between UI frames.
const SCOPE_CAPACITY: usize = 8192;

pub struct Keybed {
    octaves: u8,
    config: EngineConfig,
}

impl Keybed {
    pub fn new() -> Self {
        Self {
            octaves: 2,
            config: EngineConfig::default(),
        }
    }

    /// Octaves shown on the key bed, 1 to 3.
    pub fn octaves(mut self, octaves: u8) -> Self {
        self.octaves = octaves.clamp(1, 3);
        self
    }

    /// Open the default output device and run the UI until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = supported.sample_rate().0 as f32;
        let channels = supported.channels() as usize;
        info!(
            "output device {:?}: {sample_rate} Hz, {channels} channels",
            device.name().unwrap_or_default()
        );

        let config = self.config.with_sample_rate(sample_rate);
        let (backend, renderer) = RingBackend::realtime(&config);
        let engine = PolyphonyEngine::new(backend, VoiceRegistry::standard(), config)?;

        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
        let mut renderer: RealtimeRenderer = renderer;

        let stream = device.build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| {
                renderer.render_interleaved(data, channels);
                // first channel only; a full scope ring just loses samples
                for frame in data.chunks(channels) {
                    if scope_tx.push(frame[0]).is_err() {
                        break;
                    }
                }
            },
            |err| error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(engine, scope_rx, self.octaves, sample_rate).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for Keybed {
    fn default() -> Self {
        Self::new()
    }
}
