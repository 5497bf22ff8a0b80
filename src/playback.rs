//! Fire-and-forget audio playback.
//!
//! `play` hands the samples to the output device and returns immediately;
//! mixing happens on the device's own thread. `stop` silences whatever is
//! still playing so successive results never overlap.

use crate::audio::Waveform;
use crate::Result;

pub trait AudioPlayback {
    /// Stop any audio still playing. A no-op when idle.
    fn stop(&mut self) -> Result<()>;

    /// Start playing `wav` without waiting for it to finish.
    fn play(&mut self, wav: &Waveform) -> Result<()>;
}

/// Playback disabled (`--no-sound`).
#[derive(Debug, Default)]
pub struct NoPlayback;

impl AudioPlayback for NoPlayback {
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn play(&mut self, wav: &Waveform) -> Result<()> {
        tracing::debug!(
            duration_s = wav.duration_s(),
            "playback disabled, skipping"
        );
        Ok(())
    }
}

#[cfg(feature = "playback")]
pub use device::RodioPlayback;

#[cfg(feature = "playback")]
mod device {
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::AudioPlayback;
    use crate::audio::Waveform;
    use crate::{Error, Result};

    /// Plays through the default output device.
    ///
    /// Each `play` gets a fresh sink; dropping the previous one stops it.
    pub struct RodioPlayback {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sink: Option<Sink>,
    }

    impl RodioPlayback {
        /// Open the default output device.
        pub fn open_default() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| Error::Playback(format!("failed to open audio output: {e}")))?;
            Ok(Self {
                _stream: stream,
                handle,
                sink: None,
            })
        }
    }

    impl AudioPlayback for RodioPlayback {
        fn stop(&mut self) -> Result<()> {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            Ok(())
        }

        fn play(&mut self, wav: &Waveform) -> Result<()> {
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| Error::Playback(format!("failed to create audio sink: {e}")))?;
            sink.append(SamplesBuffer::new(1, wav.sample_rate, wav.samples.clone()));
            tracing::debug!(duration_s = wav.duration_s(), "playback started");
            self.sink = Some(sink);
            Ok(())
        }
    }
}
