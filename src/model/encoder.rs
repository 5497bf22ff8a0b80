//! Speaker encoder: waveform → speaker embedding.
//!
//! ```text
//! raw audio (any rate) ─ resample → 16 kHz ─ volume → -30 dBFS
//!                       ↓
//!              drop silences longer than the dilation window
//!                       ↓
//!              graph: [1, samples] → [1, D]
//!                       ↓
//!              L2 normalise → Embedding (D,)
//! ```

use std::path::Path;

use candle_core::{DType, Device, Tensor};

use super::graph::OnnxGraph;
use super::{Embedding, PreprocessedWaveform, SpeakerEncoder};
use crate::audio::{Waveform, normalize_volume, resample, trim_long_silences};
use crate::{Error, Result};

/// Encoder preprocessing parameters.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub sample_rate: u32,
    pub target_dbfs: f64,
    /// Frame length for silence detection, in milliseconds.
    pub vad_window_ms: u32,
    /// Frames quieter than this are silent.
    pub silence_threshold_dbfs: f64,
    /// Silent frames kept on each side of a voiced frame.
    pub silence_dilation: usize,
    /// Shortest usable utterance after preprocessing, in seconds.
    pub min_duration_s: f64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            target_dbfs: -30.0,
            vad_window_ms: 30,
            silence_threshold_dbfs: -50.0,
            silence_dilation: 6,
            min_duration_s: 0.1,
        }
    }
}

pub struct OnnxSpeakerEncoder {
    graph: OnnxGraph,
    config: EncoderConfig,
    device: Device,
}

impl OnnxSpeakerEncoder {
    pub fn load(path: impl AsRef<Path>, device: &Device) -> Result<Self> {
        Self::with_config(path, device, EncoderConfig::default())
    }

    pub fn with_config(
        path: impl AsRef<Path>,
        device: &Device,
        config: EncoderConfig,
    ) -> Result<Self> {
        let graph = OnnxGraph::load(path.as_ref(), 1)?;
        tracing::info!(path = %path.as_ref().display(), "loaded speaker encoder");
        Ok(Self {
            graph,
            config,
            device: device.clone(),
        })
    }
}

/// Resample, volume-normalise and trim long silences from raw audio.
pub fn preprocess(wav: &Waveform, config: &EncoderConfig) -> Result<PreprocessedWaveform> {
    let mut samples = resample(&wav.samples, wav.sample_rate, config.sample_rate)?;
    normalize_volume(&mut samples, config.target_dbfs, true);
    let frame_len = (config.sample_rate * config.vad_window_ms / 1000) as usize;
    let samples = trim_long_silences(
        &samples,
        frame_len,
        config.silence_threshold_dbfs,
        config.silence_dilation,
    );
    let processed = Waveform::new(samples, config.sample_rate);
    if processed.duration_s() < config.min_duration_s {
        return Err(Error::Audio(format!(
            "reference audio too short: {:.3}s, need at least {:.3}s",
            processed.duration_s(),
            config.min_duration_s
        )));
    }
    Ok(PreprocessedWaveform(processed))
}

/// Scale a vector to unit L2 norm. Zero vectors are rejected.
pub fn l2_normalize(tensor: &Tensor) -> Result<Tensor> {
    let norm = tensor.sqr()?.sum_all()?.sqrt()?;
    if norm.to_scalar::<f32>()? <= f32::EPSILON {
        return Err(Error::ModelContract("encoder returned a zero embedding".into()));
    }
    Ok(tensor.broadcast_div(&norm)?)
}

impl SpeakerEncoder for OnnxSpeakerEncoder {
    fn preprocess(&self, wav: &Waveform) -> Result<PreprocessedWaveform> {
        preprocess(wav, &self.config)
    }

    fn embed(&self, wav: &PreprocessedWaveform) -> Result<Embedding> {
        let samples = &wav.waveform().samples;
        let input = Tensor::from_slice(samples, (1, samples.len()), &self.device)?;
        let output = self.graph.run(vec![input])?;
        let flat = output.to_dtype(DType::F32)?.flatten_all()?;
        Embedding::new(l2_normalize(&flat)?)
    }
}
