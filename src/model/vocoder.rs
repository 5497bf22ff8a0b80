//! Vocoder: mel spectrogram → audio waveform.
//!
//! ```text
//! Spectrogram (frames, mel_bands)
//!   transpose, optional 1/max_abs_value scaling
//! graph: [1, mel_bands, frames] → [.., samples]
//!   flatten → Vec<f32>
//! ```

use std::path::Path;

use candle_core::{DType, Device};

use super::graph::OnnxGraph;
use super::{Spectrogram, Vocoder};
use crate::{Error, Result};

/// Vocoder input scaling.
#[derive(Debug, Clone)]
pub struct VocoderConfig {
    /// Divide the mel by `max_abs_value` before inference.
    pub normalize: bool,
    /// Largest absolute mel value the synthesizer emits.
    pub max_abs_value: f64,
}

impl Default for VocoderConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            max_abs_value: 4.0,
        }
    }
}

impl VocoderConfig {
    pub fn verify(&self) -> Result<()> {
        if self.normalize && self.max_abs_value <= 0.0 {
            return Err(Error::Config(format!(
                "max_abs_value must be positive, got {}",
                self.max_abs_value
            )));
        }
        Ok(())
    }
}

pub struct OnnxVocoder {
    graph: OnnxGraph,
    config: VocoderConfig,
    device: Device,
}

impl OnnxVocoder {
    pub fn load(path: impl AsRef<Path>, device: &Device) -> Result<Self> {
        Self::with_config(path, device, VocoderConfig::default())
    }

    pub fn with_config(
        path: impl AsRef<Path>,
        device: &Device,
        config: VocoderConfig,
    ) -> Result<Self> {
        config.verify()?;
        let graph = OnnxGraph::load(path.as_ref(), 1)?;
        tracing::info!(path = %path.as_ref().display(), "loaded vocoder");
        Ok(Self {
            graph,
            config,
            device: device.clone(),
        })
    }
}

impl Vocoder for OnnxVocoder {
    fn infer(&self, spectrogram: &Spectrogram) -> Result<Vec<f32>> {
        let mut mel = spectrogram
            .tensor()
            .to_device(&self.device)?
            .to_dtype(DType::F32)?
            .t()?
            .contiguous()?
            .unsqueeze(0)?;
        if self.config.normalize {
            mel = mel.affine(1.0 / self.config.max_abs_value, 0.0)?;
        }
        let wav = self.graph.run(vec![mel])?;
        let samples = wav.to_dtype(DType::F32)?.flatten_all()?.to_vec1::<f32>()?;
        if samples.is_empty() {
            return Err(Error::ModelContract("vocoder produced no samples".into()));
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        VocoderConfig::default().verify().unwrap();
    }

    #[test]
    fn bad_max_abs_value_rejected() {
        let config = VocoderConfig {
            max_abs_value: 0.0,
            ..Default::default()
        };
        assert!(config.verify().is_err());
        let unscaled = VocoderConfig {
            normalize: false,
            max_abs_value: 0.0,
        };
        unscaled.verify().unwrap();
    }

    #[test]
    fn missing_weights_rejected() {
        assert!(OnnxVocoder::load("/nonexistent/pretrained.onnx", &Device::Cpu).is_err());
    }
}
