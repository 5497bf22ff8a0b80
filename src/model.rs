//! Model collaborators for the voice cloning pipeline.
//!
//! ## Components
//!
//! - [`encoder`] — speaker encoder (waveform → embedding)
//! - [`synthesizer`] — text + embedding → mel spectrogram
//! - [`vocoder`] — mel spectrogram → waveform
//!
//! The orchestrator only talks to the traits defined here. The bundled
//! implementations evaluate pre-exported ONNX graphs through
//! [`graph::OnnxGraph`]; the networks themselves are opaque.

pub mod encoder;
pub mod graph;
pub mod synthesizer;
pub mod vocoder;

use candle_core::{Device, Tensor};

use crate::audio::Waveform;
use crate::config::ModelPaths;
use crate::{Error, Result};

pub use encoder::OnnxSpeakerEncoder;
pub use synthesizer::OnnxSynthesizer;
pub use vocoder::OnnxVocoder;

/// Audio already brought into the form the encoder expects.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedWaveform(pub Waveform);

impl PreprocessedWaveform {
    pub fn waveform(&self) -> &Waveform {
        &self.0
    }
}

/// Fixed-size speaker embedding, shape `(dim,)`.
#[derive(Debug, Clone)]
pub struct Embedding(Tensor);

impl Embedding {
    pub fn new(tensor: Tensor) -> Result<Self> {
        if tensor.rank() != 1 {
            return Err(Error::ModelContract(format!(
                "embedding must be 1-D, got shape {:?}",
                tensor.dims()
            )));
        }
        Ok(Self(tensor))
    }

    pub fn tensor(&self) -> &Tensor {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.dims()[0]
    }
}

/// Mel spectrogram, shape `(frames, mel_bands)`.
#[derive(Debug, Clone)]
pub struct Spectrogram(Tensor);

impl Spectrogram {
    pub fn new(tensor: Tensor) -> Result<Self> {
        if tensor.rank() != 2 {
            return Err(Error::ModelContract(format!(
                "spectrogram must be 2-D (frames, mel_bands), got shape {:?}",
                tensor.dims()
            )));
        }
        Ok(Self(tensor))
    }

    pub fn tensor(&self) -> &Tensor {
        &self.0
    }

    pub fn frames(&self) -> usize {
        self.0.dims()[0]
    }

    pub fn mel_bands(&self) -> usize {
        self.0.dims()[1]
    }
}

/// Waveform → speaker embedding.
pub trait SpeakerEncoder {
    /// Resample and normalise raw audio for [`SpeakerEncoder::embed`].
    fn preprocess(&self, wav: &Waveform) -> Result<PreprocessedWaveform>;

    fn embed(&self, wav: &PreprocessedWaveform) -> Result<Embedding>;
}

/// Text + speaker embedding → mel spectrogram.
pub trait Synthesizer {
    /// Sample rate of the audio the pipeline produces.
    fn sample_rate(&self) -> u32;

    /// Batched synthesis. `texts` and `embeddings` pair up one-to-one and the
    /// result has the same length.
    fn synthesize(&self, texts: &[String], embeddings: &[Embedding]) -> Result<Vec<Spectrogram>>;
}

/// Mel spectrogram → raw samples at the synthesizer's sample rate.
pub trait Vocoder {
    fn infer(&self, spectrogram: &Spectrogram) -> Result<Vec<f32>>;
}

/// Loads the three models. Each call is blocking.
pub trait ModelLoader {
    fn load_encoder(&self) -> Result<Box<dyn SpeakerEncoder>>;
    fn load_synthesizer(&self) -> Result<Box<dyn Synthesizer>>;
    fn load_vocoder(&self) -> Result<Box<dyn Vocoder>>;
}

/// The three loaded models.
pub struct Models {
    pub encoder: Box<dyn SpeakerEncoder>,
    pub synthesizer: Box<dyn Synthesizer>,
    pub vocoder: Box<dyn Vocoder>,
}

impl Models {
    /// Load encoder, synthesizer, then vocoder. Stops at the first failure.
    pub fn load(loader: &dyn ModelLoader) -> Result<Self> {
        tracing::info!("loading speaker encoder");
        let encoder = loader.load_encoder()?;
        tracing::info!("loading synthesizer");
        let synthesizer = loader.load_synthesizer()?;
        tracing::info!("loading vocoder");
        let vocoder = loader.load_vocoder()?;
        Ok(Self {
            encoder,
            synthesizer,
            vocoder,
        })
    }
}

/// Loads the ONNX implementations from [`ModelPaths`].
pub struct OnnxModelLoader {
    paths: ModelPaths,
    device: Device,
}

impl OnnxModelLoader {
    pub fn new(paths: ModelPaths, device: Device) -> Self {
        Self { paths, device }
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load_encoder(&self) -> Result<Box<dyn SpeakerEncoder>> {
        Ok(Box::new(OnnxSpeakerEncoder::load(
            &self.paths.encoder,
            &self.device,
        )?))
    }

    fn load_synthesizer(&self) -> Result<Box<dyn Synthesizer>> {
        Ok(Box::new(OnnxSynthesizer::load(
            self.paths.synthesizer_checkpoint(),
            &self.device,
        )?))
    }

    fn load_vocoder(&self) -> Result<Box<dyn Vocoder>> {
        Ok(Box::new(OnnxVocoder::load(
            &self.paths.vocoder,
            &self.device,
        )?))
    }
}
