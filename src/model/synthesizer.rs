//! Spectrogram synthesizer: (text, speaker embedding) → mel spectrogram.
//!
//! Loaded from a checkpoint directory holding `hparams.json` and the
//! exported graph. The graph is evaluated once per batch item:
//!
//! ```text
//! ids:       [1, T]   i64
//! embedding: [1, D]   f32
//! output:    [1, mel_bands, frames] → transposed to (frames, mel_bands)
//! ```

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use serde::{Deserialize, Serialize};

use super::graph::OnnxGraph;
use super::{Embedding, Spectrogram, Synthesizer};
use crate::text::{SymbolTable, default_symbols};
use crate::{Error, Result};

/// Synthesizer hyperparameters stored next to the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    pub sample_rate: u32,
    pub num_mels: usize,
    /// Ordered symbol list; the position of each character is its id.
    pub symbols: String,
    /// Graph file name inside the checkpoint directory.
    pub graph_file: String,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            num_mels: 80,
            symbols: default_symbols(),
            graph_file: "synthesizer.onnx".to_string(),
        }
    }
}

impl SynthesizerConfig {
    /// Read `hparams.json` from `dir`, or use defaults when it is absent.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join("hparams.json");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no hparams.json, using defaults");
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        if config.sample_rate == 0 || config.num_mels == 0 {
            return Err(Error::Config(format!(
                "{}: sample_rate and num_mels must be positive",
                path.display()
            )));
        }
        Ok(config)
    }
}

pub struct OnnxSynthesizer {
    graph: OnnxGraph,
    symbols: SymbolTable,
    config: SynthesizerConfig,
    device: Device,
}

impl OnnxSynthesizer {
    /// Load from a checkpoint directory (e.g. `logs-pretrained/taco_pretrained`).
    pub fn load(dir: impl AsRef<Path>, device: &Device) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::ModelLoad(format!(
                "synthesizer directory not found: {}",
                dir.display()
            )));
        }
        let config = SynthesizerConfig::from_dir(dir)?;
        let symbols = SymbolTable::new(&config.symbols)?;
        let graph = OnnxGraph::load(dir.join(&config.graph_file), 2)?;
        tracing::info!(
            dir = %dir.display(),
            sample_rate = config.sample_rate,
            num_mels = config.num_mels,
            "loaded synthesizer"
        );
        Ok(Self {
            graph,
            symbols,
            config,
            device: device.clone(),
        })
    }

    fn synthesize_one(&self, text: &str, embedding: &Embedding) -> Result<Spectrogram> {
        let ids = self.symbols.encode(text);
        let len = ids.len();
        let ids = Tensor::from_vec(ids, (1, len), &self.device)?;
        let embed = embedding.tensor().to_device(&self.device)?.unsqueeze(0)?;
        let mel = self.graph.run(vec![ids, embed])?.to_dtype(DType::F32)?;
        to_frames_major(&mel, self.config.num_mels)
    }
}

/// Convert a `[1, mel_bands, frames]` graph output to `(frames, mel_bands)`.
pub fn to_frames_major(mel: &Tensor, num_mels: usize) -> Result<Spectrogram> {
    let mel = match mel.rank() {
        3 => mel.squeeze(0)?,
        2 => mel.clone(),
        _ => {
            return Err(Error::ModelContract(format!(
                "synthesizer output must be [1, mels, frames], got {:?}",
                mel.dims()
            )));
        }
    };
    if mel.dims()[0] != num_mels {
        return Err(Error::ModelContract(format!(
            "expected {num_mels} mel bands, got shape {:?}",
            mel.dims()
        )));
    }
    Spectrogram::new(mel.t()?.contiguous()?)
}

impl Synthesizer for OnnxSynthesizer {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn synthesize(&self, texts: &[String], embeddings: &[Embedding]) -> Result<Vec<Spectrogram>> {
        if texts.len() != embeddings.len() {
            return Err(Error::ModelContract(format!(
                "{} texts but {} embeddings",
                texts.len(),
                embeddings.len()
            )));
        }
        texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| self.synthesize_one(text, embedding))
            .collect()
    }
}
