//! Audio utilities.
//!
//! WAV read/write, mono downmix, resampling, and the small amount of
//! post-processing the demo does on generated audio.

mod resample;
mod wav;

pub use resample::resample;
pub use wav::{read_wav, write_wav};

use std::path::Path;

use crate::Result;

/// A mono waveform and its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Load a WAV file, downmixing to mono.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let (samples, sample_rate, channels) = read_wav(path)?;
        Ok(Self::new(downmix(&samples, channels), sample_rate))
    }

    /// Write as a mono 32-bit float WAV file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_wav(path, &self.samples, self.sample_rate, 1)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_s(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Append `count` zero samples.
    pub fn pad_silence(mut self, count: usize) -> Self {
        self.samples.resize(self.samples.len() + count, 0.0);
        self
    }
}

/// Average interleaved channels down to one.
pub fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Scale samples so their average power reaches `target_dbfs`.
///
/// With `increase_only`, quiet input is raised but loud input is left alone.
/// Silent input is returned unchanged.
pub fn normalize_volume(samples: &mut [f32], target_dbfs: f64, increase_only: bool) {
    if samples.is_empty() {
        return;
    }
    let mean_square =
        samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64;
    if mean_square <= 0.0 {
        return;
    }
    let change_db = target_dbfs - 10.0 * mean_square.log10();
    if change_db < 0.0 && increase_only {
        return;
    }
    let gain = 10f64.powf(change_db / 20.0) as f32;
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// Remove long silences.
///
/// The signal is cut into frames of `frame_len` samples. A frame is voiced
/// when its power exceeds `threshold_dbfs`; silent frames survive only
/// within `dilation` frames of a voiced one, so short pauses between words
/// are kept. Input with no voiced frame at all is returned unchanged.
pub fn trim_long_silences(
    samples: &[f32],
    frame_len: usize,
    threshold_dbfs: f64,
    dilation: usize,
) -> Vec<f32> {
    if samples.is_empty() || frame_len == 0 {
        return samples.to_vec();
    }
    let frames: Vec<&[f32]> = samples.chunks(frame_len).collect();
    let voiced: Vec<usize> = frames
        .iter()
        .enumerate()
        .filter(|(_, frame)| frame_dbfs(frame) > threshold_dbfs)
        .map(|(i, _)| i)
        .collect();
    if voiced.is_empty() {
        return samples.to_vec();
    }

    let mut keep = vec![false; frames.len()];
    for &i in &voiced {
        let end = (i + dilation).min(frames.len() - 1);
        keep[i.saturating_sub(dilation)..=end].fill(true);
    }
    frames
        .iter()
        .zip(keep)
        .filter(|(_, keep)| *keep)
        .flat_map(|(frame, _)| frame.iter().copied())
        .collect()
}

fn frame_dbfs(frame: &[f32]) -> f64 {
    let mean_square =
        frame.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / frame.len() as f64;
    10.0 * mean_square.log10()
}
