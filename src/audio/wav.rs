//! WAV file I/O.
//!
//! Reference voices arrive as integer or float PCM at any rate; generated
//! audio is always written as 32-bit float.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{Error, Result};

/// Read a WAV file as interleaved f32 in [-1, 1].
///
/// Returns `(samples, sample_rate, channels)`.
pub fn read_wav(path: impl AsRef<Path>) -> Result<(Vec<f32>, u32, u16)> {
    let mut reader = WavReader::open(path)?;
    let WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format,
    } = reader.spec();
    if channels == 0 || sample_rate == 0 {
        return Err(Error::Audio(format!(
            "unusable WAV header: {channels} channels at {sample_rate} Hz"
        )));
    }

    let samples = match sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<Vec<_>>>()?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<hound::Result<Vec<_>>>()?
        }
    };
    Ok((samples, sample_rate, channels))
}

/// Write interleaved samples as 32-bit float PCM.
pub fn write_wav(
    path: impl AsRef<Path>,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    samples.iter().try_for_each(|&s| writer.write_sample(s))?;
    writer.finalize()?;
    Ok(())
}
