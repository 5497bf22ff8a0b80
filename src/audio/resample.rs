//! Sample-rate conversion via rubato's sinc resampler.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::{Error, Result};

/// Resample mono audio from `src_rate` to `target_rate`.
///
/// The whole input is processed as a single chunk, then the resampler is
/// flushed. The filter delay is removed so the output lines up with the
/// input and has `len * target_rate / src_rate` samples.
pub fn resample(samples: &[f32], src_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if src_rate == 0 || target_rate == 0 {
        return Err(Error::Audio(format!(
            "sample rates must be positive, got {src_rate} -> {target_rate}"
        )));
    }
    if src_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = target_rate as f64 / src_rate as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)
        .map_err(|e| Error::Audio(format!("resampler setup: {e}")))?;
    let delay = resampler.output_delay();

    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| Error::Audio(format!("resampling: {e}")))?
        .pop()
        .unwrap_or_default();
    while output.len() < delay + expected {
        let tail = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| Error::Audio(format!("resampler flush: {e}")))?
            .pop()
            .unwrap_or_default();
        if tail.is_empty() {
            break;
        }
        output.extend(tail);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}
