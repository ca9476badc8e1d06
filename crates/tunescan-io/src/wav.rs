//! WAV file reading and writing.
//!
//! Turn-by-turn records are stored one pickup per channel, one turn per
//! frame. Integer PCM is scaled to `[-1, 1)`; 32-bit files are written as
//! IEEE float so beam positions survive unscaled.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of channels (pickups).
    pub channels: u16,
    /// Sample rate in Hz. For beam data this is the revolution frequency.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Samples per channel.
    pub num_frames: u64,
    /// Whether samples are stored as IEEE float.
    pub is_float: bool,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        is_float: spec.sample_format == SampleFormat::Float,
    })
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            // LHC revolution frequency
            sample_rate: 11245,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Magnitude of the most negative integer sample at `bits` depth.
fn full_scale(bits: u16) -> f64 {
    2f64.powi(i32::from(bits) - 1)
}

/// Decode every sample of `path` interleaved, returning them with the spec.
fn read_interleaved(path: &Path) -> Result<(Vec<f64>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();
    let spec = WavSpec::from(hound_spec);

    let samples: Vec<f64> = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = full_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok((samples, spec))
}

/// Read a WAV file and return samples as f64 along with the spec.
///
/// Multi-channel files are mixed down to mono by averaging channels.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f64>, WavSpec)> {
    let (samples, spec) = read_interleaved(path.as_ref())?;
    let channels = spec.channels as usize;

    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f64>() / channels as f64)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec))
}

/// Read a single channel of a WAV file.
pub fn read_wav_channel<P: AsRef<Path>>(path: P, channel: usize) -> Result<(Vec<f64>, WavSpec)> {
    let (samples, spec) = read_interleaved(path.as_ref())?;
    let channels = spec.channels as usize;
    if channel >= channels {
        return Err(Error::Selection(format!(
            "channel {channel} requested but file has {channels}"
        )));
    }

    let selected = samples
        .chunks_exact(channels)
        .map(|frame| frame[channel])
        .collect();
    Ok((selected, spec))
}

/// Write a mono signal to a WAV file.
///
/// `spec.channels` is ignored and forced to 1.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f64], spec: WavSpec) -> Result<()> {
    write_wav_channels(path, &[samples], WavSpec { channels: 1, ..spec })
}

/// Write one signal per channel, interleaved frame by frame.
///
/// Every channel must have the same length.
pub fn write_wav_channels<P: AsRef<Path>, S: AsRef<[f64]>>(
    path: P,
    channels: &[S],
    spec: WavSpec,
) -> Result<()> {
    let frames = channels.first().map_or(0, |c| c.as_ref().len());
    if let Some(bad) = channels.iter().position(|c| c.as_ref().len() != frames) {
        return Err(Error::Selection(format!(
            "channel {bad} has {} samples, expected {frames}",
            channels[bad].as_ref().len()
        )));
    }

    let hound_spec = hound::WavSpec::from(WavSpec {
        channels: channels.len() as u16,
        ..spec
    });
    let mut writer = WavWriter::create(path, hound_spec)?;

    if spec.bits_per_sample == 32 {
        for frame in 0..frames {
            for channel in channels {
                writer.write_sample(channel.as_ref()[frame] as f32)?;
            }
        }
    } else {
        let max_val = full_scale(spec.bits_per_sample);
        for frame in 0..frames {
            for channel in channels {
                let scaled = (channel.as_ref()[frame] * max_val).clamp(-max_val, max_val - 1.0);
                writer.write_sample(scaled as i32)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
