//! Tunescan I/O - sample ingestion, report export and configuration files
//!
//! This crate moves data in and out of the analysis core:
//!
//! - [`wav`] - WAV reading (mixed to mono or a single channel) and writing via `hound`
//! - [`text`] - Whitespace or comma separated column files
//! - [`report`] - JSON and CSV export of extracted components
//! - [`config`] - TOML persistence for [`NaffConfig`](tunescan_analysis::NaffConfig)
//!
//! [`read_samples`] picks the reader from the file extension and applies a
//! [`SampleSelection`] so callers can analyse a window of a long record.

pub mod config;
pub mod report;
pub mod text;
pub mod wav;

pub use config::{ConfigError, load_config, save_config};
pub use report::{
    AnalysisReport, read_report_json, write_report, write_report_csv, write_report_json,
};
pub use text::{parse_columns, read_column, write_columns};
pub use wav::{
    WavInfo, WavSpec, read_wav, read_wav_channel, read_wav_info, write_wav, write_wav_channels,
};

use std::path::Path;
use thiserror::Error;

/// Errors produced while reading or writing tunescan files.
#[derive(Debug, Error)]
pub enum Error {
    /// WAV decoding or encoding failed.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Underlying file system error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A text sample file held a value that is not a number.
    #[error("line {line}: cannot parse '{token}' as a number")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },

    /// A row had fewer columns than the one requested.
    #[error("line {line}: column {column} requested but only {found} present")]
    MissingColumn {
        /// 1-based line number.
        line: usize,
        /// 0-based column index that was requested.
        column: usize,
        /// Number of columns on that line.
        found: usize,
    },

    /// The requested slice lies outside the available samples.
    #[error("selection out of range: {0}")]
    Selection(String),
}

/// Result type for tunescan I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which part of a sample file to analyse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSelection {
    /// Channel (WAV) or column (text) index. `None` mixes WAV channels to
    /// mono and reads the first text column.
    pub column: Option<usize>,
    /// Number of leading samples to skip.
    pub offset: usize,
    /// Number of samples to keep after the offset. `None` keeps the rest.
    pub points: Option<usize>,
}

impl SampleSelection {
    /// Cut the selected window out of `samples`.
    pub fn apply(&self, mut samples: Vec<f64>) -> Result<Vec<f64>> {
        let available = samples.len();
        if self.offset > available {
            return Err(Error::Selection(format!(
                "offset {} beyond {available} samples",
                self.offset
            )));
        }
        samples.drain(..self.offset);
        if let Some(points) = self.points {
            if points > samples.len() {
                return Err(Error::Selection(format!(
                    "{points} points requested after offset {} but only {} remain",
                    self.offset,
                    samples.len()
                )));
            }
            samples.truncate(points);
        }
        Ok(samples)
    }
}

/// Read samples from `path`, dispatching on extension.
///
/// `.wav` files go through [`read_wav`] (or [`read_wav_channel`] when a
/// column is selected); every other extension is parsed as a text column
/// file.
pub fn read_samples<P: AsRef<Path>>(path: P, selection: &SampleSelection) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

    let samples = if is_wav {
        match selection.column {
            Some(channel) => read_wav_channel(path, channel)?.0,
            None => read_wav(path)?.0,
        }
    } else {
        read_column(path, selection.column.unwrap_or(0))?
    };

    tracing::debug!(
        path = %path.display(),
        total = samples.len(),
        offset = selection.offset,
        "loaded samples"
    );
    selection.apply(samples)
}
