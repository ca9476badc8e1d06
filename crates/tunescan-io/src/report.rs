//! Export of extraction results.
//!
//! JSON carries the whole run (source, options, termination and every
//! component). CSV carries only the component table, one line per
//! extracted frequency.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tunescan_analysis::{Component, Decomposition, NaffConfig, Termination};

/// Serializable summary of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Where the samples came from (usually a file path).
    pub source: String,
    /// Number of samples analysed.
    pub points: usize,
    /// Options the run used.
    pub config: NaffConfig,
    /// Populated components in extraction order.
    pub components: Vec<Component>,
    /// Why the loop stopped.
    pub termination: Termination,
}

impl AnalysisReport {
    /// Build a report from a finished decomposition.
    pub fn new(
        source: impl Into<String>,
        points: usize,
        config: &NaffConfig,
        result: &Decomposition,
    ) -> Self {
        Self {
            source: source.into(),
            points,
            config: config.clone(),
            components: result.components().collect(),
            termination: result.termination,
        }
    }
}

/// Write a report as pretty-printed JSON.
pub fn write_report_json<P: AsRef<Path>>(report: &AnalysisReport, path: P) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Read a report previously written by [`write_report_json`].
pub fn read_report_json<P: AsRef<Path>>(path: P) -> Result<AnalysisReport> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

/// Write the component table as CSV.
pub fn write_report_csv<P: AsRef<Path>>(report: &AnalysisReport, path: P) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "frequency,amplitude,phase,significance")?;
    for c in &report.components {
        writeln!(
            out,
            "{:.10},{:.10},{:.10},{:.10}",
            c.frequency, c.amplitude, c.phase, c.significance
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Write a report, choosing CSV for `.csv` paths and JSON otherwise.
pub fn write_report<P: AsRef<Path>>(report: &AnalysisReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        write_report_csv(report, path)
    } else {
        write_report_json(report, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            source: "bpm.wav".to_string(),
            points: 1024,
            config: NaffConfig::default(),
            components: vec![
                Component {
                    frequency: 0.31,
                    amplitude: 1.0,
                    phase: 0.25,
                    significance: 0.01,
                },
                Component {
                    frequency: 0.28,
                    amplitude: 0.2,
                    phase: -1.5,
                    significance: 0.5,
                },
            ],
            termination: Termination::FrequencyLimit,
        }
    }

    #[test]
    fn json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample_report();
        write_report(&report, &path).unwrap();

        let loaded = read_report_json(&path).unwrap();
        assert_eq!(loaded, report);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"termination\": \"frequency_limit\""), "{text}");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.CSV");
        write_report(&sample_report(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "frequency,amplitude,phase,significance");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0.3100000000,1.0000000000,"));
        assert!(lines[2].contains("-1.5000000000"));
    }

    #[test]
    fn report_from_decomposition_keeps_populated_prefix() {
        let samples: Vec<f64> = (0..512)
            .map(|i| (std::f64::consts::TAU * 0.2 * f64::from(i)).sin())
            .collect();
        let config = NaffConfig {
            max_frequencies: 4,
            frac_rms_change_limit: 1e-3,
            upper_freq_limit: 0.5,
            ..NaffConfig::default()
        };
        let result = tunescan_analysis::perform_naff(&samples, &config).unwrap();
        let report = AnalysisReport::new("synthetic", samples.len(), &config, &result);
        assert_eq!(report.components.len(), result.found);
        assert_eq!(report.points, 512);
        assert!(report.components.iter().all(|c| c.significance >= 0.0));
    }
}
