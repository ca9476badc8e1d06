//! Plain-text column files.
//!
//! One row per turn, columns separated by whitespace or commas. Blank lines
//! and lines starting with `#` are skipped.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Parse column `column` (0-based) from a text reader.
pub fn parse_columns<R: BufRead>(reader: R, column: usize) -> Result<Vec<f64>> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let token = fields.get(column).ok_or(Error::MissingColumn {
            line: index + 1,
            column,
            found: fields.len(),
        })?;
        let value = token.parse::<f64>().map_err(|_| Error::Parse {
            line: index + 1,
            token: (*token).to_string(),
        })?;
        samples.push(value);
    }
    Ok(samples)
}

/// Read one column of a text sample file.
pub fn read_column<P: AsRef<Path>>(path: P, column: usize) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    parse_columns(BufReader::new(file), column)
}

/// Write one column per signal, rows separated by newlines.
///
/// Shorter signals leave their trailing cells out, so every signal should
/// have the same length.
pub fn write_columns<P: AsRef<Path>, S: AsRef<[f64]>>(path: P, columns: &[S]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# turn-by-turn samples, {} column(s)", columns.len())?;

    let rows = columns.iter().map(|c| c.as_ref().len()).max().unwrap_or(0);
    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .filter_map(|c| c.as_ref().get(row))
            .map(|v| format!("{v:.12e}"))
            .collect();
        writeln!(out, "{}", cells.join(" "))?;
    }
    out.flush()?;
    Ok(())
}
