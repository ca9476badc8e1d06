//! Caller-supplied options for the peeling loop.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Strategy used to refine each coarse FFT peak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Refinement {
    /// Bracket-and-refine on the correlation merit, two attempts, falling
    /// back to the FFT bin on failure.
    #[default]
    Parabolic,
    /// Brent's method on the windowed inner-product merit over the peak bin
    /// and its two neighbours.
    Brent,
}

/// Options controlling frequency extraction.
///
/// Frequencies are expressed in cycles per unit of `dt`; with `dt = 1` they
/// are cycles per sample (the tune, for turn-by-turn data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaffConfig {
    /// Upper bound on extracted components.
    pub max_frequencies: usize,
    /// Stop once an iteration lowers the residual RMS by less than this
    /// fraction of the original RMS. `0` disables the check.
    pub frac_rms_change_limit: f64,
    /// Refinement cycle cap for the parabolic optimizer.
    pub freq_cycle_limit: usize,
    /// Frequency precision target as a fraction of the Nyquist frequency.
    pub frac_freq_accuracy_limit: f64,
    /// Lowest frequency considered in the coarse search.
    pub lower_freq_limit: f64,
    /// Highest frequency considered in the coarse search.
    pub upper_freq_limit: f64,
    /// Time of the first sample, used for phase referencing.
    pub t0: f64,
    /// Sample spacing.
    pub dt: f64,
    /// Peak refinement strategy.
    pub refinement: Refinement,
}

impl Default for NaffConfig {
    fn default() -> Self {
        Self {
            max_frequencies: 8,
            frac_rms_change_limit: 0.0,
            freq_cycle_limit: 100,
            frac_freq_accuracy_limit: 0.01,
            lower_freq_limit: 0.0,
            upper_freq_limit: 100.0,
            t0: 0.0,
            dt: 1.0,
            refinement: Refinement::Parabolic,
        }
    }
}

impl NaffConfig {
    /// Check that every option is usable.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("frac_rms_change_limit", self.frac_rms_change_limit),
            ("frac_freq_accuracy_limit", self.frac_freq_accuracy_limit),
            ("lower_freq_limit", self.lower_freq_limit),
            ("upper_freq_limit", self.upper_freq_limit),
            ("t0", self.t0),
            ("dt", self.dt),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidConfig(format!("{name} must be finite, got {value}")));
        }
        if self.dt <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if self.frac_freq_accuracy_limit < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "frac_freq_accuracy_limit must not be negative, got {}",
                self.frac_freq_accuracy_limit
            )));
        }
        if self.lower_freq_limit > self.upper_freq_limit {
            return Err(Error::InvalidConfig(format!(
                "lower_freq_limit {} exceeds upper_freq_limit {}",
                self.lower_freq_limit, self.upper_freq_limit
            )));
        }
        Ok(())
    }

    /// Nyquist frequency in output units.
    pub fn nyquist(&self) -> f64 {
        0.5 / self.dt
    }
}
