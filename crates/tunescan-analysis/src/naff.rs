//! NAFF frequency peeling.
//!
//! Extracts the dominant spectral lines of a real, evenly sampled signal one
//! at a time:
//!
//! 1. Remove the mean and apply a Hann window to build the residual.
//! 2. Locate the strongest in-band FFT bin of the residual.
//! 3. Refine that bin to a continuous frequency with an optimizer.
//! 4. Fit cosine and sine amplitudes at the refined frequency, derive
//!    amplitude, phase and significance, and subtract the fit.
//! 5. Repeat until the frequency budget is spent, no peak remains, or the
//!    residual RMS stops dropping.
//!
//! # Example
//!
//! ```rust
//! use tunescan_analysis::naff::perform_naff;
//! use tunescan_analysis::NaffConfig;
//! use std::f64::consts::TAU;
//!
//! let samples: Vec<f64> = (0..1024).map(|i| (TAU * 0.31 * i as f64).sin()).collect();
//! let config = NaffConfig {
//!     max_frequencies: 1,
//!     frac_freq_accuracy_limit: 1e-6,
//!     upper_freq_limit: 0.5,
//!     ..NaffConfig::default()
//! };
//! let result = perform_naff(&samples, &config).unwrap();
//! assert_eq!(result.found, 1);
//! assert!((result.frequency[0] - 0.31).abs() < 1e-4);
//! ```

use crate::config::{NaffConfig, Refinement};
use crate::fft::{PowerSpectrum, RealForward, RustFftForward};
use crate::merit::{OverlapSums, correlation_power, minus_power};
use crate::optimize::{BrentOptimizer, Maximizer, ParabolicOptimizer, SearchInterval, Status};
use crate::window::hann;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Value stored in output slots that were never populated.
pub const SENTINEL: f64 = -1.0;

/// Basis energies below `DEGENERATE_ENERGY · points` are treated as zero.
const DEGENERATE_ENERGY: f64 = 1e-12;

/// Optimizer passes per component for the parabolic strategy.
const REFINE_ATTEMPTS: usize = 2;

/// Why the peeling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No in-band FFT bin carries energy above the DC bin.
    Converged,
    /// `max_frequencies` components were extracted.
    FrequencyLimit,
    /// The residual RMS dropped by less than `frac_rms_change_limit`.
    RmsChangeBelowLimit,
    /// The fit at the refined frequency could not be normalised, or would
    /// have increased the residual energy.
    Degenerate,
}

/// One extracted spectral line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Frequency in cycles per unit of `dt`.
    pub frequency: f64,
    /// Amplitude of the fitted sinusoid.
    pub amplitude: f64,
    /// Phase in `(−π, π]`, referenced to `t0`.
    pub phase: f64,
    /// Residual energy after removal divided by energy before, or −1.
    pub significance: f64,
}

impl Component {
    /// Convert a tune in cycles per turn to Hz.
    pub fn frequency_hz(&self, revolution_frequency: f64) -> f64 {
        self.frequency * revolution_frequency
    }
}

/// Output of one peeling run.
///
/// The four parallel vectors always have length `max_frequencies`; entries at
/// or beyond `found` hold [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Frequencies, in extraction order.
    pub frequency: Vec<f64>,
    /// Amplitudes.
    pub amplitude: Vec<f64>,
    /// Phases.
    pub phase: Vec<f64>,
    /// Significances.
    pub significance: Vec<f64>,
    /// Number of populated entries.
    pub found: usize,
    /// Terminal state of the loop.
    pub termination: Termination,
    /// Windowed residual energy before the first and after every extraction.
    pub residual_energy: Vec<f64>,
}

impl Decomposition {
    fn empty(max_frequencies: usize) -> Self {
        Self {
            frequency: vec![SENTINEL; max_frequencies],
            amplitude: vec![SENTINEL; max_frequencies],
            phase: vec![SENTINEL; max_frequencies],
            significance: vec![SENTINEL; max_frequencies],
            found: 0,
            termination: Termination::FrequencyLimit,
            residual_energy: Vec::new(),
        }
    }

    fn push(&mut self, component: Component) {
        let i = self.found;
        self.frequency[i] = component.frequency;
        self.amplitude[i] = component.amplitude;
        self.phase[i] = component.phase;
        self.significance[i] = component.significance;
        self.found += 1;
    }

    /// Number of populated components.
    pub fn len(&self) -> usize {
        self.found
    }

    /// Whether no component was extracted.
    pub fn is_empty(&self) -> bool {
        self.found == 0
    }

    /// Component at `index`, if populated.
    pub fn component(&self, index: usize) -> Option<Component> {
        (index < self.found).then(|| Component {
            frequency: self.frequency[index],
            amplitude: self.amplitude[index],
            phase: self.phase[index],
            significance: self.significance[index],
        })
    }

    /// Iterate over populated components in extraction order.
    pub fn components(&self) -> impl Iterator<Item = Component> + '_ {
        (0..self.found).filter_map(|i| self.component(i))
    }
}

/// Wrap an angle into `(−π, π]`.
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = (phase + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Reusable peeling engine for buffers of a fixed length.
///
/// The window, working buffers and transform plan are allocated once by the
/// constructor and reused by every [`analyze`](Self::analyze) call.
pub struct Naff<T: RealForward = RustFftForward> {
    points: usize,
    window: Vec<f64>,
    /// Windowed residual: `raw · window`.
    residual: Vec<f64>,
    /// Mean-removed residual before windowing.
    raw: Vec<f64>,
    spectrum: PowerSpectrum<T>,
}

impl Naff<RustFftForward> {
    /// Plan an engine for `points` samples.
    pub fn new(points: usize) -> Result<Self> {
        if points < 2 {
            return Err(Error::TooFewPoints { points });
        }
        Self::with_transform(RustFftForward::new(points))
    }
}

/// Fitted coefficients of the component just removed.
struct Fit {
    cos: f64,
    sin: f64,
    significance: f64,
}

impl<T: RealForward> Naff<T> {
    /// Build an engine around an existing forward transform.
    pub fn with_transform(transform: T) -> Result<Self> {
        let points = transform.len();
        let window = hann(points)?;
        Ok(Self {
            points,
            window,
            residual: vec![0.0; points],
            raw: vec![0.0; points],
            spectrum: PowerSpectrum::with_transform(transform),
        })
    }

    /// Buffer length the engine was planned for.
    pub fn points(&self) -> usize {
        self.points
    }

    /// Hann coefficients applied to every buffer.
    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// Extract up to `config.max_frequencies` components from `samples`.
    ///
    /// # Errors
    ///
    /// Fails only on invalid input: fewer than two samples, a buffer whose
    /// length differs from [`points`](Self::points), or an invalid config.
    /// Optimizer failures and degenerate fits are absorbed into the result.
    pub fn analyze(&mut self, samples: &[f64], config: &NaffConfig) -> Result<Decomposition> {
        if samples.len() < 2 {
            return Err(Error::TooFewPoints {
                points: samples.len(),
            });
        }
        if samples.len() != self.points {
            return Err(Error::LengthMismatch {
                expected: self.points,
                actual: samples.len(),
            });
        }
        config.validate()?;

        let points = self.points;
        let dt = config.dt;
        let freq_spacing = 1.0 / (points as f64 * dt);

        let mean = samples.iter().sum::<f64>() / points as f64;
        for i in 0..points {
            self.raw[i] = samples[i] - mean;
            self.residual[i] = self.raw[i] * self.window[i];
        }

        let mut result = Decomposition::empty(config.max_frequencies);
        let initial_energy = energy(&self.residual);
        result.residual_energy.push(initial_energy);

        let rms_orig = (initial_energy / points as f64).sqrt();
        let mut rms_last = rms_orig;

        // The two highest bins are left out of the coarse search.
        let scan_bins = self.spectrum.bins().saturating_sub(2);

        result.termination = loop {
            if result.found >= config.max_frequencies {
                break Termination::FrequencyLimit;
            }

            let (best_bin, max_mag2) = {
                let magnitude2 = self.spectrum.magnitude_squared(&self.residual);
                let mut best = (0, 0.0);
                for (i, &m) in magnitude2.iter().enumerate().take(scan_bins) {
                    let f = i as f64 * freq_spacing;
                    if m > best.1 && f >= config.lower_freq_limit && f <= config.upper_freq_limit {
                        best = (i, m);
                    }
                }
                best
            };

            if best_bin == 0 {
                break Termination::Converged;
            }

            let omega = match config.refinement {
                Refinement::Parabolic => self.refine_parabolic(best_bin, config),
                Refinement::Brent => self.refine_brent(best_bin, config),
            };

            let Some(fit) = self.subtract(omega, dt) else {
                tracing::warn!(
                    frequency = omega / TAU,
                    "degenerate fit, stopping extraction"
                );
                break Termination::Degenerate;
            };

            let phase = wrap_phase((-fit.sin).atan2(fit.cos) + (omega * config.t0) % TAU);
            let component = Component {
                frequency: omega / TAU,
                amplitude: fit.cos.hypot(fit.sin),
                phase,
                significance: fit.significance,
            };
            tracing::debug!(
                index = result.found,
                bin = best_bin,
                coarse_power = max_mag2,
                frequency = component.frequency,
                amplitude = component.amplitude,
                phase = component.phase,
                significance = component.significance,
                "extracted component"
            );
            result.push(component);

            let remaining = energy(&self.residual);
            result.residual_energy.push(remaining);

            if config.frac_rms_change_limit != 0.0 && rms_orig > 0.0 {
                let rms_now = (remaining / points as f64).sqrt();
                if (rms_last - rms_now) / rms_orig < config.frac_rms_change_limit {
                    break Termination::RmsChangeBelowLimit;
                }
                rms_last = rms_now;
            }
        };

        Ok(result)
    }

    /// Refine bin `bin` with the parabolic optimizer on the correlation merit.
    ///
    /// Returns an angular frequency. Falls back to the bin centre if either
    /// attempt leaves the search interval or fails to bracket.
    fn refine_parabolic(&self, bin: usize, config: &NaffConfig) -> f64 {
        let dt = config.dt;
        let freq_spacing = 1.0 / (self.points as f64 * dt);
        let w_start = bin as f64 * freq_spacing * TAU;

        let optimizer = ParabolicOptimizer::new(
            config.freq_cycle_limit,
            config.frac_freq_accuracy_limit * PI / dt,
        );
        let residual = &self.residual;
        let mut merit = |omega: f64| correlation_power(residual, omega, dt);

        let mut guess = w_start;
        for attempt in 0..REFINE_ATTEMPTS {
            let interval = SearchInterval {
                lower: 0.0,
                upper: PI / dt,
                guess,
                step: TAU * freq_spacing,
            };
            let optimum = optimizer.maximize(&mut merit, &interval);
            if !optimum.is_refined() {
                tracing::warn!(
                    attempt,
                    status = ?optimum.status,
                    frequency = w_start / TAU,
                    "refinement failed, keeping FFT estimate"
                );
                return w_start;
            }
            if optimum.status == Status::IterationLimitReached {
                tracing::warn!(
                    attempt,
                    cycles = config.freq_cycle_limit,
                    "refinement hit its cycle limit"
                );
            }
            guess = optimum.x;
        }
        guess
    }

    /// Refine bin `bin` with Brent's method on the windowed inner product,
    /// searching between the neighbouring bins.
    fn refine_brent(&self, bin: usize, config: &NaffConfig) -> f64 {
        let n = self.points as f64;
        let lower = (bin as f64 - 1.0).max(0.0) / n;
        let upper = ((bin as f64 + 1.0) / n).min(0.5);

        let (raw, window) = (&self.raw, &self.window);
        let optimum = BrentOptimizer::default().minimize(
            &mut |f| minus_power(raw, window, f),
            lower,
            upper,
        );
        TAU * optimum.x / config.dt
    }

    /// Fit and remove the component at `omega`.
    ///
    /// Returns `None` without touching the residual when neither basis
    /// function carries usable energy, or when removing the fit would raise
    /// the residual energy.
    fn subtract(&mut self, omega: f64, dt: f64) -> Option<Fit> {
        let sums = OverlapSums::compute(&self.residual, &self.window, omega, dt);
        let floor = DEGENERATE_ENERGY * self.points as f64;
        let coefficient = |ef: f64, ee: f64| if ee > floor { Some(ef / ee) } else { None };

        let (cos, sin) = match (
            coefficient(sums.ef_cos, sums.ee_cos),
            coefficient(sums.ef_sin, sums.ee_sin),
        ) {
            (None, None) => return None,
            (a, b) => (a.unwrap_or(0.0), b.unwrap_or(0.0)),
        };

        let before = energy(&self.residual);
        let after: f64 = self
            .residual
            .iter()
            .zip(&self.window)
            .enumerate()
            .map(|(i, (&r, &w))| {
                let next = r - (cos * sums.cosine[i] + sin * sums.sine[i]) * w;
                next * next
            })
            .sum();

        if after > before * (1.0 + 1e-12) {
            return None;
        }

        for i in 0..self.points {
            let fitted = cos * sums.cosine[i] + sin * sums.sine[i];
            self.raw[i] -= fitted;
            self.residual[i] -= fitted * self.window[i];
        }

        let significance = if before > 0.0 { after / before } else { SENTINEL };
        Some(Fit {
            cos,
            sin,
            significance,
        })
    }
}

/// `Σ x²`
fn energy(signal: &[f64]) -> f64 {
    signal.iter().map(|x| x * x).sum()
}

/// Run the peeling loop once on `samples` with a freshly planned engine.
pub fn perform_naff(samples: &[f64], config: &NaffConfig) -> Result<Decomposition> {
    if samples.len() < 2 {
        return Err(Error::TooFewPoints {
            points: samples.len(),
        });
    }
    Naff::new(samples.len())?.analyze(samples, config)
}

/// Run the peeling loop with the default options and log every component.
pub fn perform_analysis(samples: &[f64]) -> Result<Decomposition> {
    let result = perform_naff(samples, &NaffConfig::default())?;
    for (i, c) in result.components().enumerate() {
        tracing::info!(
            index = i,
            bin = c.frequency * samples.len() as f64,
            amplitude = c.amplitude,
            phase = c.phase,
            significance = c.significance,
            "component"
        );
    }
    Ok(result)
}
