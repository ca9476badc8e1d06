//! Tunescan Analysis - NAFF frequency extraction for turn-by-turn beam data
//!
//! This crate extracts the dominant oscillation frequencies of a real, evenly
//! sampled signal together with their amplitudes, phases and a significance
//! measure:
//!
//! - [`window`] - Hann and power-raised Hann apodization windows
//! - [`fft`] - Forward transform adapter producing the coarse power spectrum
//! - [`merit`] - Correlation and windowed inner-product merit functions
//! - [`optimize`] - Parabolic bracket-and-refine and Brent optimizers
//! - [`naff`] - The frequency peeling loop
//! - [`config`] - Extraction options
//!
//! ## Example
//!
//! ```rust
//! use tunescan_analysis::{Naff, NaffConfig};
//! use std::f64::consts::TAU;
//!
//! // Two betatron lines on 2048 turns
//! let samples: Vec<f64> = (0..2048)
//!     .map(|i| {
//!         let t = i as f64;
//!         (TAU * 0.31 * t).sin() + 0.2 * (TAU * 0.28 * t).cos()
//!     })
//!     .collect();
//!
//! let config = NaffConfig {
//!     max_frequencies: 2,
//!     frac_freq_accuracy_limit: 1e-6,
//!     upper_freq_limit: 0.5,
//!     ..NaffConfig::default()
//! };
//!
//! let mut engine = Naff::new(samples.len()).unwrap();
//! let result = engine.analyze(&samples, &config).unwrap();
//! for component in result.components() {
//!     println!("{:.6} {:.4}", component.frequency, component.amplitude);
//! }
//! ```
//!
//! Every call owns its working buffers, so independent buffers can be
//! analyzed from separate threads with one [`Naff`] engine each.

pub mod config;
pub mod error;
pub mod fft;
pub mod merit;
pub mod naff;
pub mod optimize;
pub mod window;

// Re-export main types
pub use config::{NaffConfig, Refinement};
pub use error::{Error, Result};
pub use fft::{PowerSpectrum, RealForward, RustFftForward};
pub use merit::{OverlapSums, correlation_power, inner_product, minus_power};
pub use naff::{
    Component, Decomposition, Naff, SENTINEL, Termination, perform_analysis, perform_naff,
    wrap_phase,
};
pub use optimize::{
    BrentOptimizer, Maximizer, Optimum, ParabolicOptimizer, SearchInterval, SearchPhase, Status,
};
pub use window::{MAX_HARMONIC_ORDER, Window, hann, hann_harmonic, hann_harmonic_norm};
