//! FFT wrapper producing the coarse power spectrum for peak search

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Forward real-to-complex transform.
///
/// Implementations must be deterministic for identical input and return the
/// non-negative half of the spectrum (`len() / 2 + 1` bins, DC to Nyquist).
pub trait RealForward {
    /// Transform length the implementation was planned for.
    fn len(&self) -> usize;

    /// Whether the planned length is zero.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transform `input` and return the positive-frequency bins.
    ///
    /// `input` shorter than [`len`](Self::len) is zero-padded; longer input
    /// is truncated.
    fn forward(&mut self, input: &[f64]) -> &[Complex<f64>];
}

/// [`RealForward`] backed by a cached `rustfft` plan.
///
/// The plan and its working buffers are acquired once at construction and
/// released when the value is dropped.
pub struct RustFftForward {
    fft: Arc<dyn rustfft::Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    size: usize,
}

impl RustFftForward {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            size,
        }
    }
}

impl RealForward for RustFftForward {
    fn len(&self) -> usize {
        self.size
    }

    fn forward(&mut self, input: &[f64]) -> &[Complex<f64>] {
        for (slot, &x) in self.buffer.iter_mut().zip(input) {
            *slot = Complex::new(x, 0.0);
        }
        for slot in self.buffer.iter_mut().skip(input.len()) {
            *slot = Complex::new(0.0, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // Return only positive frequencies (DC to Nyquist)
        &self.buffer[..self.size / 2 + 1]
    }
}

/// Magnitude-squared spectrum of a real buffer.
///
/// Each bin is `(2·Re)² + (2·Im)² / N`. The `/ N` binds to the imaginary
/// term only; downstream code compares bins against each other and against
/// earlier results computed with the same grouping, so it is kept as is.
pub struct PowerSpectrum<T: RealForward = RustFftForward> {
    transform: T,
    magnitude2: Vec<f64>,
}

impl PowerSpectrum<RustFftForward> {
    /// Plan a `rustfft` transform of `size` points.
    pub fn new(size: usize) -> Self {
        Self::with_transform(RustFftForward::new(size))
    }
}

impl<T: RealForward> PowerSpectrum<T> {
    /// Wrap an existing transform.
    pub fn with_transform(transform: T) -> Self {
        let bins = transform.len() / 2 + 1;
        Self {
            transform,
            magnitude2: vec![0.0; bins],
        }
    }

    /// Number of output bins (`N / 2 + 1`).
    pub fn bins(&self) -> usize {
        self.magnitude2.len()
    }

    /// Transform `residual` and return its magnitude-squared bins.
    pub fn magnitude_squared(&mut self, residual: &[f64]) -> &[f64] {
        let n = residual.len() as f64;
        let spectrum = self.transform.forward(residual);
        for (m, c) in self.magnitude2.iter_mut().zip(spectrum) {
            *m = (c.re * 2.0).powi(2) + (c.im * 2.0).powi(2) / n;
        }
        &self.magnitude2
    }
}
