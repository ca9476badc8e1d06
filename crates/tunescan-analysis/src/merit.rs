//! Merit functions scoring a candidate frequency against a signal.
//!
//! Two forms are used:
//!
//! - **Correlation form** ([`correlation_power`]): projects the residual onto
//!   `cos(ω·i·dt)` and `sin(ω·i·dt)` and returns the squared projection length.
//!   Larger is better; the parabolic optimizer maximizes it.
//! - **Windowed inner-product form** ([`inner_product`], [`minus_power`]): the
//!   windowed discrete Fourier coefficient at an arbitrary frequency, returned
//!   negated so that a minimizer lands on the strongest line.
//!
//! Both cost O(points) per evaluation.

use rustfft::num_complex::Complex;
use std::f64::consts::TAU;

/// Squared length of the projection of `residual` onto the cosine/sine pair
/// at angular frequency `omega`.
pub fn correlation_power(residual: &[f64], omega: f64, dt: f64) -> f64 {
    let mut sum_cos = 0.0;
    let mut sum_sin = 0.0;
    for (i, &x) in residual.iter().enumerate() {
        let (sine, cosine) = (omega * i as f64 * dt).sin_cos();
        sum_cos += cosine * x;
        sum_sin += sine * x;
    }
    sum_cos * sum_cos + sum_sin * sum_sin
}

/// Overlap sums of a residual against the cosine/sine basis at one frequency.
///
/// The `ee_*` terms are the windowed basis energies used to normalise the
/// `ef_*` overlaps into fit coefficients.
#[derive(Debug, Clone, Default)]
pub struct OverlapSums {
    /// `Σ cos²·w`
    pub ee_cos: f64,
    /// `Σ sin²·w`
    pub ee_sin: f64,
    /// `Σ cos·residual`
    pub ef_cos: f64,
    /// `Σ sin·residual`
    pub ef_sin: f64,
    /// Cosine basis samples.
    pub cosine: Vec<f64>,
    /// Sine basis samples.
    pub sine: Vec<f64>,
}

impl OverlapSums {
    /// Compute the overlap sums of `residual` at angular frequency `omega`.
    ///
    /// `window` must have the same length as `residual`.
    pub fn compute(residual: &[f64], window: &[f64], omega: f64, dt: f64) -> Self {
        let points = residual.len();
        let mut sums = Self {
            cosine: Vec::with_capacity(points),
            sine: Vec::with_capacity(points),
            ..Self::default()
        };

        for (i, (&x, &w)) in residual.iter().zip(window).enumerate() {
            let (sine, cosine) = (omega * i as f64 * dt).sin_cos();
            sums.ee_cos += cosine * cosine * w;
            sums.ee_sin += sine * sine * w;
            sums.ef_cos += cosine * x;
            sums.ef_sin += sine * x;
            sums.cosine.push(cosine);
            sums.sine.push(sine);
        }
        sums
    }
}

/// Windowed Fourier coefficient of `signal` at `frequency` (cycles per sample).
///
/// The phase is accumulated backward from the last sample so that every
/// term is computed from the same running product, which keeps rounding
/// consistent for long buffers. The result is scaled by `amplitude / N`.
pub fn inner_product(
    signal: &[f64],
    amplitude: f64,
    frequency: f64,
    window: &[f64],
) -> Complex<f64> {
    let n = signal.len().min(window.len());
    if n == 0 {
        return Complex::new(0.0, 0.0);
    }

    let omega = TAU * frequency;
    let mut theta = omega * n as f64;
    let mut result = Complex::new(0.0, 0.0);
    for i in (0..n).rev() {
        theta -= omega;
        let rotor = Complex::new(theta.cos(), -theta.sin());
        result += rotor * (signal[i] * window[i]);
    }
    result * (amplitude / n as f64)
}

/// Negated power of the windowed Fourier coefficient at `frequency`.
pub fn minus_power(signal: &[f64], window: &[f64], frequency: f64) -> f64 {
    -inner_product(signal, 1.0, frequency, window).norm_sqr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::hann;

    fn sine(freq: f64, points: usize) -> Vec<f64> {
        (0..points).map(|i| (TAU * freq * i as f64).sin()).collect()
    }

    #[test]
    fn correlation_peaks_at_signal_frequency() {
        let signal = sine(0.125, 512);
        let omega0 = TAU * 0.125;
        let at_peak = correlation_power(&signal, omega0, 1.0);
        let off_peak = correlation_power(&signal, omega0 * 1.05, 1.0);
        assert!(at_peak > 10.0 * off_peak);
        // Σ sin² over whole periods is N/2
        assert!((at_peak - 256.0f64.powi(2)).abs() < 1e-6);
    }

    #[test]
    fn correlation_respects_dt() {
        let dt = 0.5;
        let signal: Vec<f64> = (0..256).map(|i| (3.0 * i as f64 * dt).cos()).collect();
        let direct = correlation_power(&signal, 3.0, dt);
        let rescaled = correlation_power(&signal, 1.5, 1.0);
        assert!((direct - rescaled).abs() < 1e-9);
    }

    #[test]
    fn overlap_sums_recover_coefficients() {
        let points = 400;
        let window = vec![1.0; points];
        let omega = TAU * 0.05;
        let signal: Vec<f64> = (0..points)
            .map(|i| 0.3 * (omega * i as f64).cos() + 0.7 * (omega * i as f64).sin())
            .collect();

        let sums = OverlapSums::compute(&signal, &window, omega, 1.0);
        assert!((sums.ef_cos / sums.ee_cos - 0.3).abs() < 1e-9);
        assert!((sums.ef_sin / sums.ee_sin - 0.7).abs() < 1e-9);
        assert_eq!(sums.cosine.len(), points);
        assert_eq!(sums.sine.len(), points);
    }

    #[test]
    fn inner_product_of_unit_cosine() {
        let points = 1000;
        let freq = 0.1;
        let signal: Vec<f64> = (0..points).map(|i| (TAU * freq * i as f64).cos()).collect();
        let window = vec![1.0; points];
        let c = inner_product(&signal, 1.0, freq, &window);
        // cos = (e^{jθ} + e^{-jθ}) / 2
        assert!((c.re - 0.5).abs() < 1e-9, "got {c}");
        assert!(c.im.abs() < 1e-9, "got {c}");
    }

    #[test]
    fn minus_power_is_lowest_at_line() {
        let signal = sine(0.2, 512);
        let window = hann(512).unwrap();
        let at_line = minus_power(&signal, &window, 0.2);
        let beside = minus_power(&signal, &window, 0.2 + 2.0 / 512.0);
        assert!(at_line < beside);
        assert!(at_line < 0.0);
    }

    #[test]
    fn inner_product_empty_is_zero() {
        let c = inner_product(&[], 1.0, 0.1, &[]);
        assert_eq!(c, Complex::new(0.0, 0.0));
    }
}
