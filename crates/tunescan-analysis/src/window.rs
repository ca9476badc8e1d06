//! Apodization windows applied to samples before spectral analysis.
//!
//! Two families are provided:
//!
//! - [`hann`] - the half-cosine Hann window `0.5·(1 − cos(2π·i/(N−1)))`,
//!   symmetric and zero at both ends. This is the window the peeling loop uses.
//! - [`hann_harmonic`] - the power-raised Hann family
//!   `cn·(1 + cos((i − N/2)·π/(N/2)))^order`, normalised so that its mean is
//!   close to one. Higher orders trade main-lobe width for faster sidelobe decay.

use crate::{Error, Result};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Symmetric Hann window (raised cosine, zero at both ends)
    Hann,
    /// Hann window raised to an integer power, with binomial normalisation
    HannHarmonic(u32),
}

impl Window {
    /// Get window coefficients
    pub fn coefficients(&self, points: usize) -> Result<Vec<f64>> {
        match self {
            Window::Hann => hann(points),
            Window::HannHarmonic(order) => hann_harmonic(points, *order),
        }
    }

    /// Apply window to a buffer in place
    pub fn apply(&self, buffer: &mut [f64]) -> Result<()> {
        let coeffs = self.coefficients(buffer.len())?;
        for (sample, w) in buffer.iter_mut().zip(&coeffs) {
            *sample *= w;
        }
        Ok(())
    }
}

/// Symmetric Hann window of length `points`.
///
/// # Errors
///
/// Returns [`Error::TooFewPoints`] when `points < 2`, since the window is
/// defined over `points − 1` intervals.
pub fn hann(points: usize) -> Result<Vec<f64>> {
    if points < 2 {
        return Err(Error::TooFewPoints { points });
    }
    let span = (points - 1) as f64;
    Ok((0..points)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / span).cos()))
        .collect())
}

/// Normalisation constant `2^order · (order!)² / (2·order)!`.
///
/// Evaluated as a running product so large orders do not overflow.
pub fn hann_harmonic_norm(order: u32) -> f64 {
    let n = f64::from(order);
    (1..=order).fold(1.0, |acc, k| {
        let k = f64::from(k);
        acc * 2.0 * k / (n + k)
    })
}

/// Highest order accepted by [`hann_harmonic`].
pub const MAX_HARMONIC_ORDER: u32 = 512;

/// Hann window raised to `order`, centred at `points / 2`.
///
/// `order = 1` is a periodic Hann window scaled to unit mean; `order = 0`
/// degenerates to a flat window of ones.
///
/// # Errors
///
/// [`Error::TooFewPoints`] when `points < 2`, [`Error::InvalidConfig`] when
/// `order` exceeds [`MAX_HARMONIC_ORDER`].
pub fn hann_harmonic(points: usize, order: u32) -> Result<Vec<f64>> {
    if points < 2 {
        return Err(Error::TooFewPoints { points });
    }
    if order > MAX_HARMONIC_ORDER {
        return Err(Error::InvalidConfig(format!(
            "window order {order} exceeds {MAX_HARMONIC_ORDER}"
        )));
    }
    let half_width = points as f64 / 2.0;
    let step = PI / half_width;
    let cn = hann_harmonic_norm(order);
    let exponent = order as i32;

    Ok((0..points)
        .map(|i| {
            let base = 1.0 + ((i as f64 - half_width) * step).cos();
            cn * base.powi(exponent)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_endpoints_and_center() {
        let w = hann(101).unwrap();
        assert!(w[0].abs() < 1e-12);
        assert!(w[100].abs() < 1e-12);
        assert!((w[50] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hann_is_symmetric() {
        let w = hann(64).unwrap();
        for i in 0..32 {
            assert!((w[i] - w[63 - i]).abs() < 1e-12, "asymmetry at {i}");
        }
    }

    #[test]
    fn hann_rejects_short_input() {
        assert_eq!(hann(1), Err(Error::TooFewPoints { points: 1 }));
        assert_eq!(hann(0), Err(Error::TooFewPoints { points: 0 }));
    }

    #[test]
    fn hann_two_points_is_zero() {
        let w = hann(2).unwrap();
        assert_eq!(w.len(), 2);
        assert!(w.iter().all(|x| x.abs() < 1e-12));
    }

    #[test]
    fn harmonic_norm_values() {
        assert!((hann_harmonic_norm(0) - 1.0).abs() < 1e-12);
        assert!((hann_harmonic_norm(1) - 1.0).abs() < 1e-12);
        // 2^2 * 4 / 24
        assert!((hann_harmonic_norm(2) - 2.0 / 3.0).abs() < 1e-12);
        assert!(hann_harmonic_norm(200).is_finite());
    }

    #[test]
    fn harmonic_order_zero_is_flat() {
        let w = hann_harmonic(16, 0).unwrap();
        assert!(w.iter().all(|&x| (x - 1.0).abs() < 1e-12));
    }

    #[test]
    fn harmonic_mean_is_near_unity() {
        for order in 1..=4 {
            let w = hann_harmonic(1024, order).unwrap();
            let mean = w.iter().sum::<f64>() / w.len() as f64;
            assert!((mean - 1.0).abs() < 1e-6, "order {order}: mean {mean}");
        }
    }

    #[test]
    fn harmonic_peaks_at_center() {
        let w = hann_harmonic(128, 2).unwrap();
        let (peak, _) = w
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(peak, 64);
        assert!(w[0].abs() < 1e-12);
    }

    #[test]
    fn harmonic_order_is_capped() {
        let w = hann_harmonic(8, MAX_HARMONIC_ORDER).unwrap();
        assert!(w.iter().all(|x| x.is_finite()));

        let err = hann_harmonic(8, MAX_HARMONIC_ORDER + 1).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "got: {err}");
        assert!(Window::HannHarmonic(u32::MAX).coefficients(8).is_err());
    }

    #[test]
    fn apply_matches_coefficients() {
        let mut buffer = vec![2.0; 32];
        Window::Hann.apply(&mut buffer).unwrap();
        let coeffs = Window::Hann.coefficients(32).unwrap();
        for (b, c) in buffer.iter().zip(&coeffs) {
            assert!((b - 2.0 * c).abs() < 1e-15);
        }
    }
}
