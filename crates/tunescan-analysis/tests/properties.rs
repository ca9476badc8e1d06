//! Property-based tests for the peeling loop.
//!
//! Checks the output invariants (phase range, sentinel slots, residual
//! monotonicity, window idempotence) over randomized multi-line signals.

use proptest::prelude::*;
use std::f64::consts::{PI, TAU};
use tunescan_analysis::{NaffConfig, SENTINEL, Termination, hann, perform_naff};

fn signal(lines: &[(f64, f64, f64)], points: usize) -> Vec<f64> {
    (0..points)
        .map(|i| {
            lines
                .iter()
                .map(|&(f, a, p)| a * (TAU * f * i as f64 + p).cos())
                .sum()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every populated phase lies in (−π, π] and every unpopulated slot holds
    /// the sentinel in all four outputs.
    #[test]
    fn phase_range_and_sentinels(
        f1 in 0.05f64..0.45,
        a1 in 0.2f64..2.0,
        p1 in -PI..PI,
        a2 in 0.05f64..0.5,
        p2 in -PI..PI,
        max_frequencies in 1usize..6,
        t0 in -500.0f64..500.0,
    ) {
        let f2 = if f1 < 0.25 { f1 + 0.2 } else { f1 - 0.2 };
        let samples = signal(&[(f1, a1, p1), (f2, a2, p2)], 512);
        let config = NaffConfig {
            max_frequencies,
            t0,
            upper_freq_limit: 0.5,
            ..NaffConfig::default()
        };
        let result = perform_naff(&samples, &config).unwrap();

        prop_assert!(result.found <= max_frequencies);
        for i in 0..max_frequencies {
            if i < result.found {
                prop_assert!(result.phase[i] > -PI && result.phase[i] <= PI);
                prop_assert!(result.amplitude[i] >= 0.0);
            } else {
                prop_assert_eq!(result.frequency[i], SENTINEL);
                prop_assert_eq!(result.amplitude[i], SENTINEL);
                prop_assert_eq!(result.phase[i], SENTINEL);
                prop_assert_eq!(result.significance[i], SENTINEL);
            }
        }
    }

    /// Residual energy is non-increasing across iterations.
    #[test]
    fn residual_energy_monotone(
        f1 in 0.05f64..0.2,
        f2 in 0.25f64..0.45,
        a1 in 0.1f64..1.0,
        a2 in 0.1f64..1.0,
    ) {
        let samples = signal(&[(f1, a1, 0.3), (f2, a2, -0.8)], 1024);
        let config = NaffConfig {
            max_frequencies: 4,
            frac_freq_accuracy_limit: 1e-6,
            upper_freq_limit: 0.5,
            ..NaffConfig::default()
        };
        let result = perform_naff(&samples, &config).unwrap();
        prop_assert_ne!(result.termination, Termination::Degenerate);
        prop_assert!(result.found >= 2, "found {}", result.found);
        for pair in result.residual_energy.windows(2) {
            prop_assert!(pair[1] <= pair[0] * (1.0 + 1e-12), "{:?}", pair);
        }
    }

    /// Window generation is a pure function of its length.
    #[test]
    fn window_idempotent(points in 2usize..4096) {
        prop_assert_eq!(hann(points).unwrap(), hann(points).unwrap());
    }

    /// Short inputs never produce more components than requested.
    #[test]
    fn short_inputs_are_bounded(
        samples in prop::collection::vec(-1.0f64..1.0, 2..8),
        max_frequencies in 0usize..4,
    ) {
        let config = NaffConfig { max_frequencies, ..NaffConfig::default() };
        let result = perform_naff(&samples, &config).unwrap();
        prop_assert!(result.found <= max_frequencies);
        prop_assert_eq!(result.frequency.len(), max_frequencies);
    }
}
