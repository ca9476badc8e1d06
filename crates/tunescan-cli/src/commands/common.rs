//! Shared CLI helpers used across multiple commands.

use std::f64::consts::TAU;

/// LHC revolution frequency in Hz.
pub const LHC_REVOLUTION_FREQUENCY: f64 = 11245.0;

/// Sub-turn timing offsets of successive pickups, in turns.
pub const PICKUP_OFFSETS: [f64; 4] = [0.0, 0.001, 0.00013, 0.002];

/// xorshift64 generator for reproducible measurement noise.
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Seed the generator. A zero seed is remapped so the state never sticks.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform sample in `[-1, 1)`.
    pub fn next_bipolar(&mut self) -> f64 {
        // 53 random mantissa bits
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        2.0 * unit - 1.0
    }
}

/// Synthetic betatron oscillation seen by a ring of pickups.
#[derive(Debug, Clone, Copy)]
pub struct BeamSignal {
    /// Oscillation frequency in Hz.
    pub frequency: f64,
    /// Revolution frequency in Hz.
    pub revolution_frequency: f64,
    /// Peak position.
    pub amplitude: f64,
    /// Peak of the uniform noise added to every reading.
    pub noise: f64,
    /// Number of pickups, at most [`PICKUP_OFFSETS`]`.len()`.
    pub pickups: usize,
}

impl BeamSignal {
    /// Tune in cycles per turn.
    pub fn tune(&self) -> f64 {
        self.frequency / self.revolution_frequency
    }

    /// One position record per pickup, `turns` readings each.
    pub fn positions(&self, turns: usize, rng: &mut XorShift64) -> Vec<Vec<f64>> {
        let increment = TAU * self.frequency;
        PICKUP_OFFSETS
            .iter()
            .take(self.pickups)
            .map(|&offset| {
                (0..turns)
                    .map(|turn| {
                        let t = (turn as f64 + offset) / self.revolution_frequency;
                        self.amplitude * (increment * t).sin() + self.noise * rng.next_bipolar()
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xorshift_is_reproducible_and_bounded() {
        let mut a = XorShift64::new(7);
        let mut b = XorShift64::new(7);
        for _ in 0..1000 {
            let x = a.next_bipolar();
            assert_eq!(x, b.next_bipolar());
            assert!((-1.0..1.0).contains(&x));
        }
    }

    #[test]
    fn zero_seed_still_moves() {
        let mut rng = XorShift64::new(0);
        let first = rng.next_bipolar();
        assert_ne!(first, rng.next_bipolar());
    }

    #[test]
    fn pickups_are_offset_copies() {
        let signal = BeamSignal {
            frequency: 3000.0,
            revolution_frequency: LHC_REVOLUTION_FREQUENCY,
            amplitude: 1.0,
            noise: 0.0,
            pickups: 3,
        };
        let records = signal.positions(64, &mut XorShift64::new(1));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.len() == 64));
        assert_eq!(records[0][0], 0.0);
        let expected = (TAU * signal.tune() * PICKUP_OFFSETS[1]).sin();
        assert!((records[1][0] - expected).abs() < 1e-12);
    }

    #[test]
    fn noise_stays_within_bound() {
        let signal = BeamSignal {
            frequency: 1000.0,
            revolution_frequency: LHC_REVOLUTION_FREQUENCY,
            amplitude: 0.0,
            noise: 0.03,
            pickups: 1,
        };
        let records = signal.positions(500, &mut XorShift64::new(42));
        assert!(records[0].iter().all(|x| x.abs() <= 0.03));
        assert!(records[0].iter().any(|x| *x != 0.0));
    }
}
