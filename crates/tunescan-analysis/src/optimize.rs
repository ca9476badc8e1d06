//! One-dimensional derivative-free optimizers for frequency refinement.
//!
//! Both strategies implement [`Maximizer`] and are interchangeable:
//!
//! - [`ParabolicOptimizer`] walks away from an initial guess until a bracket
//!   around the optimum is found, then refines it with parabolic interpolation,
//!   bisecting the wider half-interval whenever the parabola is unusable.
//! - [`BrentOptimizer`] is Brent's method over a fixed interval: golden-section
//!   steps combined with parabolic steps when those are well conditioned.
//!
//! Neither strategy treats failure as fatal. The returned [`Optimum`] always
//! carries the best point seen, and its [`Status`] tells the caller whether
//! the point can be trusted.

/// Search region and starting point for a refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchInterval {
    /// Lowest admissible `x`.
    pub lower: f64,
    /// Highest admissible `x`.
    pub upper: f64,
    /// Initial estimate. Ignored by [`BrentOptimizer`].
    pub guess: f64,
    /// Initial step size. Ignored by [`BrentOptimizer`].
    pub step: f64,
}

/// Phase of the parabolic search that left the admissible interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Looking for a direction in which the merit improves.
    Direction,
    /// Stepping in the improving direction until the optimum is bracketed.
    Expansion,
}

/// How a refinement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Bracket width or merit spread fell below its limit.
    Converged,
    /// A trial step left `[lower, upper]`.
    BoundsExceeded {
        /// Where the excursion happened.
        phase: SearchPhase,
    },
    /// No improving direction was found within the cycle budget.
    NoBracket,
    /// The refinement cycle cap was hit; `x` is the best point so far.
    IterationLimitReached,
}

/// Result of a refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimum {
    /// Best point seen.
    pub x: f64,
    /// Merit at `x`, in the caller's orientation.
    pub value: f64,
    /// Termination status.
    pub status: Status,
}

impl Optimum {
    /// Whether `x` came out of an actual refinement and should be used.
    ///
    /// `IterationLimitReached` still counts: the estimate is under-converged
    /// but better than the starting point.
    pub fn is_refined(&self) -> bool {
        matches!(self.status, Status::Converged | Status::IterationLimitReached)
    }

    fn negated(self) -> Self {
        Self {
            value: -self.value,
            ..self
        }
    }
}

/// A strategy that maximizes a scalar merit function on an interval.
pub trait Maximizer {
    /// Maximize `merit` over `interval`.
    fn maximize(&self, merit: &mut dyn FnMut(f64) -> f64, interval: &SearchInterval) -> Optimum;
}

/// Bracket-and-refine optimizer using parabolic interpolation with a
/// bisection fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicOptimizer {
    /// Maximum refinement cycles; the direction search gets twice as many.
    pub cycle_limit: usize,
    /// Stop once the bracket is narrower than this.
    pub dx_limit: f64,
    /// Stop once the merit spread across the bracket is below this.
    pub tolerance: f64,
}

/// Running best point of a minimization.
struct Best {
    x: f64,
    f: f64,
}

impl Best {
    fn offer(&mut self, x: f64, f: f64) {
        if f < self.f {
            self.x = x;
            self.f = f;
        }
    }

    fn finish(&self, status: Status) -> Optimum {
        Optimum {
            x: self.x,
            value: self.f,
            status,
        }
    }
}

impl ParabolicOptimizer {
    /// Create an optimizer with zero merit tolerance.
    pub fn new(cycle_limit: usize, dx_limit: f64) -> Self {
        Self {
            cycle_limit,
            dx_limit,
            tolerance: 0.0,
        }
    }

    /// Minimize `f` starting from `interval.guess`.
    pub fn minimize(&self, f: &mut dyn FnMut(f64) -> f64, interval: &SearchInterval) -> Optimum {
        let SearchInterval {
            lower,
            upper,
            guess,
            step,
        } = *interval;
        let out_of_bounds = |x: f64| x > upper || x < lower;

        let mut dx = step;
        let (mut x0, mut f0) = (guess, f(guess));
        let mut best = Best { x: x0, f: f0 };

        // Find a direction in which the function decreases.
        let direction_cycles = 2 * self.cycle_limit;
        let mut x1 = x0;
        let mut f1 = f0;
        let mut found = false;
        for cycle in 0..direction_cycles {
            x1 = x0 + dx;
            if x1 == x0 {
                break;
            }
            if out_of_bounds(x1) {
                return best.finish(Status::BoundsExceeded {
                    phase: SearchPhase::Direction,
                });
            }
            f1 = f(x1);
            best.offer(x1, f1);
            if f1 < f0 {
                found = true;
                break;
            }
            dx *= if cycle % 2 == 0 { -1.0 } else { -0.5 };
        }

        if x1 == x0 {
            return best.finish(Status::Converged);
        }
        if !found {
            let status = if dx.abs() < self.dx_limit {
                Status::Converged
            } else {
                Status::NoBracket
            };
            return best.finish(status);
        }

        // Keep stepping until the minimum has been passed.
        let mut x2: f64;
        let mut f2: f64;
        loop {
            x2 = x1 + dx;
            if out_of_bounds(x2) {
                return best.finish(Status::BoundsExceeded {
                    phase: SearchPhase::Expansion,
                });
            }
            f2 = f(x2);
            best.offer(x2, f2);
            if f2 > f1 || x1 == x2 {
                break;
            }
            (x0, f0) = (x1, f1);
            (x1, f1) = (x2, f2);
        }

        if x0 > x2 {
            std::mem::swap(&mut x0, &mut x2);
            std::mem::swap(&mut f0, &mut f2);
        }

        // Bracket: x0 < x1 < x2 with f1 below both ends.
        for _ in 0..self.cycle_limit {
            if x2 == x0 || (x2 - x0) < self.dx_limit || f0.max(f2) - f1 < self.tolerance {
                return best.finish(Status::Converged);
            }

            let numer = (x1 - x0).powi(2) * (f1 - f2) - (x1 - x2).powi(2) * (f1 - f0);
            let denom = (x1 - x0) * (f1 - f2) - (x1 - x2) * (f1 - f0);
            let x3 = x1 - numer / denom / 2.0;
            let scale = x2 - x0;
            let mut failed = true;

            if !x3.is_infinite()
                && x0 < x3
                && x3 < x2
                && (x3 - x0).abs() > 1e-6 * scale
                && (x3 - x1).abs() > 1e-6 * scale
                && (x3 - x2).abs() > 1e-6 * scale
            {
                let f3 = f(x3);
                best.offer(x3, f3);
                failed = false;

                if f3 < f1 {
                    (x1, f1) = (x3, f3);
                } else if f2 > f0 && f3 < f2 {
                    (x2, f2) = (x3, f3);
                    if x2 < x1 {
                        std::mem::swap(&mut x1, &mut x2);
                        std::mem::swap(&mut f1, &mut f2);
                    }
                } else if f2 < f0 && f3 < f0 {
                    (x0, f0) = (x3, f3);
                    if x0 > x1 {
                        std::mem::swap(&mut x0, &mut x1);
                        std::mem::swap(&mut f0, &mut f1);
                    }
                } else {
                    failed = true;
                }
            }

            if failed {
                // Bisect the wider sub-interval first, then the other one.
                let wider_right = (x0 - x1).abs() < (x1 - x2).abs();
                for other in [false, true] {
                    let right = wider_right != other;
                    let x3 = if right { (x1 + x2) / 2.0 } else { (x0 + x1) / 2.0 };
                    let f3 = f(x3);
                    best.offer(x3, f3);

                    if f3 < f1 {
                        (x1, f1) = (x3, f3);
                        break;
                    }
                    if right && f3 < f2 {
                        (x2, f2) = (x3, f3);
                        if x2 < x1 {
                            std::mem::swap(&mut x1, &mut x2);
                            std::mem::swap(&mut f1, &mut f2);
                        }
                        break;
                    } else if !right && f3 < f0 {
                        (x0, f0) = (x3, f3);
                        if x0 > x1 {
                            std::mem::swap(&mut x0, &mut x1);
                            std::mem::swap(&mut f0, &mut f1);
                        }
                        break;
                    }
                }
            }
        }

        best.finish(Status::IterationLimitReached)
    }
}

impl Maximizer for ParabolicOptimizer {
    fn maximize(&self, merit: &mut dyn FnMut(f64) -> f64, interval: &SearchInterval) -> Optimum {
        self.minimize(&mut |x| -merit(x), interval).negated()
    }
}

/// Brent's derivative-free minimization over a bounded interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrentOptimizer {
    /// Hard iteration cap.
    pub max_iterations: usize,
    /// Relative tolerance on `x`.
    pub tolerance: f64,
}

impl Default for BrentOptimizer {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            // 2^-26
            tolerance: 1.490116e-8,
        }
    }
}

impl BrentOptimizer {
    /// Golden-section ratio `(3 − √5) / 2`.
    const GOLDEN: f64 = 0.3819660;

    /// Minimize `f` on `[min, max]`, starting from the upper end.
    ///
    /// On hitting the iteration cap, logs a warning and returns the best point
    /// with [`Status::IterationLimitReached`].
    pub fn minimize(&self, f: &mut dyn FnMut(f64) -> f64, min: f64, max: f64) -> Optimum {
        let (mut min, mut max) = if min <= max { (min, max) } else { (max, min) };
        let tol0 = self.tolerance * 0.25;

        let mut x = max;
        let mut w = max;
        let mut v = max;
        let mut fx = f(x);
        let mut fw = fx;
        let mut fv = fx;
        let mut delta1: f64 = 0.0;
        let mut delta2: f64 = 0.0;

        for _ in 0..self.max_iterations {
            let mid = 0.5 * (min + max);
            let tol1 = self.tolerance * x.abs() + tol0;
            let tol2 = 2.0 * tol1;
            if (x - mid).abs() <= tol2 - 0.5 * (max - min) {
                return Optimum {
                    x,
                    value: fx,
                    status: Status::Converged,
                };
            }

            let golden_step = |x: f64| {
                let d2 = if x >= mid { min - x } else { max - x };
                (Self::GOLDEN * d2, d2)
            };

            if delta2.abs() > tol1 {
                // Fit a parabola through x, w and v.
                let r = (x - w) * (fx - fv);
                let mut q = (x - v) * (fx - fw);
                let mut p = (x - v) * q - (x - w) * r;
                q = 2.0 * (q - r);
                if q > 0.0 {
                    p = -p;
                }
                q = q.abs();
                let delta0 = delta2;
                delta2 = delta1;
                if p.abs() >= (0.5 * q * delta0).abs() || p <= q * (min - x) || p >= q * (max - x)
                {
                    (delta1, delta2) = golden_step(x);
                } else {
                    delta1 = p / q;
                    let u = x + delta1;
                    if (u - min) < tol2 || (max - u) < tol2 {
                        delta1 = if mid - x < 0.0 { -tol1.abs() } else { tol1.abs() };
                    }
                }
            } else {
                (delta1, delta2) = golden_step(x);
            }

            let u = if delta1.abs() >= tol1 {
                x + delta1
            } else if delta1 > 0.0 {
                x + tol1.abs()
            } else {
                x - tol1.abs()
            };
            let fu = f(u);

            if fu <= fx {
                if u >= x {
                    min = x;
                } else {
                    max = x;
                }
                (v, fv) = (w, fw);
                (w, fw) = (x, fx);
                (x, fx) = (u, fu);
            } else {
                if u < x {
                    min = u;
                } else {
                    max = u;
                }
                if fu <= fw || w == x {
                    (v, fv) = (w, fw);
                    (w, fw) = (u, fu);
                } else if fu <= fv || v == x || v == w {
                    (v, fv) = (u, fu);
                }
            }
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            x,
            "Brent minimization reached its iteration cap"
        );
        Optimum {
            x,
            value: fx,
            status: Status::IterationLimitReached,
        }
    }
}

impl Maximizer for BrentOptimizer {
    fn maximize(&self, merit: &mut dyn FnMut(f64) -> f64, interval: &SearchInterval) -> Optimum {
        self.minimize(&mut |x| -merit(x), interval.lower, interval.upper).negated()
    }
}
