//! Damped harmonic oscillator used for the bounce back into bounds.
//!
//! `value(t)` is the displacement from the rest position; it starts at
//! `displacement` and decays towards zero.  Each damping regime uses its
//! closed-form solution:
//!
//! - under-damped (`ζ < 1`):  `e^(−βt) · (c1·cos ωt + c2·sin ωt)`
//! - critically damped (`ζ = 1`): `e^(−βt) · (c1 + c2·t)`
//! - over-damped (`ζ > 1`):  `c1·e^(r1·t) + c2·e^(r2·t)`
//!
//! `duration` bounds the decay envelope analytically, so once it has elapsed
//! `|value(t)|` stays under the threshold.

use std::f64::consts::E;

use super::geometry::Point;
use super::TimingParameters;

/// Ratios this close to one are treated as critically damped.
const CRITICAL_EPSILON: f64 = 1e-6;

/// Physical spring constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub mass: f64,
    pub stiffness: f64,
    pub damping_ratio: f64,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 100.0,
            damping_ratio: 1.0,
        }
    }
}

impl Spring {
    pub const fn new(mass: f64, stiffness: f64, damping_ratio: f64) -> Self {
        Self {
            mass,
            stiffness,
            damping_ratio,
        }
    }

    pub fn damping(&self) -> f64 {
        2.0 * self.damping_ratio * (self.mass * self.stiffness).sqrt()
    }

    /// Envelope decay rate `β = c / 2m`.
    pub fn beta(&self) -> f64 {
        self.damping() / (2.0 * self.mass)
    }

    /// Undamped angular frequency `ω0 = √(k/m)`.
    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    pub fn damped_natural_frequency(&self) -> f64 {
        self.natural_frequency() * (1.0 - self.damping_ratio * self.damping_ratio).max(0.0).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Solution {
    Critical { beta: f64, c1: Point, c2: Point },
    Under { beta: f64, omega: f64, c1: Point, c2: Point },
    Over { r1: f64, r2: f64, c1: Point, c2: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringTimingParameters {
    pub spring: Spring,
    pub displacement: Point,
    pub initial_velocity: Point,
    pub threshold: f64,
    solution: Solution,
}

impl SpringTimingParameters {
    pub fn new(spring: Spring, displacement: Point, initial_velocity: Point, threshold: f64) -> Self {
        let beta = spring.beta();
        let ratio = spring.damping_ratio;
        let solution = if (ratio - 1.0).abs() <= CRITICAL_EPSILON {
            Solution::Critical {
                beta,
                c1: displacement,
                c2: initial_velocity + displacement * beta,
            }
        } else if ratio < 1.0 {
            let omega = spring.damped_natural_frequency();
            Solution::Under {
                beta,
                omega,
                c1: displacement,
                c2: (initial_velocity + displacement * beta) / omega,
            }
        } else {
            let root = (beta * beta - spring.stiffness / spring.mass).sqrt();
            // r1 is the slow root and dominates the tail.
            let (r1, r2) = (-beta + root, -beta - root);
            let c2 = (initial_velocity - displacement * r1) / (r2 - r1);
            Solution::Over {
                r1,
                r2,
                c1: displacement - c2,
                c2,
            }
        };
        Self {
            spring,
            displacement,
            initial_velocity,
            threshold,
            solution,
        }
    }
}

impl TimingParameters for SpringTimingParameters {
    fn duration(&self) -> f64 {
        if self.displacement.length() == 0.0 && self.initial_velocity.length() == 0.0 {
            return 0.0;
        }
        let threshold = self.threshold;
        let t = match self.solution {
            Solution::Critical { beta, c1, c2 } => {
                // |c1|e^(−βt) < τ/2 and |c2|·t·e^(−βt) < τ/2; the second uses
                // t·e^(−βt/2) ≤ 2/(eβ).
                let t1 = (2.0 * c1.length() / threshold).ln() / beta;
                let t2 = 2.0 / beta * (4.0 * c2.length() / (E * beta * threshold)).ln();
                t1.max(t2)
            }
            Solution::Under { beta, c1, c2, .. } => {
                let amplitude = c1.length() + c2.length();
                (amplitude / threshold).ln() / beta
            }
            Solution::Over { r1, c1, c2, .. } => {
                let amplitude = c1.length() + c2.length();
                (amplitude / threshold).ln() / -r1
            }
        };
        if t.is_finite() {
            t.max(0.0)
        } else {
            0.0
        }
    }

    fn value(&self, time: f64) -> Point {
        match self.solution {
            Solution::Critical { beta, c1, c2 } => (c1 + c2 * time) * (-beta * time).exp(),
            Solution::Under { beta, omega, c1, c2 } => {
                (c1 * (omega * time).cos() + c2 * (omega * time).sin()) * (-beta * time).exp()
            }
            Solution::Over { r1, r2, c1, c2 } => c1 * (r1 * time).exp() + c2 * (r2 * time).exp(),
        }
    }
}
