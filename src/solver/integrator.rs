//! Time integration
//!
//! The reactor only needs "advance the state by one accepted step"; the
//! `Integrator` trait is that seam. `AdaptiveRk4` is the default: classical
//! fourth-order Runge-Kutta with step-doubling error control.

use std::fmt;

use super::settings::SimulatorSettings;

/// Right-hand side `dy/dt = f(t, y)`
pub type Rhs<'a> = dyn Fn(f64, &[f64]) -> Vec<f64> + 'a;

/// One accepted step
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedStep {
    pub time: f64,
    pub state: Vec<f64>,
}

/// Why the integrator could not produce a step
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationFailure {
    StepTooSmall { time: f64, step: f64 },
    NegativeState { time: f64, index: usize, value: f64 },
}

impl fmt::Display for IntegrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationFailure::StepTooSmall { time, step } => {
                write!(f, "step size {:e} s too small at t = {:e} s", step, time)
            }
            IntegrationFailure::NegativeState { time, index, value } => {
                write!(f, "state {} went negative ({:e}) at t = {:e} s", index, value, time)
            }
        }
    }
}

/// Advances an ODE state by one accepted step
pub trait Integrator {
    /// Take one step from `(t, y)` of at most `max_step` seconds
    fn advance(
        &mut self,
        rhs: &Rhs<'_>,
        t: f64,
        y: &[f64],
        max_step: f64,
    ) -> Result<AcceptedStep, IntegrationFailure>;
}

/// Explicit RK4 with step doubling
#[derive(Debug, Clone)]
pub struct AdaptiveRk4 {
    atol: f64,
    rtol: f64,
    step: f64,
    max_step: f64,
    min_step: f64,
}

const SAFETY: f64 = 0.9;
const MAX_GROWTH: f64 = 4.0;
const MAX_SHRINK: f64 = 0.1;
const MAX_REJECTIONS: usize = 60;

impl AdaptiveRk4 {
    pub fn new(settings: &SimulatorSettings) -> Self {
        Self {
            atol: settings.atol,
            rtol: settings.rtol,
            step: settings.initial_step,
            max_step: settings.max_step,
            min_step: settings.initial_step * 1e-6,
        }
    }

    /// Step size the next call will try first
    pub fn proposed_step(&self) -> f64 {
        self.step
    }

    fn rk4(rhs: &Rhs<'_>, t: f64, y: &[f64], h: f64) -> Vec<f64> {
        let offset = |base: &[f64], k: &[f64], scale: f64| -> Vec<f64> {
            base.iter().zip(k).map(|(b, k)| b + scale * k).collect()
        };
        let k1 = rhs(t, y);
        let k2 = rhs(t + h / 2.0, &offset(y, &k1, h / 2.0));
        let k3 = rhs(t + h / 2.0, &offset(y, &k2, h / 2.0));
        let k4 = rhs(t + h, &offset(y, &k3, h));
        y.iter()
            .enumerate()
            .map(|(i, yi)| yi + h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
            .collect()
    }

    /// Scaled error norm between the full step and the two half steps
    fn error_norm(&self, y: &[f64], full: &[f64], halves: &[f64]) -> f64 {
        let mut norm: f64 = 0.0;
        for i in 0..y.len() {
            let scale = self.atol + self.rtol * y[i].abs().max(halves[i].abs());
            let err = (halves[i] - full[i]).abs() / scale;
            if !err.is_finite() {
                return f64::INFINITY;
            }
            norm = norm.max(err);
        }
        norm
    }

    /// Clamp round-off negatives, reject real ones
    fn check_state(&self, time: f64, state: &mut [f64]) -> Result<(), IntegrationFailure> {
        for (index, value) in state.iter_mut().enumerate() {
            if *value < 0.0 {
                if *value > -self.atol * 1e3 {
                    *value = 0.0;
                } else {
                    return Err(IntegrationFailure::NegativeState {
                        time,
                        index,
                        value: *value,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Integrator for AdaptiveRk4 {
    fn advance(
        &mut self,
        rhs: &Rhs<'_>,
        t: f64,
        y: &[f64],
        max_step: f64,
    ) -> Result<AcceptedStep, IntegrationFailure> {
        let limit = max_step.min(self.max_step);
        let mut h = self.step.min(limit);

        for _ in 0..MAX_REJECTIONS {
            // Only steps shrunk by error control can underflow
            if h < self.min_step && h < limit {
                break;
            }
            let full = Self::rk4(rhs, t, y, h);
            let half = Self::rk4(rhs, t, y, h / 2.0);
            let halves = Self::rk4(rhs, t + h / 2.0, &half, h / 2.0);
            let err = self.error_norm(y, &full, &halves);

            if err <= 1.0 {
                // Richardson extrapolation of the two estimates
                let mut state: Vec<f64> = halves
                    .iter()
                    .zip(&full)
                    .map(|(h2, h1)| h2 + (h2 - h1) / 15.0)
                    .collect();
                self.check_state(t + h, &mut state)?;

                let growth = if err == 0.0 {
                    MAX_GROWTH
                } else {
                    (SAFETY * err.powf(-0.2)).min(MAX_GROWTH)
                };
                // A step cut short by `max_step` should not shrink the next one
                self.step = (self.step.max(h) * growth).min(self.max_step);
                return Ok(AcceptedStep {
                    time: t + h,
                    state,
                });
            }

            let shrink = if err.is_finite() {
                (SAFETY * err.powf(-0.25)).max(MAX_SHRINK)
            } else {
                MAX_SHRINK
            };
            h *= shrink;
            self.step = h;
        }

        Err(IntegrationFailure::StepTooSmall { time: t, step: h })
    }
}
