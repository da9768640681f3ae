//! # Dormand-Prince 5(4) Integrator
//!
//! Embedded explicit Runge-Kutta pair: the 5th-order solution is propagated and the difference
//! to the embedded 4th-order solution drives the step size. Errors are measured in the max norm
//! scaled by `atol + rtol*max(|u|, |u_new|)`; the step is accepted when that norm is <= 1.
//!
//! Only forward integration is supported. Every accepted step is recorded, which is exactly
//! what the seed generator hands over as the sampled trajectory.

use super::events::{
    BrentError, BrentSolver, EventConfig, EventFunction, EventResult, sign_change_detected,
};
use thiserror::Error;

const STAGES: usize = 7;
const C: [f64; STAGES] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A: [[f64; 6]; STAGES] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
/// 5th-order weights
const B: [f64; STAGES] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
/// B minus the embedded 4th-order weights
const E: [f64; STAGES] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// du/dt = f(t, u)
pub trait OdeSystem<const N: usize> {
    fn rhs(&self, t: f64, u: &[f64; N], dudt: &mut [f64; N]);
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntegrationError {
    #[error("step size {h:e} too small at t = {t}")]
    StepSizeTooSmall { t: f64, h: f64 },
    #[error("maximum number of integration steps ({0}) exceeded")]
    MaxStepsExceeded(u64),
    #[error("non-finite state at t = {t}")]
    NonFiniteState { t: f64 },
    #[error("event location failed: {0}")]
    EventFindingFailed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub fn_evals: u64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
}

/// I-controller, `h_new = safety * h * err^(-1/5)` bounded by the growth limits
#[derive(Debug, Clone)]
pub struct StepController {
    pub safety: f64,
    pub max_factor: f64,
    pub min_factor: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
        }
    }
}

impl StepController {
    pub fn factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        (self.safety * error.powf(-0.2)).clamp(self.min_factor, self.max_factor)
    }
}

#[derive(Debug, Clone)]
pub struct StepResult<const N: usize> {
    pub t: f64,
    pub u: [f64; N],
    pub error: f64,
    pub h_next: f64,
    pub accepted: bool,
}

/// How an integration ended
#[derive(Debug, Clone)]
pub enum Termination<const N: usize> {
    Event(EventResult<N>),
    Completed { t: f64, u: [f64; N] },
}

/// Accepted samples `(t, u)` from `t0` to the end, event state included
#[derive(Debug, Clone)]
pub struct IntegrationOutcome<const N: usize> {
    pub samples: Vec<(f64, [f64; N])>,
    pub termination: Termination<N>,
}

#[derive(Debug, Clone)]
pub struct DormandPrince<const N: usize> {
    pub rtol: f64,
    pub atol: f64,
    pub h_min: f64,
    pub h_max: f64,
    pub max_steps: u64,
    pub controller: StepController,
    pub stats: Stats,
    k: [[f64; N]; STAGES],
}

impl<const N: usize> DormandPrince<N> {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            h_min: 1e-12,
            h_max: f64::INFINITY,
            max_steps: 1_000_000,
            controller: StepController::default(),
            stats: Stats::default(),
            k: [[0.0; N]; STAGES],
        }
    }

    pub fn set_step_limits(&mut self, h_min: f64, h_max: f64) {
        self.h_min = h_min;
        self.h_max = h_max.max(h_min);
    }

    /// One attempted step of size `h` from `(t, u)`
    pub fn step<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, u: &[f64; N], h: f64) -> StepResult<N> {
        let h = h.clamp(self.h_min, self.h_max);
        for s in 0..STAGES {
            let mut stage = *u;
            for j in 0..s {
                let a = A[s][j];
                if a != 0.0 {
                    for i in 0..N {
                        stage[i] += h * a * self.k[j][i];
                    }
                }
            }
            let mut k_s = [0.0; N];
            sys.rhs(t + C[s] * h, &stage, &mut k_s);
            self.k[s] = k_s;
        }
        self.stats.fn_evals += STAGES as u64;

        let mut u_new = *u;
        let mut error: f64 = 0.0;
        for i in 0..N {
            let mut increment = 0.0;
            let mut err_i = 0.0;
            for s in 0..STAGES {
                increment += B[s] * self.k[s][i];
                err_i += E[s] * self.k[s][i];
            }
            u_new[i] += h * increment;
            let scale = self.atol + self.rtol * u[i].abs().max(u_new[i].abs());
            error = error.max((h * err_i).abs() / scale);
        }
        // a NaN error must reject the step and shrink it
        let error = if error.is_nan() { f64::INFINITY } else { error };
        let accepted = error <= 1.0;
        if accepted {
            self.stats.accepted_steps += 1;
        } else {
            self.stats.rejected_steps += 1;
        }
        StepResult {
            t: t + h,
            u: u_new,
            error,
            h_next: (h * self.controller.factor(error)).clamp(self.h_min, self.h_max),
            accepted,
        }
    }

    fn validate_inputs(&self, t0: f64, u0: &[f64; N], tf: f64, h0: f64) -> Result<(), IntegrationError> {
        if !t0.is_finite() || !tf.is_finite() || !h0.is_finite() {
            return Err(IntegrationError::InvalidInput(
                "t0, tf and h0 must be finite".to_string(),
            ));
        }
        if tf <= t0 {
            return Err(IntegrationError::InvalidInput(format!(
                "only forward integration is supported, got t0 = {} and tf = {}",
                t0, tf
            )));
        }
        if h0 <= 0.0 {
            return Err(IntegrationError::InvalidInput("h0 must be positive".to_string()));
        }
        if u0.iter().any(|value| !value.is_finite()) {
            return Err(IntegrationError::InvalidInput(
                "initial state is not finite".to_string(),
            ));
        }
        if !(self.atol > 0.0) || !(self.rtol >= 0.0) || !self.atol.is_finite() || !self.rtol.is_finite() {
            return Err(IntegrationError::InvalidInput(
                "atol must be positive and rtol non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Integrates from `t0` until `event` fires or `tf` is reached, recording accepted steps
    #[allow(clippy::too_many_arguments)]
    pub fn integrate_to_event<S, E>(
        &mut self,
        sys: &S,
        event: &E,
        config: &EventConfig,
        t0: f64,
        u0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<IntegrationOutcome<N>, IntegrationError>
    where
        S: OdeSystem<N>,
        E: EventFunction<N>,
    {
        self.validate_inputs(t0, u0, tf, h0)?;
        let mut t = t0;
        let mut u = *u0;
        let mut h = h0.min(self.h_max);
        let mut g_prev = event.eval(t, &u);
        let mut samples = vec![(t, u)];
        let mut step_count = 0u64;

        while tf - t > self.h_min {
            if t + h > tf {
                h = tf - t;
            }
            let result = self.step(sys, t, &u, h);
            if result.accepted {
                if result.u.iter().any(|value| !value.is_finite()) {
                    return Err(IntegrationError::NonFiniteState { t: result.t });
                }
                let g_new = event.eval(result.t, &result.u);
                if sign_change_detected(g_prev, g_new, config.direction) {
                    let located =
                        self.locate_event(sys, event, config, (t, &u, g_prev), (result.t, &result.u, g_new))?;
                    samples.push((located.t, located.u));
                    return Ok(IntegrationOutcome {
                        samples,
                        termination: Termination::Event(located),
                    });
                }
                t = result.t;
                u = result.u;
                g_prev = g_new;
                samples.push((t, u));
            } else if result.h_next <= self.h_min {
                return Err(IntegrationError::StepSizeTooSmall {
                    t,
                    h: result.h_next,
                });
            }
            h = result.h_next;

            step_count += 1;
            if step_count > self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded(self.max_steps));
            }
        }
        Ok(IntegrationOutcome {
            samples,
            termination: Termination::Completed { t, u },
        })
    }

    /// Brent's method on the cubic Hermite interpolant of the bracketing step
    fn locate_event<S, E>(
        &mut self,
        sys: &S,
        event: &E,
        config: &EventConfig,
        start: (f64, &[f64; N], f64),
        end: (f64, &[f64; N], f64),
    ) -> Result<EventResult<N>, IntegrationError>
    where
        S: OdeSystem<N>,
        E: EventFunction<N>,
    {
        let (t_a, u_a, g_a) = start;
        let (t_b, u_b, g_b) = end;
        if g_b == 0.0 {
            return Ok(EventResult {
                t: t_b,
                u: *u_b,
                g_value: 0.0,
                iterations: 0,
            });
        }
        let mut f_a = [0.0; N];
        let mut f_b = [0.0; N];
        sys.rhs(t_a, u_a, &mut f_a);
        sys.rhs(t_b, u_b, &mut f_b);
        self.stats.fn_evals += 2;

        let dt = t_b - t_a;
        let hermite = |t: f64| -> [f64; N] {
            let s = (t - t_a) / dt;
            let s2 = s * s;
            let s3 = s2 * s;
            let h00 = 1.0 - 3.0 * s2 + 2.0 * s3;
            let h10 = s - 2.0 * s2 + s3;
            let h01 = 3.0 * s2 - 2.0 * s3;
            let h11 = s3 - s2;
            let mut u = [0.0; N];
            for i in 0..N {
                u[i] = h00 * u_a[i] + h10 * dt * f_a[i] + h01 * u_b[i] + h11 * dt * f_b[i];
            }
            u
        };

        let solver = BrentSolver::new(config.root_tol, config.max_iter);
        match solver.find_root(|t| event.eval(t, &hermite(t)), t_a, t_b, g_a, g_b) {
            Ok((t, g_value, iterations)) => Ok(EventResult {
                t,
                u: hermite(t),
                g_value,
                iterations,
            }),
            Err(BrentError::MaxIterations { best, f_best }) => Ok(EventResult {
                t: best,
                u: hermite(best),
                g_value: f_best,
                iterations: config.max_iter,
            }),
            Err(BrentError::NotBracketed { fa, fb }) => Err(IntegrationError::EventFindingFailed(
                format!("root not bracketed: g(a) = {}, g(b) = {}", fa, fb),
            )),
        }
    }
}
