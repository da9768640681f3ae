//! # Event Detection
//!
//! An event function `g(t, u)` is watched between accepted steps. When it changes sign in the
//! requested direction the crossing is bracketed by the step and located with Brent's method
//! (bisection, secant and inverse quadratic interpolation) on a cubic Hermite interpolant of
//! the step, so no extra integration is needed.

/// Scalar function whose zero crossing terminates the integration
pub trait EventFunction<const N: usize> {
    fn eval(&self, t: f64, u: &[f64; N]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventDirection {
    /// g goes from negative to positive
    Rising,
    /// g goes from positive to negative
    Falling,
    #[default]
    Any,
}

#[derive(Debug, Clone)]
pub struct EventConfig {
    pub direction: EventDirection,
    /// bracket width at which the root search stops
    pub root_tol: f64,
    pub max_iter: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            direction: EventDirection::Any,
            root_tol: 1e-12,
            max_iter: 60,
        }
    }
}

/// Located event
#[derive(Debug, Clone)]
pub struct EventResult<const N: usize> {
    pub t: f64,
    pub u: [f64; N],
    /// g at the located root, close to zero
    pub g_value: f64,
    pub iterations: usize,
}

/// True when `g_old -> g_new` is a crossing in `direction`.
/// A value sitting exactly on zero counts once, on arrival.
pub fn sign_change_detected(g_old: f64, g_new: f64, direction: EventDirection) -> bool {
    if g_old * g_new > 0.0 || g_old == 0.0 {
        return false;
    }
    match direction {
        EventDirection::Rising => g_old < 0.0 && g_new >= 0.0,
        EventDirection::Falling => g_old > 0.0 && g_new <= 0.0,
        EventDirection::Any => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrentError {
    NotBracketed { fa: f64, fb: f64 },
    MaxIterations { best: f64, f_best: f64 },
}

/// Brent's root finder on a bracketing interval
#[derive(Debug, Clone)]
pub struct BrentSolver {
    pub tol: f64,
    pub max_iter: usize,
}

impl BrentSolver {
    pub fn new(tol: f64, max_iter: usize) -> Self {
        Self { tol, max_iter }
    }

    /// Returns `(root, f(root), iterations)`; `f(a)` and `f(b)` must differ in sign
    pub fn find_root<F>(
        &self,
        mut f: F,
        a: f64,
        b: f64,
        fa: f64,
        fb: f64,
    ) -> Result<(f64, f64, usize), BrentError>
    where
        F: FnMut(f64) -> f64,
    {
        if fa * fb > 0.0 {
            return Err(BrentError::NotBracketed { fa, fb });
        }
        let (mut a, mut b, mut fa, mut fb) = (a, b, fa, fb);
        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
        let mut c = a;
        let mut fc = fa;
        let mut d = b - a;
        let mut bisected = true;

        for iter in 0..self.max_iter {
            if fb == 0.0 || (b - a).abs() <= self.tol {
                return Ok((b, fb, iter + 1));
            }
            let mut s = if fa != fc && fb != fc {
                a * fb * fc / ((fa - fb) * (fa - fc))
                    + b * fa * fc / ((fb - fa) * (fb - fc))
                    + c * fa * fb / ((fc - fa) * (fc - fb))
            } else {
                b - fb * (b - a) / (fb - fa)
            };

            let outside = (s - (3.0 * a + b) / 4.0) * (s - b) > 0.0;
            let slow = if bisected {
                (s - b).abs() >= (b - c).abs() / 2.0 || (b - c).abs() < self.tol
            } else {
                (s - b).abs() >= (c - d).abs() / 2.0 || (c - d).abs() < self.tol
            };
            if outside || slow || !s.is_finite() {
                s = 0.5 * (a + b);
                bisected = true;
            } else {
                bisected = false;
            }

            let fs = f(s);
            d = c;
            c = b;
            fc = fb;
            if fa * fs < 0.0 {
                b = s;
                fb = fs;
            } else {
                a = s;
                fa = fs;
            }
            if fa.abs() < fb.abs() {
                std::mem::swap(&mut a, &mut b);
                std::mem::swap(&mut fa, &mut fb);
            }
        }
        Err(BrentError::MaxIterations {
            best: b,
            f_best: fb,
        })
    }
}
