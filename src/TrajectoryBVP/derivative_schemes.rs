//! # Derivative Schemes
//!
//! Finite-difference formulas on a uniform grid. A scheme reads a stencil window centred on the
//! evaluation point and returns the first or second derivative there. The window may be wider
//! than the scheme needs; only the `2*half_width()+1` central values are used.
//!
//! | Scheme | Points | Order | `f'` | `f''` |
//! |--------|--------|-------|------|-------|
//! | `CentralDifference2` | 3 | 2 | `(f₊₁ - f₋₁)/2h` | `(f₊₁ - 2f₀ + f₋₁)/h²` |
//! | `CentralDifference4` | 5 | 4 | `(-f₊₂ + 8f₊₁ - 8f₋₁ + f₋₂)/12h` | `(-f₊₂ + 16f₊₁ - 30f₀ + 16f₋₁ - f₋₂)/12h²` |
//!
//! The residual model receives the scheme as an explicit argument, so the same equation can be
//! evaluated with either scheme without any global state.

use super::trajectory_error::TrajectoryError;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
pub trait DerivativeScheme {
    /// number of neighbours needed on each side of the centre
    fn half_width(&self) -> usize;
    fn first_derivative(&self, window: &[f64], dx: f64) -> f64;
    fn second_derivative(&self, window: &[f64], dx: f64) -> f64;
}

/// 3-point central differences, 2nd order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CentralDifference2;

/// 5-point central differences, 4th order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CentralDifference4;

fn centre(window: &[f64]) -> usize {
    window.len() / 2
}

impl DerivativeScheme for CentralDifference2 {
    fn half_width(&self) -> usize {
        1
    }

    fn first_derivative(&self, window: &[f64], dx: f64) -> f64 {
        let c = centre(window);
        (window[c + 1] - window[c - 1]) / (2.0 * dx)
    }

    fn second_derivative(&self, window: &[f64], dx: f64) -> f64 {
        let c = centre(window);
        (window[c + 1] - 2.0 * window[c] + window[c - 1]) / (dx * dx)
    }
}

impl DerivativeScheme for CentralDifference4 {
    fn half_width(&self) -> usize {
        2
    }

    fn first_derivative(&self, window: &[f64], dx: f64) -> f64 {
        let c = centre(window);
        (-window[c + 2] + 8.0 * window[c + 1] - 8.0 * window[c - 1] + window[c - 2])
            / (12.0 * dx)
    }

    fn second_derivative(&self, window: &[f64], dx: f64) -> f64 {
        let c = centre(window);
        (-window[c + 2] + 16.0 * window[c + 1] - 30.0 * window[c] + 16.0 * window[c - 1]
            - window[c - 2])
            / (12.0 * dx * dx)
    }
}

/// Schemes selectable from a task file
#[enum_dispatch(DerivativeScheme)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scheme {
    CentralDifference2,
    CentralDifference4,
}

impl Default for Scheme {
    fn default() -> Self {
        Scheme::CentralDifference2(CentralDifference2)
    }
}

impl Scheme {
    /// "central2" or "central4"
    pub fn from_name(name: &str) -> Result<Self, TrajectoryError> {
        match name.trim().to_lowercase().as_str() {
            "central2" | "central" | "fdm" => Ok(Scheme::CentralDifference2(CentralDifference2)),
            "central4" => Ok(Scheme::CentralDifference4(CentralDifference4)),
            other => Err(TrajectoryError::InvalidConfiguration(format!(
                "unknown derivative scheme '{}'",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scheme::CentralDifference2(_) => "central2",
            Scheme::CentralDifference4(_) => "central4",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(f: impl Fn(f64) -> f64, x0: f64, dx: f64, half_width: usize) -> Vec<f64> {
        let hw = half_width as i64;
        (-hw..=hw).map(|k| f(x0 + k as f64 * dx)).collect()
    }

    #[test]
    fn test_central2_exact_on_quadratics() {
        let f = |x: f64| 3.0 * x * x - 2.0 * x + 1.0;
        let w = sample(f, 0.7, 0.1, 1);
        let s = CentralDifference2;
        assert_relative_eq!(s.first_derivative(&w, 0.1), 6.0 * 0.7 - 2.0, epsilon = 1e-10);
        assert_relative_eq!(s.second_derivative(&w, 0.1), 6.0, epsilon = 1e-8);
    }

    #[test]
    fn test_central4_exact_on_quartics() {
        let f = |x: f64| x.powi(4) - x.powi(3) + 2.0 * x;
        let (x0, dx) = (0.3, 0.05);
        let w = sample(f, x0, dx, 2);
        let s = CentralDifference4;
        let d1 = 4.0 * x0.powi(3) - 3.0 * x0 * x0 + 2.0;
        let d2 = 12.0 * x0 * x0 - 6.0 * x0;
        // the 4th-order formulas carry an h^4 f^(5)/h^4 f^(6) term, zero for a quartic
        assert_relative_eq!(s.first_derivative(&w, dx), d1, epsilon = 1e-10);
        assert_relative_eq!(s.second_derivative(&w, dx), d2, epsilon = 1e-7);
    }

    #[test]
    fn test_wider_window_uses_centre() {
        let f = |x: f64| x * x;
        let w = sample(f, 2.0, 0.5, 2);
        let s = CentralDifference2;
        assert_relative_eq!(s.first_derivative(&w, 0.5), 4.0, epsilon = 1e-12);
        assert_relative_eq!(s.second_derivative(&w, 0.5), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scheme_dispatch_and_names() {
        let s = Scheme::from_name("central4").unwrap();
        assert_eq!(s.half_width(), 2);
        assert_eq!(s.name(), "central4");
        assert_eq!(Scheme::default().half_width(), 1);
        assert!(Scheme::from_name("upwind7").is_err());
    }
}
