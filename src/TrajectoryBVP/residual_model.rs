//! # Residual Model
//!
//! Steady trajectory written with the horizontal distance `x` as the independent variable.
//! With `y' = dy/dx` the path slope and `v` the speed along the path:
//!
//! ```text
//! y'' + g·(1 + y'²)/v² = 0
//! v'  - √(1 + y'²)/v · (T - D)/m + g·y'/v = 0,      D = ½·ρ·Cd·A·v²
//! ```
//!
//! `residuals` evaluates both left-hand sides at the centre of a stencil window; the relaxation
//! driver moves the cell values until every residual vanishes. All `1/v` terms carry
//! `EPS_VELOCITY` so a zero speed never produces an infinity.

use super::derivative_schemes::DerivativeScheme;
use super::physical_params::{EPS_VELOCITY, PhysicalParams};
use super::trajectory_error::TrajectoryError;
use log::warn;

/// Speed below which an iterate is flagged as unphysical
pub const SINGULAR_VELOCITY_THRESHOLD: f64 = 1e-6;

/// Number of governing equations per cell
pub const N_EQUATIONS: usize = 2;

/// Neighbourhood of one cell: altitude and speed values centred on the evaluation point
#[derive(Debug, Clone, Copy)]
pub struct StencilWindow<'a> {
    pub y: &'a [f64],
    pub v: &'a [f64],
    pub dx: f64,
}

impl<'a> StencilWindow<'a> {
    pub fn new(y: &'a [f64], v: &'a [f64], dx: f64) -> Result<Self, TrajectoryError> {
        if y.len() != v.len() {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "stencil lengths differ: y has {}, v has {}",
                y.len(),
                v.len()
            )));
        }
        if y.len() % 2 == 0 || y.len() < 3 {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "stencil must have an odd length of at least 3, got {}",
                y.len()
            )));
        }
        if !(dx > 0.0) || !dx.is_finite() {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "grid spacing must be positive, got {}",
                dx
            )));
        }
        Ok(Self { y, v, dx })
    }

    pub fn centre_speed(&self) -> f64 {
        self.v[self.v.len() / 2]
    }

    pub fn fits<S: DerivativeScheme + ?Sized>(&self, scheme: &S) -> bool {
        self.y.len() >= 2 * scheme.half_width() + 1
    }
}

/// Governing equations of the steady trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryEquation {
    params: PhysicalParams,
}

impl TrajectoryEquation {
    pub fn new(params: PhysicalParams) -> Result<Self, TrajectoryError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Residual pair `[res_y, res_v]` at the window centre
    pub fn residuals<S: DerivativeScheme + ?Sized>(
        &self,
        window: &StencilWindow,
        scheme: &S,
    ) -> Result<[f64; N_EQUATIONS], TrajectoryError> {
        if !window.fits(scheme) {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "stencil of {} points is too narrow for a scheme of half-width {}",
                window.y.len(),
                scheme.half_width()
            )));
        }
        let p = &self.params;
        let v = window.centre_speed();
        if v.abs() < SINGULAR_VELOCITY_THRESHOLD {
            warn!(
                "speed {:.3e} is close to zero in residual evaluation, regularised with eps = {:e}",
                v, EPS_VELOCITY
            );
        }

        let yp = scheme.first_derivative(window.y, window.dx);
        let ypp = scheme.second_derivative(window.y, window.dx);
        let vp = scheme.first_derivative(window.v, window.dx);

        let drag = p.drag(v);
        let slope_factor = (1.0 + yp * yp).sqrt();

        let res_y = ypp + p.g * (1.0 + yp * yp) / (v * v + EPS_VELOCITY);
        let res_v = vp - (slope_factor / (v + EPS_VELOCITY)) * (p.thrust / p.mass - drag / p.mass)
            + p.g * yp / (v + EPS_VELOCITY);
        Ok([res_y, res_v])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrajectoryBVP::derivative_schemes::{CentralDifference2, CentralDifference4, Scheme};
    use approx::assert_relative_eq;

    fn sample(f: impl Fn(f64) -> f64, dx: f64, half_width: i64) -> Vec<f64> {
        (-half_width..=half_width).map(|k| f(k as f64 * dx)).collect()
    }

    #[test]
    fn test_residuals_are_bit_identical_on_repeat() {
        let eq = TrajectoryEquation::new(PhysicalParams::default()).unwrap();
        let y = [10.0, 12.5, 13.1];
        let v = [250.0, 260.0, 268.0];
        let w = StencilWindow::new(&y, &v, 25.0).unwrap();
        let r1 = eq.residuals(&w, &CentralDifference2).unwrap();
        let r2 = eq.residuals(&w, &CentralDifference2).unwrap();
        assert_eq!(r1[0].to_bits(), r2[0].to_bits());
        assert_eq!(r1[1].to_bits(), r2[1].to_bits());
        assert_eq!(r1.len(), N_EQUATIONS);
    }

    #[test]
    fn test_straight_cruise_with_balanced_thrust_is_exact() {
        // no gravity, thrust equal to drag at v0: a straight line flown at constant speed
        let v0 = 300.0;
        let mut p = PhysicalParams::default();
        p.g = 0.0;
        p.thrust = p.drag(v0);
        let eq = TrajectoryEquation::new(p).unwrap();
        let slope = 0.25;
        let dx = 10.0;
        let y = sample(|x| 5.0 + slope * x, dx, 1);
        let v = vec![v0; 3];
        let w = StencilWindow::new(&y, &v, dx).unwrap();
        let r = eq.residuals(&w, &CentralDifference2).unwrap();
        assert_relative_eq!(r[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(r[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_apex_of_exact_local_solution() {
        // at the apex y' = 0 so y'' = -g/v0^2 and v' = (T - D)/(m v0)
        let p = PhysicalParams::default();
        let eq = TrajectoryEquation::new(p).unwrap();
        let v0 = 2000.0;
        let curvature = -p.g / (v0 * v0);
        let dv = p.net_acceleration(v0) / v0;
        let dx = 50.0;
        for scheme in [
            Scheme::CentralDifference2(CentralDifference2),
            Scheme::CentralDifference4(CentralDifference4),
        ] {
            let hw = 2;
            let y = sample(|x| 1000.0 + 0.5 * curvature * x * x, dx, hw);
            let v = sample(|x| v0 + dv * x, dx, hw);
            let w = StencilWindow::new(&y, &v, dx).unwrap();
            let r = eq.residuals(&w, &scheme).unwrap();
            // eps in v^2 + eps shifts res_y by ~g*eps/v^4, far below the tolerance
            assert_relative_eq!(r[0], 0.0, epsilon = 1e-12);
            assert_relative_eq!(r[1], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_residuals_stay_finite_as_speed_vanishes() {
        let eq = TrajectoryEquation::new(PhysicalParams::default()).unwrap();
        let y = [0.0, 1.0, 1.5];
        for v_centre in [1e-3, 1e-6, 1e-9, 1e-12, 1e-300, 0.0] {
            let v = [v_centre, v_centre, v_centre];
            let w = StencilWindow::new(&y, &v, 1.0).unwrap();
            let r = eq.residuals(&w, &CentralDifference2).unwrap();
            assert!(r[0].is_finite(), "res_y not finite at v = {}", v_centre);
            assert!(r[1].is_finite(), "res_v not finite at v = {}", v_centre);
        }
    }

    #[test]
    fn test_window_validation() {
        let y = [0.0, 1.0];
        let v = [1.0, 1.0];
        assert!(StencilWindow::new(&y, &v, 1.0).is_err());
        let y = [0.0, 1.0, 2.0];
        let v = [1.0, 1.0];
        assert!(StencilWindow::new(&y, &v, 1.0).is_err());
        let v = [1.0, 1.0, 1.0];
        assert!(StencilWindow::new(&y, &v, 0.0).is_err());
        let w = StencilWindow::new(&y, &v, 1.0).unwrap();
        assert!(w.fits(&CentralDifference2));
        assert!(!w.fits(&CentralDifference4));
    }

    #[test]
    fn test_narrow_window_is_rejected_by_wide_scheme() {
        let eq = TrajectoryEquation::new(PhysicalParams::default()).unwrap();
        let y = [0.0, 1.0, 1.5];
        let v = [200.0, 200.0, 200.0];
        let w = StencilWindow::new(&y, &v, 1.0).unwrap();
        assert!(matches!(
            eq.residuals(&w, &CentralDifference4),
            Err(TrajectoryError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            eq.residuals(&w, &Scheme::from_name("central4").unwrap()),
            Err(TrajectoryError::InvalidConfiguration(_))
        ));
        assert!(eq.residuals(&w, &CentralDifference2).is_ok());
    }

    #[test]
    fn test_equation_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrajectoryEquation>();
        assert_send_sync::<Scheme>();
    }
}
