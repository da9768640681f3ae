//! # Interpolated Initial Guess
//!
//! Turns the seed trajectory into the starting iterate of the relaxation. Two piecewise-linear
//! interpolants `y(x)` and `v(x)` are built over the seed samples and evaluated at every
//! interior cell of the domain. The guess only seeds iteration 0 and is never recomputed.
//!
//! Queries outside `[x_min, x_max]` of the seed are clamped to the nearest end sample. Clamping
//! is reported with `log::warn!` and counted in [`GuessReport`], it never fails. Whether a seed
//! that is shorter than the domain is acceptable at all is decided up front by
//! [`InitialGuess::check_coverage`] with a [`CoveragePolicy`].

use super::domain::Domain;
use super::trajectory_error::TrajectoryError;
use crate::TrajectoryIVP::seed_io::SeedArrays;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// What to do when the seed does not span the whole domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoveragePolicy {
    /// clamp to the end samples and warn
    #[default]
    Clamp,
    /// refuse to build the guess
    Strict,
}

/// Piecewise-linear interpolant over non-decreasing abscissae
#[derive(Debug, Clone, PartialEq)]
pub struct SeedInterpolant {
    x: Vec<f64>,
    f: Vec<f64>,
}

impl SeedInterpolant {
    pub fn new(x: &[f64], f: &[f64]) -> Result<Self, TrajectoryError> {
        if x.is_empty() {
            return Err(TrajectoryError::MissingData(
                "cannot interpolate an empty seed".to_string(),
            ));
        }
        if x.len() != f.len() {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "seed abscissae ({}) and values ({}) differ in length",
                x.len(),
                f.len()
            )));
        }
        if x.iter().chain(f.iter()).any(|value| !value.is_finite()) {
            return Err(TrajectoryError::InvalidConfiguration(
                "seed contains non-finite samples".to_string(),
            ));
        }
        if let Some(i) = x.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "seed x must be non-decreasing, x[{}] = {} > x[{}] = {}",
                i,
                x[i],
                i + 1,
                x[i + 1]
            )));
        }
        Ok(Self {
            x: x.to_vec(),
            f: f.to_vec(),
        })
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Value at `q` and whether `q` had to be clamped
    pub fn eval_checked(&self, q: f64) -> (f64, bool) {
        let last = self.x.len() - 1;
        if q.is_nan() {
            return (f64::NAN, true);
        }
        if q <= self.x[0] {
            return (self.f[0], q < self.x[0]);
        }
        if q >= self.x[last] {
            return (self.f[last], q > self.x[last]);
        }
        // x[lo] <= q < x[hi], so x[hi] > x[lo] even with repeated samples
        let hi = self.x.partition_point(|&xi| xi <= q);
        let lo = hi - 1;
        let w = (q - self.x[lo]) / (self.x[hi] - self.x[lo]);
        (self.f[lo] + w * (self.f[hi] - self.f[lo]), false)
    }

    pub fn eval(&self, q: f64) -> f64 {
        self.eval_checked(q).0
    }
}

/// Outcome of seeding a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuessReport {
    pub cells: usize,
    pub clamped: usize,
}

#[derive(Debug, Clone)]
pub struct InitialGuess {
    y: SeedInterpolant,
    v: SeedInterpolant,
}

impl InitialGuess {
    pub fn from_seed(seed: &SeedArrays) -> Result<Self, TrajectoryError> {
        seed.validate()?;
        Ok(Self {
            y: SeedInterpolant::new(&seed.x, &seed.y)?,
            v: SeedInterpolant::new(&seed.x, &seed.v)?,
        })
    }

    /// Compares the seed range with the domain `[0, length]`
    pub fn check_coverage(&self, length: f64, policy: CoveragePolicy) -> Result<(), TrajectoryError> {
        let (x_min, x_max) = self.y.x_range();
        if x_min <= 0.0 && x_max >= length {
            return Ok(());
        }
        match policy {
            CoveragePolicy::Clamp => {
                warn!(
                    "seed covers x in [{:.3}, {:.3}] but the domain is [0, {:.3}]; cells outside are clamped",
                    x_min, x_max, length
                );
                Ok(())
            }
            CoveragePolicy::Strict => Err(TrajectoryError::SeedCoverage {
                seed_start: x_min,
                seed_end: x_max,
                length,
            }),
        }
    }

    /// Writes y(x) and v(x) into every interior cell
    pub fn initialize_domain(&self, domain: &mut Domain) -> Result<GuessReport, TrajectoryError> {
        let y_var = domain.variable_index("y")?;
        let v_var = domain.variable_index("v")?;
        let mut report = GuessReport::default();
        for k in domain.interior() {
            let x = domain.x(k);
            let (y, y_clamped) = self.y.eval_checked(x);
            let (v, _) = self.v.eval_checked(x);
            domain.set_value(y_var, k, y);
            domain.set_value(v_var, k, v);
            report.cells += 1;
            if y_clamped {
                report.clamped += 1;
            }
        }
        if report.clamped > 0 {
            warn!(
                "{} of {} interior cells lie outside the seed range and were clamped",
                report.clamped, report.cells
            );
        }
        info!("initial guess written to {} interior cells", report.cells);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seed() -> SeedArrays {
        SeedArrays {
            x: vec![0.0, 10.0, 20.0, 20.0, 40.0],
            y: vec![0.0, 5.0, 8.0, 8.0, 0.0],
            v: vec![100.0, 120.0, 130.0, 130.0, 150.0],
        }
    }

    #[test]
    fn test_end_samples_are_exact() {
        let s = seed();
        let interp = SeedInterpolant::new(&s.x, &s.y).unwrap();
        assert_eq!(interp.eval(0.0), s.y[0]);
        assert_eq!(interp.eval(40.0), s.y[4]);
        assert_eq!(interp.x_range(), (0.0, 40.0));
    }

    #[test]
    fn test_clamping_outside_range() {
        let s = seed();
        let interp = SeedInterpolant::new(&s.x, &s.v).unwrap();
        assert_eq!(interp.eval_checked(-5.0), (100.0, true));
        assert_eq!(interp.eval_checked(1e6), (150.0, true));
        assert_eq!(interp.eval_checked(40.0), (150.0, false));
    }

    #[test]
    fn test_continuity_between_samples() {
        let s = seed();
        let interp = SeedInterpolant::new(&s.x, &s.y).unwrap();
        for (xi, yi) in s.x.iter().zip(s.y.iter()) {
            assert_relative_eq!(interp.eval(*xi), *yi, epsilon = 1e-12);
            // approaching each sample from both sides gives the sample value
            assert_relative_eq!(interp.eval(xi - 1e-9), *yi, epsilon = 1e-6);
            assert_relative_eq!(interp.eval(xi + 1e-9), *yi, epsilon = 1e-6);
        }
        assert_relative_eq!(interp.eval(5.0), 2.5, epsilon = 1e-12);
        assert_relative_eq!(interp.eval(30.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_seeds() {
        assert!(SeedInterpolant::new(&[], &[]).is_err());
        assert!(SeedInterpolant::new(&[0.0, 1.0], &[0.0]).is_err());
        assert!(SeedInterpolant::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(SeedInterpolant::new(&[0.0, f64::NAN], &[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_coverage_policies() {
        let guess = InitialGuess::from_seed(&seed()).unwrap();
        assert!(guess.check_coverage(40.0, CoveragePolicy::Strict).is_ok());
        assert!(guess.check_coverage(50.0, CoveragePolicy::Clamp).is_ok());
        assert!(matches!(
            guess.check_coverage(50.0, CoveragePolicy::Strict),
            Err(TrajectoryError::SeedCoverage { .. })
        ));
    }

    #[test]
    fn test_coverage_error_carries_both_seed_ends() {
        let late_start = SeedArrays {
            x: vec![5.0, 20.0, 60.0],
            y: vec![1.0, 8.0, 0.0],
            v: vec![100.0, 130.0, 150.0],
        };
        let guess = InitialGuess::from_seed(&late_start).unwrap();
        // the far end is covered, the launch point is not
        match guess.check_coverage(50.0, CoveragePolicy::Strict) {
            Err(err @ TrajectoryError::SeedCoverage {
                seed_start,
                seed_end,
                length,
            }) => {
                assert_eq!(seed_start, 5.0);
                assert_eq!(seed_end, 60.0);
                assert_eq!(length, 50.0);
                assert_eq!(
                    err.to_string(),
                    "seed covers x in [5.000, 60.000] but the domain is [0, 50.000]"
                );
            }
            other => panic!("expected SeedCoverage, got {:?}", other),
        }
        assert!(guess.check_coverage(50.0, CoveragePolicy::Clamp).is_ok());
    }

    #[test]
    fn test_initialize_domain_fills_interior_only() {
        let guess = InitialGuess::from_seed(&seed()).unwrap();
        // cells at 0, 10, 20, 30, 40, 50: the last interior cell (40) is on the seed end
        let mut domain = Domain::from_size(4, 1, 1, &["y", "v"], 0.0, 50.0).unwrap();
        let report = guess.initialize_domain(&mut domain).unwrap();
        assert_eq!(report.cells, 4);
        assert_eq!(report.clamped, 0);
        assert_eq!(domain.value(0, 1), 5.0);
        assert_relative_eq!(domain.value(0, 3), 4.0, epsilon = 1e-12);
        assert_eq!(domain.value(1, 4), 150.0);
        // boundary cells are left for the boundary conditions
        assert_eq!(domain.value(0, 0), 0.0);
        assert_eq!(domain.value(1, 5), 0.0);

        let mut wide = Domain::from_size(4, 1, 1, &["y", "v"], 0.0, 100.0).unwrap();
        let report = guess.initialize_domain(&mut wide).unwrap();
        // interior cells at 20, 40, 60, 80
        assert_eq!(report.clamped, 2);
        assert_eq!(wide.value(1, 4), 150.0);
    }
}
