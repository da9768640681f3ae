//! # Domain
//!
//! Uniform 1-D grid of cells carrying one value per variable.
//!
//! ```text
//!  boundary           interior                       boundary
//! [0 .. n_left) [n_left .. n_left+n_interior) [.. n_total)
//!  x_k = xmin + k*dx,   dx = (xmax - xmin)/(n_total - 1)
//! ```
//!
//! The outermost cells sit exactly on `xmin` and `xmax`, so a Dirichlet condition pins the value
//! at the physical end of the domain. Values live in an `n_total x n_vars` column-major
//! `DMatrix`: every variable is a contiguous column and a stencil window is a plain slice.

use super::boundary_conditions::{BoundaryCondition, BoundaryConditions};
use super::trajectory_error::TrajectoryError;
use nalgebra::{DMatrix, DVector};
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct Domain {
    variables: Vec<String>,
    n_interior: usize,
    n_left: usize,
    n_right: usize,
    xmin: f64,
    xmax: f64,
    dx: f64,
    values: DMatrix<f64>,
}

impl Domain {
    pub fn from_size(
        n_interior: usize,
        n_left: usize,
        n_right: usize,
        variables: &[&str],
        xmin: f64,
        xmax: f64,
    ) -> Result<Self, TrajectoryError> {
        if n_interior == 0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "domain needs at least one interior cell".to_string(),
            ));
        }
        if variables.is_empty() {
            return Err(TrajectoryError::InvalidConfiguration(
                "domain needs at least one variable".to_string(),
            ));
        }
        for (i, name) in variables.iter().enumerate() {
            if variables[..i].contains(name) {
                return Err(TrajectoryError::InvalidConfiguration(format!(
                    "variable '{}' is declared twice",
                    name
                )));
            }
        }
        if !xmin.is_finite() || !xmax.is_finite() || xmax <= xmin {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "invalid domain extent [{}, {}]",
                xmin, xmax
            )));
        }
        let n_total = n_left + n_interior + n_right;
        let dx = if n_total > 1 {
            (xmax - xmin) / (n_total - 1) as f64
        } else {
            xmax - xmin
        };
        Ok(Self {
            variables: variables.iter().map(|s| s.to_string()).collect(),
            n_interior,
            n_left,
            n_right,
            xmin,
            xmax,
            dx,
            values: DMatrix::zeros(n_total, variables.len()),
        })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn n_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn n_total(&self) -> usize {
        self.n_left + self.n_interior + self.n_right
    }

    pub fn n_interior(&self) -> usize {
        self.n_interior
    }

    pub fn n_left(&self) -> usize {
        self.n_left
    }

    pub fn n_right(&self) -> usize {
        self.n_right
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Coordinate of cell `k`
    pub fn x(&self, k: usize) -> f64 {
        if k + 1 == self.n_total() {
            self.xmax
        } else {
            self.xmin + k as f64 * self.dx
        }
    }

    pub fn xs(&self) -> Vec<f64> {
        (0..self.n_total()).map(|k| self.x(k)).collect()
    }

    /// Indices of the interior cells
    pub fn interior(&self) -> Range<usize> {
        self.n_left..self.n_left + self.n_interior
    }

    pub fn variable_index(&self, name: &str) -> Result<usize, TrajectoryError> {
        self.variables
            .iter()
            .position(|v| v == name)
            .ok_or_else(|| TrajectoryError::MissingData(format!("unknown variable '{}'", name)))
    }

    pub fn value(&self, var: usize, k: usize) -> f64 {
        self.values[(k, var)]
    }

    pub fn set_value(&mut self, var: usize, k: usize, value: f64) {
        self.values[(k, var)] = value;
    }

    /// All cell values of one variable, boundary cells included
    pub fn column(&self, var: usize) -> &[f64] {
        let n = self.n_total();
        &self.values.as_slice()[var * n..(var + 1) * n]
    }

    /// Values of `var` on cells `k - half_width ..= k + half_width`
    pub fn window(&self, var: usize, k: usize, half_width: usize) -> &[f64] {
        let column = self.column(var);
        &column[k - half_width..=k + half_width]
    }

    /// Checks that a stencil of the given half width never leaves the grid
    pub fn check_stencil(&self, half_width: usize) -> Result<(), TrajectoryError> {
        if self.n_left < half_width || self.n_right < half_width {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "stencil half width {} needs at least {} boundary cells per side, got {} and {}",
                half_width, half_width, self.n_left, self.n_right
            )));
        }
        Ok(())
    }

    /// Resolves every boundary cell from its condition
    pub fn apply_boundary_conditions(
        &mut self,
        bcs: &BoundaryConditions,
    ) -> Result<(), TrajectoryError> {
        let n_total = self.n_total();
        let first_interior = self.n_left;
        let last_interior = self.n_left + self.n_interior - 1;
        for var in 0..self.n_vars() {
            let pair = *bcs.get(&self.variables[var]).ok_or_else(|| {
                TrajectoryError::MissingData(format!(
                    "no boundary conditions for variable '{}'",
                    self.variables[var]
                ))
            })?;
            let left_value = match pair.left {
                BoundaryCondition::Dirichlet(value) => value,
                BoundaryCondition::Outflow => self.value(var, first_interior),
            };
            for k in 0..self.n_left {
                self.set_value(var, k, left_value);
            }
            let right_value = match pair.right {
                BoundaryCondition::Dirichlet(value) => value,
                BoundaryCondition::Outflow => self.value(var, last_interior),
            };
            for k in last_interior + 1..n_total {
                self.set_value(var, k, right_value);
            }
        }
        Ok(())
    }

    /// Interior unknowns packed cell by cell: [a_0, b_0, a_1, b_1, ...]
    pub fn interior_vector(&self) -> DVector<f64> {
        let n_vars = self.n_vars();
        let mut u = DVector::zeros(self.n_interior * n_vars);
        for (i, k) in self.interior().enumerate() {
            for var in 0..n_vars {
                u[i * n_vars + var] = self.value(var, k);
            }
        }
        u
    }

    pub fn set_interior_vector(&mut self, u: &DVector<f64>) -> Result<(), TrajectoryError> {
        let n_vars = self.n_vars();
        if u.len() != self.n_interior * n_vars {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "unknown vector has length {}, expected {}",
                u.len(),
                self.n_interior * n_vars
            )));
        }
        for (i, k) in self.interior().enumerate() {
            for var in 0..n_vars {
                self.set_value(var, k, u[i * n_vars + var]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrajectoryBVP::boundary_conditions::BoundaryCondition::{Dirichlet, Outflow};
    use approx::assert_relative_eq;

    fn domain() -> Domain {
        Domain::from_size(4, 1, 1, &["y", "v"], 0.0, 10.0).unwrap()
    }

    #[test]
    fn test_grid_ends_on_domain_edges() {
        let d = domain();
        assert_eq!(d.n_total(), 6);
        assert_relative_eq!(d.dx(), 2.0);
        assert_eq!(d.x(0), 0.0);
        assert_eq!(d.x(5), 10.0);
        assert_relative_eq!(d.x(3), 6.0);
        assert_eq!(d.interior(), 1..5);
    }

    #[test]
    fn test_dirichlet_pins_and_outflow_copies() {
        let mut d = domain();
        let y = d.variable_index("y").unwrap();
        let v = d.variable_index("v").unwrap();
        for k in d.interior() {
            d.set_value(y, k, k as f64);
            d.set_value(v, k, 10.0 * k as f64);
        }
        let bcs = BoundaryConditions::new()
            .with("y", Dirichlet(0.0), Dirichlet(-1.0))
            .with("v", Dirichlet(100.0), Outflow);
        d.apply_boundary_conditions(&bcs).unwrap();
        assert_eq!(d.value(y, 0), 0.0);
        assert_eq!(d.value(y, 5), -1.0);
        assert_eq!(d.value(v, 0), 100.0);
        assert_eq!(d.value(v, 5), d.value(v, 4));
        // interior cells are untouched
        assert_eq!(d.value(y, 2), 2.0);
    }

    #[test]
    fn test_outflow_fills_every_ghost_cell() {
        let mut d = Domain::from_size(3, 2, 2, &["y"], 0.0, 6.0).unwrap();
        for k in d.interior() {
            d.set_value(0, k, 5.0 + k as f64);
        }
        let bcs = BoundaryConditions::new().with("y", Outflow, Outflow);
        d.apply_boundary_conditions(&bcs).unwrap();
        assert_eq!(d.column(0), &[7.0, 7.0, 7.0, 8.0, 9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_window_and_packing() {
        let mut d = domain();
        for k in 0..d.n_total() {
            d.set_value(0, k, k as f64);
            d.set_value(1, k, -(k as f64));
        }
        assert_eq!(d.window(0, 2, 1), &[1.0, 2.0, 3.0]);
        assert_eq!(d.window(1, 3, 1), &[-2.0, -3.0, -4.0]);
        let mut u = d.interior_vector();
        assert_eq!(u.len(), 8);
        assert_eq!(u[0], 1.0);
        assert_eq!(u[1], -1.0);
        u[2] = 42.0;
        d.set_interior_vector(&u).unwrap();
        assert_eq!(d.value(0, 2), 42.0);
        assert!(d.set_interior_vector(&DVector::zeros(3)).is_err());
    }

    #[test]
    fn test_invalid_domains() {
        assert!(Domain::from_size(0, 1, 1, &["y"], 0.0, 1.0).is_err());
        assert!(Domain::from_size(4, 1, 1, &["y"], 1.0, 1.0).is_err());
        assert!(Domain::from_size(4, 1, 1, &["y", "y"], 0.0, 1.0).is_err());
        let d = domain();
        assert!(d.check_stencil(1).is_ok());
        assert!(d.check_stencil(2).is_err());
        let missing = BoundaryConditions::new().with("y", Outflow, Outflow);
        let mut d = domain();
        assert!(matches!(
            d.apply_boundary_conditions(&missing),
            Err(TrajectoryError::MissingData(_))
        ));
    }
}
