//! # Relaxation Driver
//!
//! Damped Newton iteration that drives the residual field of every interior cell to zero.
//!
//! ## Algorithm
//!
//! 1. the interior `(y, v)` values of all cells form the unknown vector `u`, packed cell by cell
//! 2. before every residual evaluation the domain resolves its boundary cells from the
//!    boundary conditions, so Outflow cells follow their interior neighbours
//! 3. `F(u)` is assembled by calling the residual model at every interior cell
//! 4. the Jacobian `J = ∂F/∂u` is built column by column with forward differences,
//!    `h_j = fd_step·max(1, |u_j|)`, and `J·δ = -F` is solved with a dense LU factorisation
//! 5. the step `u + λ·δ` starts from `λ = 1` and is halved until every speed stays positive and
//!    `‖F‖` decreases by at least `1e-4·λ·‖F‖`; below `min_damping` the iteration gives up
//! 6. convergence when `‖F‖₂ < tolerance`
//!
//! | Setting | Default |
//! |---------|---------|
//! | `tolerance` | 1e-6 |
//! | `max_iterations` | 50 |
//! | `fd_step` | 1e-7 |
//! | `min_damping` | 1e-4 |

use super::boundary_conditions::BoundaryConditions;
use super::derivative_schemes::DerivativeScheme;
use super::domain::Domain;
use super::residual_model::{
    N_EQUATIONS, SINGULAR_VELOCITY_THRESHOLD, StencilWindow, TrajectoryEquation,
};
use super::trajectory_error::TrajectoryError;
use log::{error, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Armijo constant of the backtracking
const SUFFICIENT_DECREASE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonRelaxation {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub fd_step: f64,
    pub min_damping: f64,
}

impl Default for NewtonRelaxation {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            fd_step: 1e-7,
            min_damping: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub residual: f64,
    /// damping factor of the step taken after this evaluation, 0 on the converged record
    pub damping: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationReport {
    pub iterations: usize,
    pub initial_residual: f64,
    pub final_residual: f64,
    /// cells regularised for near-zero speed, summed over the accepted iterates
    pub singular_speed_cells: usize,
    pub history: Vec<IterationRecord>,
}

impl RelaxationReport {
    pub fn pretty_print(&self) {
        use prettytable::{Table, row};

        let mut table = Table::new();
        table.add_row(row!["Iteration", "Residual norm", "Damping"]);
        for record in &self.history {
            table.add_row(row![
                record.iteration,
                format!("{:.4e}", record.residual),
                format!("{:.4}", record.damping)
            ]);
        }
        table.printstd();
        if self.singular_speed_cells > 0 {
            println!(
                "{} cell evaluations needed speed regularisation",
                self.singular_speed_cells
            );
        }
    }
}

/// Residual field of all interior cells, `[res_y, res_v]` per cell.
/// Boundary cells must already be resolved.
pub fn residual_field<S: DerivativeScheme + ?Sized>(
    domain: &Domain,
    equation: &TrajectoryEquation,
    scheme: &S,
) -> Result<DVector<f64>, TrajectoryError> {
    let hw = scheme.half_width();
    domain.check_stencil(hw)?;
    let y_var = domain.variable_index("y")?;
    let v_var = domain.variable_index("v")?;
    let mut field = DVector::zeros(domain.n_interior() * N_EQUATIONS);
    for (i, k) in domain.interior().enumerate() {
        let window = StencilWindow::new(
            domain.window(y_var, k, hw),
            domain.window(v_var, k, hw),
            domain.dx(),
        )?;
        let res = equation.residuals(&window, scheme)?;
        field[i * N_EQUATIONS] = res[0];
        field[i * N_EQUATIONS + 1] = res[1];
    }
    Ok(field)
}

struct Problem<'a, S: ?Sized> {
    equation: &'a TrajectoryEquation,
    scheme: &'a S,
    bcs: &'a BoundaryConditions,
    v_var: usize,
    n_vars: usize,
}

impl<S: DerivativeScheme + ?Sized> Problem<'_, S> {
    fn evaluate(&self, domain: &mut Domain, u: &DVector<f64>) -> Result<DVector<f64>, TrajectoryError> {
        domain.set_interior_vector(u)?;
        domain.apply_boundary_conditions(self.bcs)?;
        residual_field(domain, self.equation, self.scheme)
    }

    /// Puts `u` back into the domain with resolved boundary cells
    fn restore(&self, domain: &mut Domain, u: &DVector<f64>) -> Result<(), TrajectoryError> {
        domain.set_interior_vector(u)?;
        domain.apply_boundary_conditions(self.bcs)
    }

    fn jacobian(
        &self,
        domain: &mut Domain,
        u: &DVector<f64>,
        f0: &DVector<f64>,
        fd_step: f64,
    ) -> Result<DMatrix<f64>, TrajectoryError> {
        let n = u.len();
        let mut jac = DMatrix::zeros(f0.len(), n);
        let mut perturbed = u.clone();
        let mut columns = Ok(());
        for j in 0..n {
            let h = fd_step * u[j].abs().max(1.0);
            perturbed[j] = u[j] + h;
            match self.evaluate(domain, &perturbed) {
                Ok(f) => jac.set_column(j, &((f - f0) / h)),
                Err(e) => {
                    columns = Err(e);
                    break;
                }
            }
            perturbed[j] = u[j];
        }
        // the domain holds the last perturbed column
        self.restore(domain, u)?;
        columns.map(|_| jac)
    }

    fn speeds_positive(&self, u: &DVector<f64>) -> bool {
        u.iter()
            .skip(self.v_var)
            .step_by(self.n_vars)
            .all(|v| *v > 0.0)
    }

    fn singular_speeds(&self, u: &DVector<f64>) -> usize {
        u.iter()
            .skip(self.v_var)
            .step_by(self.n_vars)
            .filter(|v| v.abs() < SINGULAR_VELOCITY_THRESHOLD)
            .count()
    }
}

impl NewtonRelaxation {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TrajectoryError> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "relaxation tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "relaxation needs at least one iteration".to_string(),
            ));
        }
        if !(self.fd_step > 0.0) || !(self.min_damping > 0.0 && self.min_damping <= 1.0) {
            return Err(TrajectoryError::InvalidConfiguration(
                "fd_step must be positive and min_damping in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Relaxes the interior cells of `domain` in place to the steady trajectory
    pub fn solve<S: DerivativeScheme + ?Sized>(
        &self,
        domain: &mut Domain,
        equation: &TrajectoryEquation,
        scheme: &S,
        bcs: &BoundaryConditions,
    ) -> Result<RelaxationReport, TrajectoryError> {
        self.validate()?;
        bcs.validate(domain.variables())?;
        if domain.n_vars() != N_EQUATIONS {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "trajectory relaxation needs exactly {} variables, domain has {}",
                N_EQUATIONS,
                domain.n_vars()
            )));
        }
        let problem = Problem {
            equation,
            scheme,
            bcs,
            v_var: domain.variable_index("v")?,
            n_vars: domain.n_vars(),
        };

        let mut u = domain.interior_vector();
        if !problem.speeds_positive(&u) {
            return Err(TrajectoryError::InvalidConfiguration(
                "initial guess has non-positive speeds".to_string(),
            ));
        }
        let mut f = problem.evaluate(domain, &u)?;
        let mut norm = f.norm();
        let initial_residual = norm;
        let mut singular_speed_cells = problem.singular_speeds(&u);
        let mut history = Vec::new();
        info!(
            "relaxation: {} unknowns, initial residual {:.4e}",
            u.len(),
            initial_residual
        );

        for iteration in 0..self.max_iterations {
            if !norm.is_finite() {
                error!("residual is not finite at iteration {}", iteration);
                return Err(TrajectoryError::NonConvergence {
                    iterations: iteration,
                    residual: norm,
                });
            }
            if norm < self.tolerance {
                history.push(IterationRecord {
                    iteration,
                    residual: norm,
                    damping: 0.0,
                });
                info!("relaxation converged in {} iterations, residual {:.4e}", iteration, norm);
                return Ok(RelaxationReport {
                    iterations: iteration,
                    initial_residual,
                    final_residual: norm,
                    singular_speed_cells,
                    history,
                });
            }

            let jac = problem.jacobian(domain, &u, &f, self.fd_step)?;
            let Some(delta) = jac
                .lu()
                .solve(&(-&f))
                .filter(|d| d.iter().all(|x| x.is_finite()))
            else {
                error!("singular Jacobian at iteration {}", iteration);
                return Err(TrajectoryError::LinearSolveFailed { iteration });
            };

            let mut lambda = 1.0;
            let accepted = loop {
                let trial = &u + &delta * lambda;
                if problem.speeds_positive(&trial) {
                    let f_trial = problem.evaluate(domain, &trial)?;
                    let trial_norm = f_trial.norm();
                    if trial_norm.is_finite()
                        && trial_norm < (1.0 - SUFFICIENT_DECREASE * lambda) * norm
                    {
                        break Some((trial, f_trial, trial_norm));
                    }
                }
                lambda *= 0.5;
                if lambda < self.min_damping {
                    break None;
                }
            };
            let Some((trial, f_trial, trial_norm)) = accepted else {
                warn!(
                    "line search failed at iteration {}: no admissible step above damping {:e}",
                    iteration, self.min_damping
                );
                // leave the domain on the last accepted iterate
                problem.restore(domain, &u)?;
                return Err(TrajectoryError::NonConvergence {
                    iterations: iteration,
                    residual: norm,
                });
            };

            history.push(IterationRecord {
                iteration,
                residual: norm,
                damping: lambda,
            });
            info!(
                "iteration {:>3}: residual {:.4e} -> {:.4e}, damping {:.4}",
                iteration, norm, trial_norm, lambda
            );
            singular_speed_cells += problem.singular_speeds(&trial);
            u = trial;
            f = f_trial;
            norm = trial_norm;
        }

        // the last update may already have converged
        problem.restore(domain, &u)?;
        if norm < self.tolerance {
            history.push(IterationRecord {
                iteration: self.max_iterations,
                residual: norm,
                damping: 0.0,
            });
            info!(
                "relaxation converged in {} iterations, residual {:.4e}",
                self.max_iterations, norm
            );
            return Ok(RelaxationReport {
                iterations: self.max_iterations,
                initial_residual,
                final_residual: norm,
                singular_speed_cells,
                history,
            });
        }
        error!(
            "relaxation did not converge in {} iterations, residual {:.4e}",
            self.max_iterations, norm
        );
        Err(TrajectoryError::NonConvergence {
            iterations: self.max_iterations,
            residual: norm,
        })
    }
}
