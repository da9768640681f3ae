//! # Trajectory Boundary Value Problem (BVP) Module
//!
//! Steady-state trajectory of a body propelled by constant thrust against quadratic drag,
//! written as a two-point boundary value problem in the horizontal distance `x ∈ [0, L]` and
//! solved by finite-difference relaxation.
//!
//! ## Mathematical Model
//!
//! ### Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `y` | altitude | m |
//! | `v` | speed along the path | m/s |
//! | `y'` | path slope `dy/dx` | - |
//! | `T` | thrust | N |
//! | `D` | drag `½·ρ·Cd·A·v²` | N |
//! | `m` | mass | kg |
//! | `g` | gravitational acceleration | m/s² |
//!
//! ### Governing Equations
//!
//! ```text
//! y'' + g·(1 + y'²)/v² = 0
//! v'  - √(1 + y'²)/v·(T - D)/m + g·y'/v = 0
//! ```
//!
//! Every `1/v` carries the regularisation `ε = 1e-8`.
//!
//! ### Boundary Conditions
//!
//! - `x = 0`: `y = 0`, `v = v0`
//! - `x = L`: `y = 0`, `v` free (outflow)
//!
//! ## Numerical Solution
//!
//! The nonlinear problem needs a good starting point, so the same flight is first integrated in
//! time (see [`crate::TrajectoryIVP`]) and the sampled trajectory is interpolated onto the grid.
//! The relaxation then moves the interior cell values until every residual vanishes.
//!
//! ## Module Structure
//!
//! - [`physical_params`]: body and environment constants
//! - [`derivative_schemes`]: central finite differences of 2nd and 4th order
//! - [`residual_model`]: the two residuals of one grid cell
//! - [`boundary_conditions`]: Dirichlet and outflow conditions per variable
//! - [`domain`]: uniform grid holding the cell values
//! - [`initial_guess`]: piecewise-linear interpolation of the seed onto the grid
//! - [`relaxation`]: damped Newton iteration with a finite-difference Jacobian
//! - [`trajectory_task`]: JSON task, complete workflow and result export
//! - [`trajectory_error`]: error type of the whole crate
//!
//! ## Usage
//!
//! ```rust, ignore
//! use TrajBVP::TrajectoryBVP::trajectory_task::TrajectoryTask;
//!
//! let task = TrajectoryTask::production();
//! task.pretty_print_task();
//! let solution = task.solve()?;
//! solution.pretty_print();
//! solution.save_csv("trajectory.csv")?;
//! ```

pub mod boundary_conditions;
pub mod derivative_schemes;
pub mod domain;
pub mod initial_guess;
pub mod physical_params;
pub mod relaxation;
pub mod residual_model;
pub mod trajectory_error;
pub mod trajectory_task;
