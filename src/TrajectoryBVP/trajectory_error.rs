//! Error type shared by the seed generator, the initial guess and the relaxation driver.
//!
//! Numerical edge cases (near-zero speed, interpolation outside the seed range) are not errors:
//! they are regularised or clamped locally and only reported through `log::warn!`.
//! Everything in this enum is structural and is always propagated to the caller.

use crate::TrajectoryIVP::dormand_prince::IntegrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// the IVP never produced a downward altitude crossing before the horizon
    #[error("seed integration reached t_max = {t_max} s without a ground impact")]
    SeedTermination { t_max: f64 },
    #[error("seed integration failed: {0}")]
    Integration(#[from] IntegrationError),
    /// the relaxation exhausted its iteration budget
    #[error("relaxation did not converge in {iterations} iterations (residual norm {residual:.3e})")]
    NonConvergence { iterations: usize, residual: f64 },
    #[error("Jacobian is singular at relaxation iteration {iteration}")]
    LinearSolveFailed { iteration: usize },
    #[error("seed covers x in [{seed_start:.3}, {seed_end:.3}] but the domain is [0, {length:.3}]")]
    SeedCoverage {
        seed_start: f64,
        seed_end: f64,
        length: f64,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("missing data: {0}")]
    MissingData(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
