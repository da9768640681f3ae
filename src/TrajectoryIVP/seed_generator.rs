//! # Seed Generator
//!
//! Integrates the powered flight as an initial value problem in time, from launch until the
//! body comes back to the ground. The sampled trajectory is only a starting point for the
//! relaxation, so moderate tolerances are enough.
//!
//! ## Equations of motion
//!
//! State `u = [x, y, v, θ]`, drag `D = ½·ρ·Cd·A·v²`:
//!
//! ```text
//! dx/dt = v·cos θ
//! dy/dt = v·sin θ
//! dv/dt = (T - D)/m - g·sin θ
//! dθ/dt = [ (T - D)/m·(-sin θ) - g·cos θ ] / (v + ε)
//! ```
//!
//! ## Termination
//!
//! The integration stops at the first downward zero crossing of `y` after `min_event_time`.
//! The launch point itself sits on `y = 0`, the guard keeps it from counting as an impact.
//! Reaching `t_max` without an impact is an error.
//!
//! | Setting | Default | Meaning |
//! |---------|---------|---------|
//! | `v_launch` | 100 m/s | launch speed |
//! | `launch_angle_deg` | 80° | flight-path angle at launch |
//! | `t_max` | 100 s | integration horizon |
//! | `max_step` | 0.1 s | largest step the integrator may take |
//! | `rtol` / `atol` | 1e-3 / 1e-6 | local error tolerances |
//! | `min_event_time` | 1e-3 s | impacts before this time are ignored |
//! | `h0` | 1e-3 s | first trial step |

use super::dormand_prince::{DormandPrince, OdeSystem, Stats, Termination};
use super::events::{EventConfig, EventDirection, EventFunction};
use crate::TrajectoryBVP::physical_params::{EPS_VELOCITY, PhysicalParams};
use crate::TrajectoryBVP::trajectory_error::TrajectoryError;
use log::{error, info};
use serde::{Deserialize, Serialize};

/// Flight in time, u = [x, y, v, θ]
#[derive(Debug, Clone, Copy)]
pub struct FlightIVP {
    pub params: PhysicalParams,
}

impl OdeSystem<4> for FlightIVP {
    fn rhs(&self, _t: f64, u: &[f64; 4], dudt: &mut [f64; 4]) {
        let [_x, _y, v, theta] = *u;
        let p = &self.params;
        let (sin_t, cos_t) = theta.sin_cos();
        let tangential = p.net_acceleration(v);
        dudt[0] = v * cos_t;
        dudt[1] = v * sin_t;
        dudt[2] = tangential - p.g * sin_t;
        dudt[3] = (tangential * (-sin_t) - p.g * cos_t) / (v + EPS_VELOCITY);
    }
}

/// Altitude, held at 1 before `min_time`
#[derive(Debug, Clone, Copy)]
pub struct GroundImpact {
    pub min_time: f64,
}

impl EventFunction<4> for GroundImpact {
    fn eval(&self, t: f64, u: &[f64; 4]) -> f64 {
        if t < self.min_time { 1.0 } else { u[1] }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub v_launch: f64,
    pub launch_angle_deg: f64,
    pub t_max: f64,
    pub max_step: f64,
    pub rtol: f64,
    pub atol: f64,
    pub min_event_time: f64,
    pub h0: f64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            v_launch: 100.0,
            launch_angle_deg: 80.0,
            t_max: 100.0,
            max_step: 0.1,
            rtol: 1e-3,
            atol: 1e-6,
            min_event_time: 1e-3,
            h0: 1e-3,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<(), TrajectoryError> {
        let named = [
            ("v_launch", self.v_launch),
            ("launch_angle_deg", self.launch_angle_deg),
            ("t_max", self.t_max),
            ("max_step", self.max_step),
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("min_event_time", self.min_event_time),
            ("h0", self.h0),
        ];
        if let Some((name, value)) = named.iter().find(|(_, value)| !value.is_finite()) {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "seed setting {} must be finite, got {}",
                name, value
            )));
        }
        if self.v_launch <= 0.0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "launch speed must be positive".to_string(),
            ));
        }
        if self.launch_angle_deg <= 0.0 || self.launch_angle_deg > 90.0 {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "launch angle must lie in (0, 90] degrees, got {}",
                self.launch_angle_deg
            )));
        }
        if self.t_max <= 0.0 || self.max_step <= 0.0 || self.h0 <= 0.0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "t_max, max_step and h0 must be positive".to_string(),
            ));
        }
        if self.atol <= 0.0 || self.rtol < 0.0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "atol must be positive and rtol non-negative".to_string(),
            ));
        }
        if self.min_event_time < 0.0 || self.min_event_time >= self.t_max {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "min_event_time must lie in [0, t_max), got {}",
                self.min_event_time
            )));
        }
        Ok(())
    }

    pub fn launch_angle(&self) -> f64 {
        self.launch_angle_deg.to_radians()
    }
}

/// Headline numbers of one seed flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightSummary {
    pub flight_time: f64,
    pub range: f64,
    pub apex_altitude: f64,
    pub apex_x: f64,
    pub max_speed: f64,
}

/// Trajectory sampled at the accepted steps, ending on the impact
#[derive(Debug, Clone)]
pub struct SeedSolution {
    pub t: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub v: Vec<f64>,
    pub theta: Vec<f64>,
    pub impact_time: f64,
    pub impact_range: f64,
    pub stats: Stats,
    /// terminal events recorded, one for a completed seed
    pub n_events: usize,
}

impl SeedSolution {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn flight_summary(&self) -> FlightSummary {
        let (apex_index, apex_altitude) = self
            .y
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, y)| {
                if y > best.1 { (i, y) } else { best }
            });
        FlightSummary {
            flight_time: self.impact_time,
            range: self.impact_range,
            apex_altitude,
            apex_x: self.x.get(apex_index).copied().unwrap_or(0.0),
            max_speed: self.v.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    pub fn pretty_print(&self) {
        use prettytable::{Table, row};

        let summary = self.flight_summary();
        let mut table = Table::new();
        table.add_row(row!["Quantity", "Value", "Units"]);
        table.add_row(row!["Flight time", format!("{:.4}", summary.flight_time), "s"]);
        table.add_row(row!["Range", format!("{:.3}", summary.range), "m"]);
        table.add_row(row!["Apex altitude", format!("{:.3}", summary.apex_altitude), "m"]);
        table.add_row(row!["Apex position", format!("{:.3}", summary.apex_x), "m"]);
        table.add_row(row!["Max speed", format!("{:.3}", summary.max_speed), "m/s"]);
        table.add_row(row!["Samples", self.len(), ""]);
        table.add_row(row!["Accepted steps", self.stats.accepted_steps, ""]);
        table.add_row(row!["Rejected steps", self.stats.rejected_steps, ""]);
        table.add_row(row!["RHS evaluations", self.stats.fn_evals, ""]);
        table.printstd();
    }
}

pub struct SeedGenerator {
    pub params: PhysicalParams,
    pub config: SeedConfig,
}

impl SeedGenerator {
    pub fn new(params: PhysicalParams, config: SeedConfig) -> Self {
        Self { params, config }
    }

    pub fn initial_state(&self) -> [f64; 4] {
        [0.0, 0.0, self.config.v_launch, self.config.launch_angle()]
    }

    /// Flies the body until the ground impact
    pub fn generate(&self) -> Result<SeedSolution, TrajectoryError> {
        self.params.validate()?;
        self.config.validate()?;
        let cfg = &self.config;
        info!(
            "seed flight: v0 = {} m/s, angle = {} deg, horizon {} s",
            cfg.v_launch, cfg.launch_angle_deg, cfg.t_max
        );

        let system = FlightIVP {
            params: self.params,
        };
        let event = GroundImpact {
            min_time: cfg.min_event_time,
        };
        let event_config = EventConfig {
            direction: EventDirection::Falling,
            ..EventConfig::default()
        };
        let mut integrator = DormandPrince::new(cfg.rtol, cfg.atol);
        integrator.set_step_limits(1e-12, cfg.max_step);
        let outcome = integrator.integrate_to_event(
            &system,
            &event,
            &event_config,
            0.0,
            &self.initial_state(),
            cfg.t_max,
            cfg.h0,
        )?;

        let impact = match outcome.termination {
            Termination::Event(impact) => impact,
            Termination::Completed { u, .. } => {
                error!(
                    "no ground impact within {} s, last altitude {:.3} m",
                    cfg.t_max, u[1]
                );
                return Err(TrajectoryError::SeedTermination { t_max: cfg.t_max });
            }
        };

        let n = outcome.samples.len();
        let mut solution = SeedSolution {
            t: Vec::with_capacity(n),
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            v: Vec::with_capacity(n),
            theta: Vec::with_capacity(n),
            impact_time: impact.t,
            impact_range: impact.u[0],
            stats: integrator.stats,
            n_events: 1,
        };
        for (t, u) in outcome.samples {
            solution.t.push(t);
            solution.x.push(u[0]);
            solution.y.push(u[1]);
            solution.v.push(u[2]);
            solution.theta.push(u[3]);
        }
        info!(
            "ground impact at t = {:.4} s, x = {:.3} m after {} accepted steps",
            solution.impact_time, solution.impact_range, solution.stats.accepted_steps
        );
        Ok(solution)
    }
}
