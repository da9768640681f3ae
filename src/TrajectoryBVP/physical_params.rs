//! # Physical Parameters
//!
//! Immutable parameter set shared by the seed generator and the residual model.
//!
//! | Symbol | Field | Description | Units |
//! |--------|-------|-------------|-------|
//! | `ρ` | `rho` | fluid density | kg/m³ |
//! | `Cd` | `cd` | drag coefficient | - |
//! | `A` | `area` | cross-sectional area | m² |
//! | `T` | `thrust` | thrust force | N |
//! | `m` | `mass` | mass of the body | kg |
//! | `g` | `g` | gravitational acceleration | m/s² |
//! | `L` | `length` | horizontal domain length | m |
//!
//! Drag is quadratic with constant density: `D = ½·ρ·Cd·A·v²`.

use super::trajectory_error::TrajectoryError;
use serde::{Deserialize, Serialize};

/// Regularisation added to every `1/v` term of both the IVP and the BVP equations
pub const EPS_VELOCITY: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalParams {
    pub rho: f64,
    pub cd: f64,
    pub area: f64,
    pub thrust: f64,
    pub mass: f64,
    pub g: f64,
    pub length: f64,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            rho: 1.0,
            cd: 0.3,
            area: 1.0e-2,
            thrust: 1e5,
            mass: 100.0,
            g: 9.81,
            length: 1000.0,
        }
    }
}

impl PhysicalParams {
    pub fn new(rho: f64, cd: f64, area: f64, thrust: f64, mass: f64, g: f64, length: f64) -> Self {
        Self {
            rho,
            cd,
            area,
            thrust,
            mass,
            g,
            length,
        }
    }

    /// D = ½·ρ·Cd·A·v²
    pub fn drag(&self, v: f64) -> f64 {
        0.5 * self.rho * self.cd * self.area * v * v
    }

    /// Net tangential acceleration from thrust and drag, (T - D)/m
    pub fn net_acceleration(&self, v: f64) -> f64 {
        (self.thrust - self.drag(v)) / self.mass
    }

    /// Speed at which drag balances thrust (infinite when there is no drag)
    pub fn terminal_speed(&self) -> f64 {
        let k = 0.5 * self.rho * self.cd * self.area;
        if k > 0.0 {
            (self.thrust / k).sqrt()
        } else {
            f64::INFINITY
        }
    }

    pub fn validate(&self) -> Result<(), TrajectoryError> {
        let named = [
            ("rho", self.rho),
            ("cd", self.cd),
            ("area", self.area),
            ("thrust", self.thrust),
            ("mass", self.mass),
            ("g", self.g),
            ("length", self.length),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(TrajectoryError::InvalidConfiguration(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if self.mass <= 0.0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "mass must be positive".to_string(),
            ));
        }
        if self.rho <= 0.0 || self.area <= 0.0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "rho and area must be positive".to_string(),
            ));
        }
        if self.length <= 0.0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "domain length must be positive".to_string(),
            ));
        }
        if self.cd < 0.0 || self.thrust < 0.0 || self.g < 0.0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "cd, thrust and g must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pretty_print(&self) {
        use prettytable::{Table, row};

        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        table.add_row(row!["Density (rho)", format!("{:.4}", self.rho), "kg/m3"]);
        table.add_row(row!["Drag coefficient (Cd)", format!("{:.4}", self.cd), "-"]);
        table.add_row(row!["Area (A)", format!("{:.3e}", self.area), "m2"]);
        table.add_row(row!["Thrust (T)", format!("{:.3e}", self.thrust), "N"]);
        table.add_row(row!["Mass (m)", format!("{:.3}", self.mass), "kg"]);
        table.add_row(row!["Gravity (g)", format!("{:.4}", self.g), "m/s2"]);
        table.add_row(row!["Domain length (L)", format!("{:.3}", self.length), "m"]);
        table.add_row(row![
            "Terminal speed (T = D)",
            format!("{:.3}", self.terminal_speed()),
            "m/s"
        ]);
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_matches_reference_body() {
        let p = PhysicalParams::default();
        assert_eq!(p.rho, 1.0);
        assert_eq!(p.cd, 0.3);
        assert_eq!(p.area, 1e-2);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_drag_and_terminal_speed() {
        let p = PhysicalParams::default();
        // 0.5 * 1.0 * 0.3 * 0.01 * 100^2
        assert_relative_eq!(p.drag(100.0), 15.0, epsilon = 1e-12);
        let vt = p.terminal_speed();
        assert_relative_eq!(p.drag(vt), p.thrust, max_relative = 1e-12);
        assert_relative_eq!(p.net_acceleration(vt), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut p = PhysicalParams::default();
        p.mass = 0.0;
        assert!(matches!(
            p.validate(),
            Err(TrajectoryError::InvalidConfiguration(_))
        ));
        let mut p = PhysicalParams::default();
        p.thrust = f64::NAN;
        assert!(p.validate().is_err());
        let mut p = PhysicalParams::default();
        p.length = -1.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let p: PhysicalParams = serde_json::from_str(r#"{"thrust": 2.0e5, "length": 5000.0}"#)
            .unwrap();
        assert_eq!(p.thrust, 2.0e5);
        assert_eq!(p.length, 5000.0);
        assert_eq!(p.mass, 100.0);
    }
}
