//! # Boundary Conditions
//!
//! Declarative description of what happens at both ends of the domain, per variable.
//!
//! | Condition | Task file | Effect on boundary cells |
//! |-----------|-----------|--------------------------|
//! | `Dirichlet(value)` | `{"dirichlet": 0.0}` | pinned to `value`, never moved by the relaxation |
//! | `Outflow` | `"outflow"` | copy of the adjacent interior cell (zero gradient) |
//!
//! The map is handed unchanged to the domain, which resolves the boundary cells before every
//! residual evaluation. The residual model itself only sees resolved neighbour values.
//!
//! ```json
//! {
//!   "y": { "left": {"dirichlet": 0.0}, "right": {"dirichlet": 0.0} },
//!   "v": { "left": {"dirichlet": 100.0}, "right": "outflow" }
//! }
//! ```

use super::trajectory_error::TrajectoryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryCondition {
    Dirichlet(f64),
    Outflow,
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::Dirichlet(value) => write!(f, "Dirichlet({})", value),
            BoundaryCondition::Outflow => write!(f, "Outflow"),
        }
    }
}

/// Left and right condition of one variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPair {
    pub left: BoundaryCondition,
    pub right: BoundaryCondition,
}

impl BoundaryPair {
    pub fn new(left: BoundaryCondition, right: BoundaryCondition) -> Self {
        Self { left, right }
    }
}

/// Conditions keyed by variable name ("y", "v")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryConditions {
    pub conditions: HashMap<String, BoundaryPair>,
}

impl BoundaryConditions {
    pub fn new() -> Self {
        Self {
            conditions: HashMap::new(),
        }
    }

    /// Builder-style insertion
    pub fn with(
        mut self,
        variable: &str,
        left: BoundaryCondition,
        right: BoundaryCondition,
    ) -> Self {
        self.set(variable, left, right);
        self
    }

    pub fn set(&mut self, variable: &str, left: BoundaryCondition, right: BoundaryCondition) {
        self.conditions
            .insert(variable.to_string(), BoundaryPair::new(left, right));
    }

    pub fn get(&self, variable: &str) -> Option<&BoundaryPair> {
        self.conditions.get(variable)
    }

    /// y pinned to the ground at both ends, speed fixed at launch and free at impact
    pub fn launch_to_impact(v_launch: f64) -> Self {
        Self::new()
            .with(
                "y",
                BoundaryCondition::Dirichlet(0.0),
                BoundaryCondition::Dirichlet(0.0),
            )
            .with(
                "v",
                BoundaryCondition::Dirichlet(v_launch),
                BoundaryCondition::Outflow,
            )
    }

    /// Every variable must have a pair and every Dirichlet value must be finite
    pub fn validate(&self, variables: &[String]) -> Result<(), TrajectoryError> {
        for variable in variables {
            if !self.conditions.contains_key(variable) {
                return Err(TrajectoryError::MissingData(format!(
                    "no boundary conditions for variable '{}'",
                    variable
                )));
            }
        }
        for (variable, pair) in &self.conditions {
            if !variables.contains(variable) {
                return Err(TrajectoryError::InvalidConfiguration(format!(
                    "boundary conditions given for unknown variable '{}'",
                    variable
                )));
            }
            for condition in [pair.left, pair.right] {
                if let BoundaryCondition::Dirichlet(value) = condition {
                    if !value.is_finite() {
                        return Err(TrajectoryError::InvalidConfiguration(format!(
                            "Dirichlet value for '{}' is not finite",
                            variable
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn pretty_print(&self) {
        use prettytable::{Table, row};

        let mut keys: Vec<&String> = self.conditions.keys().collect();
        keys.sort();
        let mut table = Table::new();
        table.add_row(row!["Variable", "Left", "Right"]);
        for key in keys {
            let pair = &self.conditions[key];
            table.add_row(row![key, pair.left.to_string(), pair.right.to_string()]);
        }
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> Vec<String> {
        vec!["y".to_string(), "v".to_string()]
    }

    #[test]
    fn test_parse_tagged_conditions() {
        let text = r#"{
            "y": { "left": {"dirichlet": 0.0}, "right": {"dirichlet": 0.0} },
            "v": { "left": {"dirichlet": 100.0}, "right": "outflow" }
        }"#;
        let bcs: BoundaryConditions = serde_json::from_str(text).unwrap();
        assert_eq!(bcs, BoundaryConditions::launch_to_impact(100.0));
        let v = bcs.get("v").unwrap();
        assert_eq!(v.left, BoundaryCondition::Dirichlet(100.0));
        assert_eq!(v.right, BoundaryCondition::Outflow);
    }

    #[test]
    fn test_unknown_condition_is_rejected_by_parser() {
        let text = r#"{ "y": { "left": "periodic", "right": "outflow" } }"#;
        assert!(serde_json::from_str::<BoundaryConditions>(text).is_err());
    }

    #[test]
    fn test_validate_requires_every_variable() {
        let bcs = BoundaryConditions::new().with(
            "y",
            BoundaryCondition::Dirichlet(0.0),
            BoundaryCondition::Outflow,
        );
        assert!(matches!(
            bcs.validate(&vars()),
            Err(TrajectoryError::MissingData(_))
        ));
        assert!(BoundaryConditions::launch_to_impact(50.0).validate(&vars()).is_ok());
    }

    #[test]
    fn test_validate_rejects_nan_and_strangers() {
        let bcs = BoundaryConditions::launch_to_impact(f64::NAN);
        assert!(bcs.validate(&vars()).is_err());
        let bcs = BoundaryConditions::launch_to_impact(1.0).with(
            "theta",
            BoundaryCondition::Outflow,
            BoundaryCondition::Outflow,
        );
        assert!(matches!(
            bcs.validate(&vars()),
            Err(TrajectoryError::InvalidConfiguration(_))
        ));
    }
}
