//! # Trajectory Task
//!
//! One JSON document describes a complete run: physical parameters, grid, boundary conditions,
//! seed flight and relaxation settings. [`TrajectoryTask::solve`] chains the whole workflow:
//!
//! ```text
//! seed flight (IVP) -> seed arrays (optionally cached on disk) -> interpolated initial guess
//!   -> domain interior cells -> Newton relaxation -> TrajectorySolution
//! ```
//!
//! ## Task file
//!
//! ```json
//! {
//!   "problem_name": "powered flight",
//!   "params": { "thrust": 1e5, "mass": 100.0, "g": 9.81, "length": 230910.1 },
//!   "grid": { "n_interior": 80, "n_left": 1, "n_right": 1 },
//!   "boundary_conditions": {
//!     "y": { "left": {"dirichlet": 0.0}, "right": {"dirichlet": 0.0} },
//!     "v": { "left": {"dirichlet": 100.0}, "right": "outflow" }
//!   },
//!   "seed": { "v_launch": 100.0, "launch_angle_deg": 80.0 },
//!   "solver": { "tolerance": 1e-6, "max_iterations": 50, "scheme": "central2" },
//!   "coverage": "clamp",
//!   "seed_file": "seed.json"
//! }
//! ```
//! Every section may be omitted, missing values fall back to the production setup.

use super::boundary_conditions::{BoundaryCondition, BoundaryConditions};
use super::derivative_schemes::{DerivativeScheme, Scheme};
use super::domain::Domain;
use super::initial_guess::{CoveragePolicy, GuessReport, InitialGuess};
use super::physical_params::PhysicalParams;
use super::relaxation::{NewtonRelaxation, RelaxationReport};
use super::residual_model::TrajectoryEquation;
use super::trajectory_error::TrajectoryError;
use crate::TrajectoryIVP::seed_generator::{SeedConfig, SeedGenerator, SeedSolution};
use crate::TrajectoryIVP::seed_io::SeedArrays;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Horizontal distance of the production flight, close to the range of the seed
pub const PRODUCTION_LENGTH: f64 = 230910.1;

/// Names of the unknowns, in storage order
pub const VARIABLES: [&str; 2] = ["y", "v"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub n_interior: usize,
    pub n_left: usize,
    pub n_right: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            n_interior: 80,
            n_left: 1,
            n_right: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub scheme: String,
    pub fd_step: f64,
    pub min_damping: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let newton = NewtonRelaxation::default();
        Self {
            tolerance: newton.tolerance,
            max_iterations: newton.max_iterations,
            scheme: "central2".to_string(),
            fd_step: newton.fd_step,
            min_damping: newton.min_damping,
        }
    }
}

impl SolverConfig {
    pub fn relaxation(&self) -> NewtonRelaxation {
        NewtonRelaxation {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            fd_step: self.fd_step,
            min_damping: self.min_damping,
        }
    }

    pub fn scheme(&self) -> Result<Scheme, TrajectoryError> {
        Scheme::from_name(&self.scheme)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryTask {
    pub problem_name: Option<String>,
    pub params: PhysicalParams,
    pub grid: GridConfig,
    pub boundary_conditions: BoundaryConditions,
    pub seed: SeedConfig,
    pub solver: SolverConfig,
    pub coverage: CoveragePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl Default for TrajectoryTask {
    fn default() -> Self {
        Self::production()
    }
}

impl TrajectoryTask {
    /// Thrust 1e5 N, 100 kg body launched at 100 m/s and 80°, 80 cells over 230910.1 m
    pub fn production() -> Self {
        let seed = SeedConfig::default();
        Self {
            problem_name: Some("powered flight".to_string()),
            params: PhysicalParams {
                length: PRODUCTION_LENGTH,
                ..PhysicalParams::default()
            },
            grid: GridConfig::default(),
            boundary_conditions: BoundaryConditions::launch_to_impact(seed.v_launch),
            seed,
            solver: SolverConfig::default(),
            coverage: CoveragePolicy::Clamp,
            seed_file: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let file = File::open(path.as_ref())?;
        let task: TrajectoryTask = serde_json::from_reader(BufReader::new(file))?;
        info!("task loaded from {}", path.as_ref().display());
        Ok(task)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajectoryError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("task saved to {}", path.as_ref().display());
        Ok(())
    }

    fn variables() -> Vec<String> {
        VARIABLES.iter().map(|s| s.to_string()).collect()
    }

    /// Validates every section and their mutual consistency
    pub fn check_task(&self) -> Result<(), TrajectoryError> {
        self.params.validate()?;
        self.seed.validate()?;
        self.solver.relaxation().validate()?;
        let scheme = self.solver.scheme()?;
        if self.grid.n_interior == 0 {
            return Err(TrajectoryError::InvalidConfiguration(
                "grid needs at least one interior cell".to_string(),
            ));
        }
        let hw = scheme.half_width();
        if self.grid.n_left < hw || self.grid.n_right < hw {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "scheme {} needs {} boundary cells per side, grid has {} and {}",
                scheme.name(),
                hw,
                self.grid.n_left,
                self.grid.n_right
            )));
        }
        self.boundary_conditions.validate(&Self::variables())?;
        if let Some(pair) = self.boundary_conditions.get("v") {
            match pair.left {
                BoundaryCondition::Dirichlet(v0) if v0 != self.seed.v_launch => warn!(
                    "launch speed of the boundary condition ({}) differs from the seed launch speed ({})",
                    v0, self.seed.v_launch
                ),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn generate_seed(&self) -> Result<SeedSolution, TrajectoryError> {
        SeedGenerator::new(self.params, self.seed.clone()).generate()
    }

    /// Reads the cached seed when `seed_file` exists, otherwise flies it and caches it
    pub fn load_or_generate_seed(&self) -> Result<SeedArrays, TrajectoryError> {
        if let Some(path) = &self.seed_file {
            if path.exists() {
                return SeedArrays::load_json(path);
            }
        }
        let arrays = SeedArrays::from(&self.generate_seed()?);
        if let Some(path) = &self.seed_file {
            arrays.save_json(path)?;
        }
        Ok(arrays)
    }

    pub fn build_domain(&self) -> Result<Domain, TrajectoryError> {
        Domain::from_size(
            self.grid.n_interior,
            self.grid.n_left,
            self.grid.n_right,
            &VARIABLES,
            0.0,
            self.params.length,
        )
    }

    /// Domain with the interpolated seed in its interior and resolved boundary cells
    pub fn initial_domain(
        &self,
        seed: &SeedArrays,
    ) -> Result<(Domain, GuessReport), TrajectoryError> {
        let guess = InitialGuess::from_seed(seed)?;
        guess.check_coverage(self.params.length, self.coverage)?;
        let mut domain = self.build_domain()?;
        let report = guess.initialize_domain(&mut domain)?;
        domain.apply_boundary_conditions(&self.boundary_conditions)?;
        Ok((domain, report))
    }

    /// Runs the complete workflow
    pub fn solve(&self) -> Result<TrajectorySolution, TrajectoryError> {
        self.check_task()?;
        info!(
            "solving {}",
            self.problem_name.as_deref().unwrap_or("trajectory task")
        );
        let seed = self.load_or_generate_seed()?;
        let (mut domain, guess) = self.initial_domain(&seed)?;
        let equation = TrajectoryEquation::new(self.params)?;
        let scheme = self.solver.scheme()?;
        let report = self.solver.relaxation().solve(
            &mut domain,
            &equation,
            &scheme,
            &self.boundary_conditions,
        )?;
        let solution = TrajectorySolution::from_domain(&domain, report, guess)?;
        info!(
            "trajectory solved: apex {:.3} m at x = {:.3} m",
            solution.max_altitude(),
            solution.x[solution.apex_index()]
        );
        Ok(solution)
    }

    pub fn pretty_print_task(&self) {
        use prettytable::{Table, row};

        println!("\n=== TRAJECTORY TASK SUMMARY ===");
        if let Some(name) = &self.problem_name {
            println!("Problem Name: {}", name);
        }
        println!("\nPhysical Parameters:");
        self.params.pretty_print();
        println!("\nBoundary Conditions:");
        self.boundary_conditions.pretty_print();

        let mut table = Table::new();
        table.add_row(row!["Setting", "Value"]);
        table.add_row(row!["Interior cells", self.grid.n_interior]);
        table.add_row(row![
            "Boundary cells (left/right)",
            format!("{}/{}", self.grid.n_left, self.grid.n_right)
        ]);
        table.add_row(row!["Launch speed, m/s", self.seed.v_launch]);
        table.add_row(row!["Launch angle, deg", self.seed.launch_angle_deg]);
        table.add_row(row!["Seed horizon, s", self.seed.t_max]);
        table.add_row(row!["Seed max step, s", self.seed.max_step]);
        table.add_row(row!["Derivative scheme", &self.solver.scheme]);
        table.add_row(row!["Tolerance", format!("{:e}", self.solver.tolerance)]);
        table.add_row(row!["Max iterations", self.solver.max_iterations]);
        table.add_row(row!["Coverage", format!("{:?}", self.coverage)]);
        if let Some(path) = &self.seed_file {
            table.add_row(row!["Seed file", path.display()]);
        }
        println!("\nNumerical Settings:");
        table.printstd();
    }
}

/// Converged trajectory on every cell of the grid
#[derive(Debug, Clone)]
pub struct TrajectorySolution {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub v: Vec<f64>,
    pub report: RelaxationReport,
    pub guess: GuessReport,
}

#[derive(Serialize)]
struct SolutionExport<'a> {
    x: &'a [f64],
    y: &'a [f64],
    v: &'a [f64],
    iterations: usize,
    final_residual: f64,
}

impl TrajectorySolution {
    pub fn from_domain(
        domain: &Domain,
        report: RelaxationReport,
        guess: GuessReport,
    ) -> Result<Self, TrajectoryError> {
        let y_var = domain.variable_index("y")?;
        let v_var = domain.variable_index("v")?;
        Ok(Self {
            x: domain.xs(),
            y: domain.column(y_var).to_vec(),
            v: domain.column(v_var).to_vec(),
            report,
            guess,
        })
    }

    pub fn apex_index(&self) -> usize {
        self.y
            .iter()
            .enumerate()
            .fold(0, |best, (i, y)| if *y > self.y[best] { i } else { best })
    }

    pub fn max_altitude(&self) -> f64 {
        self.y.get(self.apex_index()).copied().unwrap_or(f64::NAN)
    }

    pub fn min_speed(&self) -> f64 {
        self.v.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// `x,y,v` rows with a header line
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajectoryError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "x,y,v")?;
        for ((x, y), v) in self.x.iter().zip(&self.y).zip(&self.v) {
            writeln!(writer, "{},{},{}", x, y, v)?;
        }
        writer.flush()?;
        info!("solution saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajectoryError> {
        let export = SolutionExport {
            x: &self.x,
            y: &self.y,
            v: &self.v,
            iterations: self.report.iterations,
            final_residual: self.report.final_residual,
        };
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &export)?;
        writer.flush()?;
        info!("solution saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn pretty_print(&self) {
        use prettytable::{Table, row};

        let apex = self.apex_index();
        let mut summary = Table::new();
        summary.add_row(row!["Quantity", "Value", "Units"]);
        summary.add_row(row!["Range", format!("{:.3}", self.x.last().copied().unwrap_or(0.0)), "m"]);
        summary.add_row(row!["Apex altitude", format!("{:.3}", self.max_altitude()), "m"]);
        summary.add_row(row!["Apex position", format!("{:.3}", self.x[apex]), "m"]);
        summary.add_row(row!["Minimum speed", format!("{:.3}", self.min_speed()), "m/s"]);
        summary.add_row(row!["Newton iterations", self.report.iterations, ""]);
        summary.add_row(row![
            "Final residual",
            format!("{:.3e}", self.report.final_residual),
            ""
        ]);
        println!("\n=== TRAJECTORY SOLUTION ===");
        summary.printstd();

        let stride = (self.x.len() / 10).max(1);
        let mut profile = Table::new();
        profile.add_row(row!["x, m", "y, m", "v, m/s"]);
        for i in (0..self.x.len()).step_by(stride) {
            profile.add_row(row![
                format!("{:.1}", self.x[i]),
                format!("{:.3}", self.y[i]),
                format!("{:.3}", self.v[i])
            ]);
        }
        let last = self.x.len() - 1;
        if last % stride != 0 {
            profile.add_row(row![
                format!("{:.1}", self.x[last]),
                format!("{:.3}", self.y[last]),
                format!("{:.3}", self.v[last])
            ]);
        }
        profile.printstd();
    }
}
