//! Runnable walk-throughs of the trajectory workflow.

use crate::TrajectoryBVP::trajectory_error::TrajectoryError;
use crate::TrajectoryBVP::trajectory_task::TrajectoryTask;
use crate::TrajectoryIVP::seed_generator::{SeedConfig, SeedGenerator};
use log::error;

pub fn trajectory_examples(task: usize) {
    let result = match task {
        0 => seed_flight(),
        1 => production_trajectory(),
        2 => task_from_file("tasks/production_task.json"),
        3 => launch_angle_sweep(),
        4 => fourth_order_scheme(),
        _ => {
            println!("no example with number {}", task);
            Ok(())
        }
    };
    if let Err(e) = result {
        error!("example {} failed: {}", task, e);
    }
}

/// IVP flight only: launch at 80°, fly until the ground impact
fn seed_flight() -> Result<(), TrajectoryError> {
    let task = TrajectoryTask::production();
    task.params.pretty_print();
    let seed = task.generate_seed()?;
    seed.pretty_print();
    println!(
        "flight time {:.4} s, range {:.3} m",
        seed.impact_time, seed.impact_range
    );
    Ok(())
}

/// Seed, interpolated guess and relaxation over 80 cells
fn production_trajectory() -> Result<(), TrajectoryError> {
    let task = TrajectoryTask::production();
    task.pretty_print_task();
    let solution = task.solve()?;
    solution.report.pretty_print();
    solution.pretty_print();
    solution.save_csv("trajectory_solution.csv")?;
    solution.save_json("trajectory_solution.json")?;
    Ok(())
}

fn task_from_file(path: &str) -> Result<(), TrajectoryError> {
    let task = TrajectoryTask::from_file(path)?;
    task.check_task()?;
    task.pretty_print_task();
    let solution = task.solve()?;
    solution.pretty_print();
    Ok(())
}

fn launch_angle_sweep() -> Result<(), TrajectoryError> {
    use prettytable::{Table, row};

    let task = TrajectoryTask::production();
    let mut table = Table::new();
    table.add_row(row!["Angle, deg", "Flight time, s", "Range, m", "Apex, m"]);
    for angle in [10.0, 30.0, 45.0, 60.0, 80.0, 89.0] {
        let config = SeedConfig {
            launch_angle_deg: angle,
            ..task.seed.clone()
        };
        let summary = SeedGenerator::new(task.params, config)
            .generate()?
            .flight_summary();
        table.add_row(row![
            angle,
            format!("{:.3}", summary.flight_time),
            format!("{:.1}", summary.range),
            format!("{:.1}", summary.apex_altitude)
        ]);
    }
    table.printstd();
    Ok(())
}

/// Same flight on the 5-point stencil, which needs two boundary cells per side
fn fourth_order_scheme() -> Result<(), TrajectoryError> {
    let mut task = TrajectoryTask::production();
    task.solver.scheme = "central4".to_string();
    task.grid.n_left = 2;
    task.grid.n_right = 2;
    task.grid.n_interior = 78;
    let solution = task.solve()?;
    solution.pretty_print();
    Ok(())
}
