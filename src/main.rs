#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod TrajectoryBVP;
#[allow(non_snake_case)]
pub mod TrajectoryIVP;
pub mod cli;

use TrajectoryBVP::trajectory_task::TrajectoryTask;
use cli::cli_main::run_interactive_menu;
use log::{LevelFilter, error};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// `TrajBVP <task.json>` solves one task file, without arguments the interactive menu starts
pub fn main() {
    if TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .is_err()
    {
        eprintln!("logger already initialised");
    }

    match std::env::args().nth(1) {
        Some(path) => {
            let result = TrajectoryTask::from_file(&path).and_then(|task| {
                task.pretty_print_task();
                task.solve()
            });
            match result {
                Ok(solution) => solution.pretty_print(),
                Err(e) => {
                    error!("{}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        None => run_interactive_menu(),
    }
}
