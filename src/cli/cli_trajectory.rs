use super::cli_main::get_user_input;
use crate::TrajectoryBVP::trajectory_error::TrajectoryError;
use crate::TrajectoryBVP::trajectory_task::TrajectoryTask;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMPLATE_FILE: &str = "trajectory_task.json";

pub fn trajectory_menu() {
    loop {
        println!("\n=== Trajectory BVP Problems ===");
        println!("\x1b[33m1. Solve from file\x1b[0m");
        println!("\x1b[33m2. Auto-discover task files\x1b[0m");
        println!("\x1b[33m3. Generate template\x1b[0m");
        println!("\x1b[33m4. Solve production flight\x1b[0m");
        println!("\x1b[33m5. Seed flight only\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        print!("\x1b[36mEnter your choice: \x1b[0m");
        io::stdout().flush().ok();

        let choice = get_user_input();
        if choice.is_empty() {
            // stdin closed
            break;
        }
        let result = match choice.trim() {
            "1" => solve_from_file(),
            "2" => auto_solve_tasks(),
            "3" => TrajectoryTask::production()
                .save_to_file(TEMPLATE_FILE)
                .map(|_| println!("Template written to {}", TEMPLATE_FILE)),
            "4" => solve_task(&TrajectoryTask::production(), false),
            "5" => seed_only(),
            "0" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("\x1b[31mError: {}\x1b[0m", e);
        }
    }
}

fn solve_from_file() -> Result<(), TrajectoryError> {
    print!("\x1b[36mEnter file path: \x1b[0m");
    io::stdout().flush().ok();
    let file_path = get_user_input();
    let path = PathBuf::from(file_path.trim());
    if !path.exists() {
        println!("File not found: {}", file_path.trim());
        return Ok(());
    }
    solve_from_file_dialog(&path)
}

/// Solves every `trajectory*.json` file in the working directory
fn auto_solve_tasks() -> Result<(), TrajectoryError> {
    let current_dir = std::env::current_dir()?;
    println!("Searching for task files in: {:?}", current_dir);
    let mut found_files = false;
    for entry in std::fs::read_dir(&current_dir)?.flatten() {
        let path = entry.path();
        let is_task = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| name.starts_with("trajectory") && name.ends_with(".json"));
        if is_task && path.is_file() {
            println!("Found task file: {:?}", path);
            found_files = true;
            if let Err(e) = solve_from_file_dialog(&path) {
                println!("\x1b[31mError in {:?}: {}\x1b[0m", path, e);
            }
        }
    }
    if !found_files {
        println!("No files matching 'trajectory*.json' found in current directory.");
    }
    Ok(())
}

pub fn solve_from_file_dialog(path: &Path) -> Result<(), TrajectoryError> {
    let task = TrajectoryTask::from_file(path)?;
    task.check_task()?;
    task.pretty_print_task();
    solve_task(&task, true)
}

fn solve_task(task: &TrajectoryTask, ask: bool) -> Result<(), TrajectoryError> {
    if ask {
        print!("\x1b[36mStart calculation? (y/n): \x1b[0m");
        io::stdout().flush().ok();
        let choice = get_user_input().trim().to_lowercase();
        if choice != "y" && choice != "yes" {
            println!("Calculation cancelled. Returning to menu.");
            return Ok(());
        }
    }
    let solution = task.solve()?;
    solution.pretty_print();

    print!("\x1b[36mSave solution to CSV? Enter file name or leave empty: \x1b[0m");
    io::stdout().flush().ok();
    let name = get_user_input();
    let name = name.trim();
    if !name.is_empty() {
        solution.save_csv(name)?;
        println!("Solution saved to {}", name);
    }
    Ok(())
}

fn seed_only() -> Result<(), TrajectoryError> {
    let seed = TrajectoryTask::production().generate_seed()?;
    seed.pretty_print();
    Ok(())
}
