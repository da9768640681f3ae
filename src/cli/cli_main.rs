use super::cli_examples::examples_menu;
use super::cli_trajectory::trajectory_menu;
use std::io::{self, Write};

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let choice = get_user_input();
        if choice.is_empty() {
            // stdin closed
            break;
        }

        match choice.trim() {
            "1" => trajectory_menu(),
            "2" => examples_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options (1, 2, 0)

Cyan (\x1b[36m) - "Enter your choice:" prompt

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() {
    println!(
        "\x1b[34m\n Welcome to TrajBVP: steady trajectories of thrust and drag propelled bodies\n \x1b[0m"
    );
    println!("\x1b[33m1. Trajectory BVP Problems\x1b[0m");
    println!("\x1b[33m2. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    io::stdout().flush().ok();
}

/// One line from stdin, empty on a read failure
pub fn get_user_input() -> String {
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        input.clear();
    }
    input
}
