use super::cli_main::get_user_input;
use crate::Examples::trajectory_examples::trajectory_examples;
use std::io::{self, Write};

pub fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. Seed flight (IVP)");
        println!("2. Production trajectory (BVP)");
        println!("3. Task from tasks/production_task.json");
        println!("4. Launch angle sweep");
        println!("5. Fourth-order derivative scheme");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        io::stdout().flush().ok();

        let choice = get_user_input();
        if choice.is_empty() {
            // stdin closed
            break;
        }
        match choice.trim().parse::<usize>() {
            Ok(0) => break,
            Ok(n) if n <= 5 => trajectory_examples(n - 1),
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
