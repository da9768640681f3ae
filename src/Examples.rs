pub mod trajectory_examples;
