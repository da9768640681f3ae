#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod TrajectoryBVP;
#[allow(non_snake_case)]
pub mod TrajectoryIVP;
pub mod cli;
