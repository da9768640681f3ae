//! # Trajectory Initial Value Problem (IVP) Module
//!
//! Time integration of the powered flight, used to produce the seed trajectory for the
//! boundary value solver in [`crate::TrajectoryBVP`].
//!
//! ## Mathematical Model
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `x` | horizontal distance | m |
//! | `y` | altitude | m |
//! | `v` | speed along the path | m/s |
//! | `θ` | flight-path angle | rad |
//! | `D` | quadratic drag `½·ρ·Cd·A·v²` | N |
//!
//! ```text
//! dx/dt = v·cos θ
//! dy/dt = v·sin θ
//! dv/dt = (T - D)/m - g·sin θ
//! dθ/dt = [ (T - D)/m·(-sin θ) - g·cos θ ] / (v + ε)
//! ```
//!
//! The flight starts at `x = y = 0` with the launch speed and angle and stops at the first
//! downward crossing of `y = 0`.
//!
//! ## Numerical Solution
//!
//! - [`dormand_prince`]: embedded Runge-Kutta 5(4) pair with adaptive step size
//! - [`events`]: zero-crossing detection and Brent root location on the step interpolant
//! - [`seed_generator`]: the flight system, the impact event and the seed configuration
//! - [`seed_io`]: JSON persistence of the `x`, `y`, `v` samples
//!
//! ## Usage
//!
//! ```rust, ignore
//! use TrajBVP::TrajectoryBVP::physical_params::PhysicalParams;
//! use TrajBVP::TrajectoryIVP::seed_generator::{SeedConfig, SeedGenerator};
//!
//! let seed = SeedGenerator::new(PhysicalParams::default(), SeedConfig::default()).generate()?;
//! seed.pretty_print();
//! ```

pub mod dormand_prince;
pub mod events;
pub mod seed_generator;
mod seed_generator_tests;
pub mod seed_io;
