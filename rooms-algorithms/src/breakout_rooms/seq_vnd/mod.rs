//! Sequential Variable Neighborhood Descent for breakout room assignment.
//!
//! # Description
//! Students are first paired greedily by ascending stress, then the partition
//! is improved by best-improvement local search over three neighborhoods in
//! a fixed order: relocating one student, swapping two students, and
//! relocating two lone students at once. Any improvement restarts the order at
//! the first neighborhood; the search ends when none of the three improves.
//!
//! The per-room stress ceiling is `stress_budget / k` where `k` is the number
//! of rooms in use, so moves that empty a room loosen the ceiling for every
//! room at once.
//!
//! # Hyperparameters
//! See [`Config`]. An empty or missing map runs the unbounded descent.

mod config;
pub mod feasibility;
mod initial;
mod local_search;
pub mod neighborhoods;
mod partition;
mod vnd;

pub use config::{Baseline, Config};
pub use initial::create_initial_partition;
pub use local_search::{local_search, NeighborhoodBest};
pub use neighborhoods::Neighborhood;
pub use partition::{Move, Occupancy, Partition, Undo};
pub use vnd::{seq_vnd, Descent, Step};

use anyhow::Result;
use rooms_challenges::breakout_rooms::{Challenge, Solution};
use serde_json::{Map, Value};

pub fn solve_challenge(
    challenge: &Challenge,
    save_solution: &dyn Fn(&Solution) -> Result<()>,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<()> {
    let config = Config::initialize(hyperparameters);
    let descent = solve(challenge, &config);
    save_solution(&descent.to_solution())
}

pub fn solve(challenge: &Challenge, config: &Config) -> Descent {
    // The builder reports k = N; the descent recounts rooms from the assignment.
    let (rooms, _) = create_initial_partition(challenge);
    seq_vnd(challenge, Partition::new(rooms), config)
}
