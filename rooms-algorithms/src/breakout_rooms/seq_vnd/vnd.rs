use super::{
    config::{Baseline, Config},
    local_search::local_search,
    neighborhoods::Neighborhood,
    partition::{Move, Occupancy, Partition},
};
use rooms_challenges::breakout_rooms::{Challenge, Solution};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// An accepted transition of the descent.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub neighborhood: Neighborhood,
    pub applied: Move,
    pub happiness: f64,
    pub num_rooms: usize,
}

#[derive(Debug, Clone)]
pub struct Descent {
    pub partition: Partition,
    pub happiness: f64,
    pub steps: Vec<Step>,
    /// Neighborhoods generated and searched, accepted or not.
    pub evaluations: usize,
    /// True when `max_iterations` or `time_limit_ms` ended the search before
    /// a local optimum over all three neighborhoods was reached.
    pub stopped_early: bool,
}

impl Descent {
    pub fn to_solution(&self) -> Solution {
        self.partition.to_solution()
    }
}

/// Runs the descent from `partition` until no neighborhood improves it.
///
/// Neighborhoods are tried in order Move1, Swap, Move2. An improvement is
/// accepted only if it beats the current total happiness, after which the
/// order restarts at Move1.
pub fn seq_vnd(challenge: &Challenge, partition: Partition, config: &Config) -> Descent {
    let start = Instant::now();
    let time_limit = Duration::from_millis(config.time_limit_ms);

    let mut partition = partition;
    let mut current_happiness = challenge.total_happiness(partition.rooms());
    let mut steps = Vec::new();
    let mut evaluations = 0;
    let mut stopped_early = false;
    let mut state = Some(Neighborhood::Move1);

    while let Some(neighborhood) = state {
        if config.max_iterations > 0 && evaluations >= config.max_iterations {
            warn!(evaluations, "descent stopped by iteration limit");
            stopped_early = true;
            break;
        }
        if config.time_limit_ms > 0 && start.elapsed() >= time_limit {
            warn!(evaluations, "descent stopped by time limit");
            stopped_early = true;
            break;
        }

        let occupancy = Occupancy::new(&partition);
        let candidates =
            neighborhood.generate(challenge, &partition, &occupancy, config.prune_symmetric);
        let baseline = match config.baseline {
            Baseline::Current => current_happiness,
            Baseline::Zero => 0.0,
        };
        let best = local_search(challenge, &partition, &candidates, baseline);
        evaluations += 1;

        match best.applied {
            Some(applied) if best.happiness > current_happiness => {
                partition = best.partition;
                current_happiness = challenge.total_happiness(partition.rooms());
                debug!(
                    ?neighborhood,
                    ?applied,
                    candidates = candidates.len(),
                    happiness = current_happiness,
                    num_rooms = partition.num_rooms(),
                    "accepted move"
                );
                steps.push(Step {
                    neighborhood,
                    applied,
                    happiness: current_happiness,
                    num_rooms: partition.num_rooms(),
                });
                state = Some(Neighborhood::Move1);
            }
            _ => state = neighborhood.next(),
        }
    }

    info!(
        happiness = current_happiness,
        num_rooms = partition.num_rooms(),
        accepted = steps.len(),
        evaluations,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "descent finished"
    );

    Descent {
        partition,
        happiness: current_happiness,
        steps,
        evaluations,
        stopped_early,
    }
}
