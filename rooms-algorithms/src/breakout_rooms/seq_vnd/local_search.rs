use super::partition::{Move, Partition};
use rooms_challenges::breakout_rooms::Challenge;

#[derive(Debug, Clone)]
pub struct NeighborhoodBest {
    /// Input partition with the best move applied, or unchanged if none beat
    /// the baseline.
    pub partition: Partition,
    /// Total happiness of `partition` when a move was applied, else the baseline.
    pub happiness: f64,
    pub applied: Option<Move>,
}

/// Best-improvement scan over `candidates`.
///
/// Each candidate is applied to a scratch assignment, scored with the full
/// total happiness, and reverted. Only a strictly higher score replaces the
/// running best, so the first candidate wins ties.
pub fn local_search(
    challenge: &Challenge,
    partition: &Partition,
    candidates: &[Move],
    baseline: f64,
) -> NeighborhoodBest {
    let mut scratch = partition.rooms().to_vec();
    let mut best_happiness = baseline;
    let mut best_move = None;

    for candidate in candidates {
        let undo = candidate.apply(&mut scratch);
        let happiness = challenge.total_happiness(&scratch);
        if happiness > best_happiness {
            best_happiness = happiness;
            best_move = Some(*candidate);
        }
        undo.revert(&mut scratch);
    }

    match best_move {
        Some(mv) => {
            mv.apply(&mut scratch);
            NeighborhoodBest {
                partition: Partition::new(scratch),
                happiness: best_happiness,
                applied: Some(mv),
            }
        }
        None => NeighborhoodBest {
            partition: partition.clone(),
            happiness: best_happiness,
            applied: None,
        },
    }
}
