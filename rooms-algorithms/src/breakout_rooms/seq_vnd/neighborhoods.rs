use super::{
    feasibility::{can_move, can_move2, can_swap},
    partition::{Move, Occupancy, Partition},
};
use rooms_challenges::breakout_rooms::Challenge;

/// Move types in the order the descent visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    Move1,
    Swap,
    Move2,
}

impl Neighborhood {
    /// `None` once the last neighborhood is exhausted.
    pub fn next(self) -> Option<Neighborhood> {
        match self {
            Neighborhood::Move1 => Some(Neighborhood::Swap),
            Neighborhood::Swap => Some(Neighborhood::Move2),
            Neighborhood::Move2 => None,
        }
    }

    pub fn generate(
        self,
        challenge: &Challenge,
        partition: &Partition,
        occupancy: &Occupancy,
        prune_symmetric: bool,
    ) -> Vec<Move> {
        match self {
            Neighborhood::Move1 => move_neighborhood(challenge, partition, occupancy),
            Neighborhood::Swap => swap_neighborhood(challenge, partition, occupancy, prune_symmetric),
            Neighborhood::Move2 => move2_neighborhood(challenge, partition, occupancy, prune_symmetric),
        }
    }
}

// Unordered pairs when pruning, ordered pairs otherwise. Either way the first
// occurrence of each pair comes in the same position.
fn student_pairs(
    students: &[usize],
    prune_symmetric: bool,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    students.iter().enumerate().flat_map(move |(i, &a)| {
        students
            .iter()
            .enumerate()
            .filter(move |&(j, _)| if prune_symmetric { j > i } else { j != i })
            .map(move |(_, &b)| (a, b))
    })
}

pub fn move_neighborhood(
    challenge: &Challenge,
    partition: &Partition,
    occupancy: &Occupancy,
) -> Vec<Move> {
    let k = partition.num_rooms();
    let mut moves = Vec::new();
    for student in challenge.nodes() {
        for room in occupancy.room_ids() {
            if can_move(challenge, partition, occupancy, k, student, room) {
                moves.push(Move::Relocate { student, room });
            }
        }
    }
    moves
}

pub fn swap_neighborhood(
    challenge: &Challenge,
    partition: &Partition,
    occupancy: &Occupancy,
    prune_symmetric: bool,
) -> Vec<Move> {
    let k = partition.num_rooms();
    let students: Vec<usize> = challenge.nodes().collect();
    student_pairs(&students, prune_symmetric)
        .filter(|&(student1, student2)| {
            can_swap(challenge, partition, occupancy, k, student1, student2)
        })
        .map(|(student1, student2)| Move::Swap { student1, student2 })
        .collect()
}

/// Only students alone in their room can take part, so pairs are drawn from
/// those; the enumeration order matches a scan over all students.
pub fn move2_neighborhood(
    challenge: &Challenge,
    partition: &Partition,
    occupancy: &Occupancy,
    prune_symmetric: bool,
) -> Vec<Move> {
    let k = partition.num_rooms();
    let alone: Vec<usize> = challenge
        .nodes()
        .filter(|&s| occupancy.size(partition.room_of(s)) == 1)
        .collect();
    let rooms: Vec<usize> = occupancy.room_ids().collect();

    let mut moves = Vec::new();
    for (student1, student2) in student_pairs(&alone, prune_symmetric) {
        for &room1 in &rooms {
            for &room2 in &rooms {
                if can_move2(
                    challenge,
                    partition,
                    occupancy,
                    k,
                    (student1, room1),
                    (student2, room2),
                ) {
                    moves.push(Move::Relocate2 {
                        student1,
                        room1,
                        student2,
                        room2,
                    });
                }
            }
        }
    }
    moves
}
