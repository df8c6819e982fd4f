//! Stress feasibility of candidate moves.
//!
//! Every check works on copies of the affected rooms' occupants; the
//! partition itself is never touched. `k` is the number of rooms in use before
//! the move. A room count that would drop to zero makes the move infeasible.

use super::partition::{Occupancy, Partition};
use rooms_challenges::breakout_rooms::Challenge;

fn within_ceiling(challenge: &Challenge, students: &[usize], ceiling: f64) -> bool {
    challenge.room_stress(students) <= ceiling
}

fn joined(members: &[usize], extra: &[usize]) -> Vec<usize> {
    let mut room = Vec::with_capacity(members.len() + extra.len());
    room.extend_from_slice(members);
    room.extend_from_slice(extra);
    room
}

fn exchanged(members: &[usize], leaving: usize, arriving: usize) -> Vec<usize> {
    members
        .iter()
        .map(|&s| if s == leaving { arriving } else { s })
        .collect()
}

/// Can `student1` and `student2` trade rooms?
///
/// Students sharing a room, or both sitting alone, give an inert swap and are
/// rejected.
pub fn can_swap(
    challenge: &Challenge,
    partition: &Partition,
    occupancy: &Occupancy,
    k: usize,
    student1: usize,
    student2: usize,
) -> bool {
    let room1 = partition.room_of(student1);
    let room2 = partition.room_of(student2);
    if room1 == room2 {
        return false;
    }
    if occupancy.size(room1) == 1 && occupancy.size(room2) == 1 {
        return false;
    }
    let Some(ceiling) = challenge.stress_ceiling(k) else {
        return false;
    };

    within_ceiling(
        challenge,
        &exchanged(occupancy.members(room2), student2, student1),
        ceiling,
    ) && within_ceiling(
        challenge,
        &exchanged(occupancy.members(room1), student1, student2),
        ceiling,
    )
}

/// Can `student` join `room`?
///
/// If the student is alone, their room disappears and the destination is held
/// to the ceiling for `k - 1` rooms.
pub fn can_move(
    challenge: &Challenge,
    partition: &Partition,
    occupancy: &Occupancy,
    k: usize,
    student: usize,
    room: usize,
) -> bool {
    let origin = partition.room_of(student);
    if origin == room {
        return false;
    }
    let vacated = occupancy.size(origin) == 1;
    let rooms_after = if vacated { k.checked_sub(1) } else { Some(k) };
    let Some(ceiling) = rooms_after.and_then(|k| challenge.stress_ceiling(k)) else {
        return false;
    };

    within_ceiling(challenge, &joined(occupancy.members(room), &[student]), ceiling)
}

/// Can two lone students move to `room1` and `room2` at the same time?
///
/// Both origin rooms disappear, so destinations are held to the ceiling for
/// `k - 2` rooms. A destination equal to the other student's origin is
/// rejected: that room would stay in use and the looser ceiling would not
/// apply.
pub fn can_move2(
    challenge: &Challenge,
    partition: &Partition,
    occupancy: &Occupancy,
    k: usize,
    (student1, room1): (usize, usize),
    (student2, room2): (usize, usize),
) -> bool {
    if student1 == student2 {
        return false;
    }
    let origin1 = partition.room_of(student1);
    let origin2 = partition.room_of(student2);
    if origin1 == room1 || origin2 == room2 {
        return false;
    }
    if occupancy.size(origin1) != 1 || occupancy.size(origin2) != 1 {
        return false;
    }
    if room1 == origin2 || room2 == origin1 {
        return false;
    }
    let Some(ceiling) = k.checked_sub(2).and_then(|k| challenge.stress_ceiling(k)) else {
        return false;
    };

    if room1 == room2 {
        within_ceiling(
            challenge,
            &joined(occupancy.members(room1), &[student1, student2]),
            ceiling,
        )
    } else {
        within_ceiling(challenge, &joined(occupancy.members(room1), &[student1]), ceiling)
            && within_ceiling(challenge, &joined(occupancy.members(room2), &[student2]), ceiling)
    }
}
