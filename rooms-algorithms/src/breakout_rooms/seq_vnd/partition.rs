use rooms_challenges::breakout_rooms::{count_rooms, occupancy, Solution};
use std::collections::BTreeMap;

/// Complete student to room assignment together with its room count `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    rooms: Vec<usize>,
    num_rooms: usize,
}

impl Partition {
    pub fn new(rooms: Vec<usize>) -> Self {
        let num_rooms = count_rooms(&rooms);
        Self { rooms, num_rooms }
    }

    pub fn rooms(&self) -> &[usize] {
        &self.rooms
    }

    pub fn room_of(&self, student: usize) -> usize {
        self.rooms[student]
    }

    pub fn num_rooms(&self) -> usize {
        self.num_rooms
    }

    pub fn to_solution(&self) -> Solution {
        Solution {
            rooms: self.rooms.clone(),
            num_rooms: self.num_rooms,
        }
    }
}

/// Room to students view of a [`Partition`].
///
/// Only valid for the partition it was built from; rebuild after every
/// accepted move.
#[derive(Debug, Clone)]
pub struct Occupancy {
    rooms: BTreeMap<usize, Vec<usize>>,
}

impl Occupancy {
    pub fn new(partition: &Partition) -> Self {
        Self {
            rooms: occupancy(partition.rooms()),
        }
    }

    pub fn members(&self, room: usize) -> &[usize] {
        self.rooms.get(&room).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn size(&self, room: usize) -> usize {
        self.members(room).len()
    }

    /// Rooms in use, ascending.
    pub fn room_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.rooms.keys().copied()
    }
}

/// A structural change to a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Relocate {
        student: usize,
        room: usize,
    },
    Swap {
        student1: usize,
        student2: usize,
    },
    Relocate2 {
        student1: usize,
        room1: usize,
        student2: usize,
        room2: usize,
    },
}

/// Previous rooms of the students a [`Move`] touched.
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    previous: [(usize, usize); 2],
    len: usize,
}

impl Undo {
    pub fn revert(self, rooms: &mut [usize]) {
        // Reverse order restores the original even if a student appears twice.
        for &(student, room) in self.previous[..self.len].iter().rev() {
            rooms[student] = room;
        }
    }
}

impl Move {
    pub fn apply(&self, rooms: &mut [usize]) -> Undo {
        match *self {
            Move::Relocate { student, room } => {
                let undo = Undo {
                    previous: [(student, rooms[student]), (0, 0)],
                    len: 1,
                };
                rooms[student] = room;
                undo
            }
            Move::Swap { student1, student2 } => {
                let undo = Undo {
                    previous: [(student1, rooms[student1]), (student2, rooms[student2])],
                    len: 2,
                };
                rooms.swap(student1, student2);
                undo
            }
            Move::Relocate2 {
                student1,
                room1,
                student2,
                room2,
            } => {
                let undo = Undo {
                    previous: [(student1, rooms[student1]), (student2, rooms[student2])],
                    len: 2,
                };
                rooms[student1] = room1;
                rooms[student2] = room2;
                undo
            }
        }
    }
}
