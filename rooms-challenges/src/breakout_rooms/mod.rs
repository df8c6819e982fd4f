mod io;

use ahash::AHashSet;
use anyhow::{anyhow, Result};
use rand::{
    rngs::{SmallRng, StdRng},
    Rng, SeedableRng,
};
use serde::{Deserialize, Serialize};
use serde_json::{from_value, Map, Value};
use std::{collections::BTreeMap, ops::Range};

/// Happiness and stress are generated with this many decimal places.
pub const VALUE_PRECISION: u32 = 3;
pub const MAX_EDGE_VALUE: f64 = 100.0;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Difficulty {
    pub num_students: usize,
    pub stress_budget: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub happiness: f64,
    pub stress: f64,
}

/// Assignment of every student to a room.
///
/// `rooms[student]` is the room label of `student`. Labels are opaque and need
/// not be contiguous; `num_rooms` is the number of distinct labels in use.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Solution {
    pub rooms: Vec<usize>,
    pub num_rooms: usize,
}

impl Solution {
    pub fn new(rooms: Vec<usize>) -> Self {
        let num_rooms = count_rooms(&rooms);
        Self { rooms, num_rooms }
    }

    /// Room label to its students, both in ascending order.
    pub fn occupancy(&self) -> BTreeMap<usize, Vec<usize>> {
        occupancy(&self.rooms)
    }
}

impl TryFrom<Map<String, Value>> for Solution {
    type Error = serde_json::Error;

    fn try_from(v: Map<String, Value>) -> Result<Self, Self::Error> {
        from_value(Value::Object(v))
    }
}

pub fn count_rooms(rooms: &[usize]) -> usize {
    let mut labels = rooms.to_vec();
    labels.sort_unstable();
    labels.dedup();
    labels.len()
}

pub fn occupancy(rooms: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut occupancy: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (student, &room) in rooms.iter().enumerate() {
        occupancy.entry(room).or_default().push(student);
    }
    occupancy
}

#[derive(Serialize, Deserialize)]
struct ChallengeData {
    num_students: usize,
    stress_budget: f64,
    edges: Vec<Edge>,
}

/// Students and their pairwise happiness/stress, plus the global stress budget.
///
/// Edge attributes are kept in dense symmetric matrices so lookups during the
/// search are constant time. Students without an edge have zero happiness and
/// zero stress when they share a room.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "ChallengeData", into = "ChallengeData")]
pub struct Challenge {
    num_students: usize,
    stress_budget: f64,
    edges: Vec<Edge>,
    happiness: Vec<Vec<f64>>,
    stress: Vec<Vec<f64>>,
}

impl TryFrom<ChallengeData> for Challenge {
    type Error = anyhow::Error;

    fn try_from(data: ChallengeData) -> Result<Self> {
        Challenge::new(data.num_students, data.stress_budget, data.edges)
    }
}

impl From<Challenge> for ChallengeData {
    fn from(challenge: Challenge) -> Self {
        ChallengeData {
            num_students: challenge.num_students,
            stress_budget: challenge.stress_budget,
            edges: challenge.edges,
        }
    }
}

impl Challenge {
    pub fn new(num_students: usize, stress_budget: f64, edges: Vec<Edge>) -> Result<Self> {
        if num_students == 0 {
            return Err(anyhow!("Instance must have at least one student"));
        }
        if !stress_budget.is_finite() || stress_budget < 0.0 {
            return Err(anyhow!(
                "Stress budget ({}) must be a non-negative number",
                stress_budget
            ));
        }

        let mut happiness = vec![vec![0.0; num_students]; num_students];
        let mut stress = vec![vec![0.0; num_students]; num_students];
        let mut seen: AHashSet<(usize, usize)> = AHashSet::with_capacity(edges.len());
        for edge in &edges {
            if edge.a >= num_students || edge.b >= num_students {
                return Err(anyhow!(
                    "Edge ({}, {}) references a student out of bounds (num_students: {})",
                    edge.a,
                    edge.b,
                    num_students
                ));
            }
            if edge.a == edge.b {
                return Err(anyhow!("Edge ({}, {}) is a self loop", edge.a, edge.b));
            }
            if !seen.insert((edge.a.min(edge.b), edge.a.max(edge.b))) {
                return Err(anyhow!("Edge ({}, {}) is duplicated", edge.a, edge.b));
            }
            for (name, value) in [("happiness", edge.happiness), ("stress", edge.stress)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(anyhow!(
                        "Edge ({}, {}) has invalid {} ({})",
                        edge.a,
                        edge.b,
                        name,
                        value
                    ));
                }
            }
            happiness[edge.a][edge.b] = edge.happiness;
            happiness[edge.b][edge.a] = edge.happiness;
            stress[edge.a][edge.b] = edge.stress;
            stress[edge.b][edge.a] = edge.stress;
        }

        Ok(Challenge {
            num_students,
            stress_budget,
            edges,
            happiness,
            stress,
        })
    }

    pub fn generate_instance(seed: &[u8; 32], difficulty: &Difficulty) -> Result<Challenge> {
        let mut rng = SmallRng::from_seed(StdRng::from_seed(*seed).gen());
        let num_students = difficulty.num_students;
        let scale = 10u32.pow(VALUE_PRECISION);
        let max_value = (MAX_EDGE_VALUE as u32) * scale;

        // Complete graph, values uniform in [0, 100) truncated to VALUE_PRECISION decimals
        let mut edges = Vec::with_capacity(num_students * num_students.saturating_sub(1) / 2);
        for a in 0..num_students {
            for b in (a + 1)..num_students {
                let happiness = rng.gen_range(0..max_value) as f64 / scale as f64;
                let stress = rng.gen_range(0..max_value) as f64 / scale as f64;
                edges.push(Edge {
                    a,
                    b,
                    happiness,
                    stress,
                });
            }
        }

        Challenge::new(num_students, difficulty.stress_budget, edges)
    }

    pub fn num_students(&self) -> usize {
        self.num_students
    }

    pub fn nodes(&self) -> Range<usize> {
        0..self.num_students
    }

    pub fn stress_budget(&self) -> f64 {
        self.stress_budget
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// `(happiness, stress)` of placing `a` and `b` together.
    pub fn edge_attributes(&self, a: usize, b: usize) -> (f64, f64) {
        (self.happiness[a][b], self.stress[a][b])
    }

    pub fn happiness(&self, a: usize, b: usize) -> f64 {
        self.happiness[a][b]
    }

    pub fn stress(&self, a: usize, b: usize) -> f64 {
        self.stress[a][b]
    }

    /// Per-room stress ceiling when `num_rooms` rooms are in use.
    ///
    /// Returns `None` when `num_rooms` is zero, which callers treat as infeasible.
    pub fn stress_ceiling(&self, num_rooms: usize) -> Option<f64> {
        match num_rooms {
            0 => None,
            k => Some(self.stress_budget / k as f64),
        }
    }

    pub fn room_stress(&self, students: &[usize]) -> f64 {
        self.sum_over_pairs(students, &self.stress)
    }

    pub fn room_happiness(&self, students: &[usize]) -> f64 {
        self.sum_over_pairs(students, &self.happiness)
    }

    // Members are summed in ascending order so that the same room gives the
    // same float regardless of how the caller assembled it.
    fn sum_over_pairs(&self, students: &[usize], values: &[Vec<f64>]) -> f64 {
        let mut members = students.to_vec();
        members.sort_unstable();
        let mut total = 0.0;
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                total += values[members[i]][members[j]];
            }
        }
        total
    }

    pub fn total_happiness(&self, rooms: &[usize]) -> f64 {
        let mut total = 0.0;
        for i in 0..rooms.len() {
            for j in (i + 1)..rooms.len() {
                if rooms[i] == rooms[j] {
                    total += self.happiness[i][j];
                }
            }
        }
        total
    }

    pub fn evaluate_total_happiness(&self, solution: &Solution) -> Result<f64> {
        if solution.rooms.len() != self.num_students {
            return Err(anyhow!(
                "Solution assigns {} students, expected {}",
                solution.rooms.len(),
                self.num_students
            ));
        }
        Ok(self.total_happiness(&solution.rooms))
    }

    /// Checks that every student has exactly one room, that `num_rooms` matches
    /// the distinct rooms in use, and that no room exceeds `stress_budget / num_rooms`.
    /// Returns the total happiness of a valid solution.
    pub fn verify_solution(&self, solution: &Solution) -> Result<f64> {
        let total_happiness = self.evaluate_total_happiness(solution)?;

        let num_rooms = count_rooms(&solution.rooms);
        if num_rooms != solution.num_rooms {
            return Err(anyhow!(
                "Solution declares {} rooms but uses {}",
                solution.num_rooms,
                num_rooms
            ));
        }

        let ceiling = self
            .stress_ceiling(num_rooms)
            .ok_or_else(|| anyhow!("Solution uses no rooms"))?;
        for (room, students) in solution.occupancy() {
            let stress = self.room_stress(&students);
            if stress > ceiling {
                return Err(anyhow!(
                    "Room ({}) stress ({}) exceeded max stress ({})",
                    room,
                    stress,
                    ceiling
                ));
            }
        }

        Ok(total_happiness)
    }
}
