//! Plain text formats for instances and assignments.
//!
//! Instance:
//! ```text
//! <num_students>
//! <stress_budget>
//! <a> <b> <happiness> <stress>
//! ...
//! ```
//! Assignment: one `<student> <room>` line per student.

use super::{Challenge, Edge, Solution};
use anyhow::{anyhow, Result};
use std::{collections::BTreeMap, str::FromStr};

fn parse_field<T: FromStr>(field: &str, what: &str, line_no: usize) -> Result<T> {
    field
        .parse::<T>()
        .map_err(|_| anyhow!("Line {}: cannot parse {} from '{}'", line_no, what, field))
}

fn content_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

impl Challenge {
    pub fn from_input_string(input: &str) -> Result<Challenge> {
        let mut lines = content_lines(input);

        let (line_no, line) = lines
            .next()
            .ok_or_else(|| anyhow!("Missing number of students"))?;
        let num_students: usize = parse_field(line, "number of students", line_no)?;

        let (line_no, line) = lines
            .next()
            .ok_or_else(|| anyhow!("Missing stress budget"))?;
        let stress_budget: f64 = parse_field(line, "stress budget", line_no)?;

        let mut edges = Vec::new();
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(anyhow!(
                    "Line {}: expected 4 fields, found {}",
                    line_no,
                    fields.len()
                ));
            }
            edges.push(Edge {
                a: parse_field(fields[0], "student", line_no)?,
                b: parse_field(fields[1], "student", line_no)?,
                happiness: parse_field(fields[2], "happiness", line_no)?,
                stress: parse_field(fields[3], "stress", line_no)?,
            });
        }

        Challenge::new(num_students, stress_budget, edges)
    }

    pub fn to_input_string(&self) -> String {
        let mut out = format!("{}\n{}\n", self.num_students, self.stress_budget);
        for edge in &self.edges {
            out.push_str(&format!(
                "{} {} {} {}\n",
                edge.a, edge.b, edge.happiness, edge.stress
            ));
        }
        out
    }
}

impl Solution {
    /// Writes one `student room` line per student. Rooms are renumbered
    /// `0..num_rooms` in order of first appearance.
    pub fn to_output_string(&self) -> String {
        let mut labels: BTreeMap<usize, usize> = BTreeMap::new();
        let mut out = String::new();
        for (student, room) in self.rooms.iter().enumerate() {
            let next = labels.len();
            let label = *labels.entry(*room).or_insert(next);
            out.push_str(&format!("{} {}\n", student, label));
        }
        out
    }

    pub fn from_output_string(input: &str) -> Result<Solution> {
        let mut assigned: BTreeMap<usize, usize> = BTreeMap::new();
        for (line_no, line) in content_lines(input) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(anyhow!(
                    "Line {}: expected 2 fields, found {}",
                    line_no,
                    fields.len()
                ));
            }
            let student: usize = parse_field(fields[0], "student", line_no)?;
            let room: usize = parse_field(fields[1], "room", line_no)?;
            if assigned.insert(student, room).is_some() {
                return Err(anyhow!(
                    "Line {}: student ({}) is assigned more than once",
                    line_no,
                    student
                ));
            }
        }

        // Students must be exactly 0..n
        if let Some((&last, _)) = assigned.iter().next_back() {
            if last + 1 != assigned.len() {
                return Err(anyhow!(
                    "Assignment is missing students (highest id {}, {} assigned)",
                    last,
                    assigned.len()
                ));
            }
        }

        Ok(Solution::new(assigned.into_values().collect()))
    }
}
