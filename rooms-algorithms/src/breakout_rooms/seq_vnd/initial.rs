use rooms_challenges::breakout_rooms::{Challenge, Edge};

/// Greedy starting partition.
///
/// Edges are visited by ascending stress; an edge whose endpoints are both
/// unplaced and whose stress is at most `stress_budget / N` opens a room for
/// the pair. Everyone left over gets a room of their own.
///
/// Returns the assignment and `N` as the nominal room count.
pub fn create_initial_partition(challenge: &Challenge) -> (Vec<usize>, usize) {
    let num_students = challenge.num_students();
    let max_pair_stress = challenge.stress_budget() / num_students as f64;

    let mut edges_by_stress: Vec<&Edge> = challenge.edges().iter().collect();
    edges_by_stress.sort_by(|a, b| a.stress.total_cmp(&b.stress));

    let mut rooms: Vec<Option<usize>> = vec![None; num_students];
    let mut room_counter = 0;
    for edge in edges_by_stress {
        if rooms[edge.a].is_none() && rooms[edge.b].is_none() && edge.stress <= max_pair_stress
        {
            rooms[edge.a] = Some(room_counter);
            rooms[edge.b] = Some(room_counter);
            room_counter += 1;
        }
    }

    let rooms = rooms
        .into_iter()
        .map(|room| {
            room.unwrap_or_else(|| {
                room_counter += 1;
                room_counter - 1
            })
        })
        .collect();

    (rooms, num_students)
}
