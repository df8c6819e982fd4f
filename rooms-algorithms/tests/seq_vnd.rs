use rooms_algorithms::breakout_rooms::seq_vnd::{
    create_initial_partition, local_search,
    feasibility::{can_move, can_move2, can_swap},
    neighborhoods::{move2_neighborhood, move_neighborhood, swap_neighborhood},
    seq_vnd, solve, solve_challenge, Baseline, Config, Move, Neighborhood, Occupancy, Partition,
};
use rooms_challenges::breakout_rooms::{Challenge, Difficulty, Edge, Solution};
use serde_json::{json, Map, Value};
use std::cell::RefCell;

fn edge(a: usize, b: usize, happiness: f64, stress: f64) -> Edge {
    Edge {
        a,
        b,
        happiness,
        stress,
    }
}

fn capped() -> Config {
    Config {
        max_iterations: 10_000,
        ..Config::defaults()
    }
}

fn hyperparameters(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

// (0,1) h=5 s=1, (2,3) h=3 s=1, budget 10
fn two_pairs() -> Challenge {
    Challenge::new(4, 10.0, vec![edge(0, 1, 5.0, 1.0), edge(2, 3, 3.0, 1.0)]).unwrap()
}

// Every pair has stress 4 with budget 10, so nobody can pair up initially
// (4 > 10/4) or by moving alone (4 > 10/3), but two lone students moving at
// once leave two rooms with ceiling 10/2.
fn lonely_four() -> Challenge {
    let mut edges = Vec::new();
    for a in 0..4 {
        for b in (a + 1)..4 {
            let happiness = match (a, b) {
                (0, 2) => 5.0,
                (1, 3) => 3.0,
                _ => 1.0,
            };
            edges.push(edge(a, b, happiness, 4.0));
        }
    }
    Challenge::new(4, 10.0, edges).unwrap()
}

// (0,1) and (2,3) start together, but {0,2} and {1,3} are happier and still
// fit the ceiling of 2; every three-person room contains a stress 10 pair.
fn crossed_pairs() -> Challenge {
    Challenge::new(
        4,
        4.0,
        vec![
            edge(0, 1, 1.0, 1.0),
            edge(2, 3, 1.0, 1.0),
            edge(0, 2, 10.0, 2.0),
            edge(1, 3, 10.0, 2.0),
            edge(0, 3, 0.0, 10.0),
            edge(1, 2, 0.0, 10.0),
        ],
    )
    .unwrap()
}

fn triangle() -> Challenge {
    Challenge::new(
        3,
        30.0,
        vec![
            edge(0, 1, 10.0, 1.0),
            edge(1, 2, 10.0, 1.0),
            edge(0, 2, 10.0, 1.0),
        ],
    )
    .unwrap()
}

fn assert_valid(challenge: &Challenge, solution: &Solution) -> f64 {
    match challenge.verify_solution(solution) {
        Ok(happiness) => happiness,
        Err(e) => panic!("invalid solution {:?}: {}", solution, e),
    }
}

#[test]
fn test_initial_partition_pairs_low_stress() {
    let (rooms, k) = create_initial_partition(&two_pairs());
    assert_eq!(rooms, vec![0, 0, 1, 1]);
    assert_eq!(k, 4);
}

#[test]
fn test_initial_partition_skips_stressful_pairs() {
    let challenge = Challenge::new(2, 4.0, vec![edge(0, 1, 10.0, 5.0)]).unwrap();
    let (rooms, k) = create_initial_partition(&challenge);
    assert_eq!(rooms, vec![0, 1]);
    assert_eq!(k, 2);

    let (rooms, _) = create_initial_partition(&triangle());
    assert_eq!(rooms, vec![0, 0, 1]);
}

#[test]
fn test_already_optimal_pairs() {
    let challenge = two_pairs();
    let descent = solve(&challenge, &capped());

    assert_eq!(descent.partition.rooms(), &[0, 0, 1, 1]);
    assert_eq!(descent.partition.num_rooms(), 2);
    assert_eq!(descent.happiness, 8.0);
    assert!(descent.steps.is_empty());
    assert_eq!(descent.evaluations, 3);
    assert!(!descent.stopped_early);
    assert_eq!(assert_valid(&challenge, &descent.to_solution()), 8.0);
}

#[test]
fn test_single_student() {
    let challenge = Challenge::new(1, 0.0, vec![]).unwrap();
    let descent = solve(&challenge, &capped());

    assert_eq!(descent.partition.rooms(), &[0]);
    assert_eq!(descent.partition.num_rooms(), 1);
    assert_eq!(descent.happiness, 0.0);
    assert!(descent.steps.is_empty());
    assert_valid(&challenge, &descent.to_solution());
}

#[test]
fn test_stressful_pair_stays_apart() {
    let challenge = Challenge::new(2, 4.0, vec![edge(0, 1, 10.0, 5.0)]).unwrap();
    let descent = solve(&challenge, &capped());

    assert_eq!(descent.partition.num_rooms(), 2);
    assert_eq!(descent.happiness, 0.0);
    assert_valid(&challenge, &descent.to_solution());
}

#[test]
fn test_move1_merges_into_one_room() {
    let challenge = triangle();
    let descent = solve(&challenge, &capped());

    assert_eq!(descent.partition.rooms(), &[0, 0, 0]);
    assert_eq!(descent.partition.num_rooms(), 1);
    assert_eq!(descent.happiness, 30.0);
    assert_eq!(
        descent.steps.iter().map(|s| s.applied).collect::<Vec<_>>(),
        vec![Move::Relocate { student: 2, room: 0 }]
    );
    assert_eq!(descent.steps[0].neighborhood, Neighborhood::Move1);
    assert_eq!(descent.steps[0].num_rooms, 1);
    assert_eq!(descent.evaluations, 4);
    assert_valid(&challenge, &descent.to_solution());
}

#[test]
fn test_swap_exchanges_partners() {
    let challenge = crossed_pairs();
    let start = Partition::new(create_initial_partition(&challenge).0);
    let occupancy = Occupancy::new(&start);
    assert!(move_neighborhood(&challenge, &start, &occupancy).is_empty());
    assert_eq!(
        swap_neighborhood(&challenge, &start, &occupancy, true),
        vec![
            Move::Swap {
                student1: 0,
                student2: 3
            },
            Move::Swap {
                student1: 1,
                student2: 2
            },
        ]
    );

    let descent = seq_vnd(&challenge, start, &capped());
    assert_eq!(descent.happiness, 20.0);
    assert_eq!(descent.partition.rooms(), &[1, 0, 1, 0]);
    assert_eq!(descent.steps.len(), 1);
    assert_eq!(descent.steps[0].neighborhood, Neighborhood::Swap);
    assert_valid(&challenge, &descent.to_solution());
}

#[test]
fn test_move2_merges_lone_students() {
    let challenge = lonely_four();
    let start = Partition::new(create_initial_partition(&challenge).0);
    assert_eq!(start.rooms(), &[0, 1, 2, 3]);

    let occupancy = Occupancy::new(&start);
    assert!(move_neighborhood(&challenge, &start, &occupancy).is_empty());
    assert!(swap_neighborhood(&challenge, &start, &occupancy, true).is_empty());
    assert!(!move2_neighborhood(&challenge, &start, &occupancy, true).is_empty());

    let descent = seq_vnd(&challenge, start, &capped());
    let rooms = descent.partition.rooms();
    assert_eq!(descent.happiness, 8.0);
    assert_eq!(descent.partition.num_rooms(), 2);
    assert_eq!(rooms[0], rooms[2]);
    assert_eq!(rooms[1], rooms[3]);
    assert_ne!(rooms[0], rooms[1]);
    assert_eq!(descent.steps.len(), 1);
    assert_eq!(descent.steps[0].neighborhood, Neighborhood::Move2);
    assert_eq!(
        descent.steps[0].applied,
        Move::Relocate2 {
            student1: 0,
            room1: 2,
            student2: 1,
            room2: 3
        }
    );
    assert_valid(&challenge, &descent.to_solution());
}

#[test]
fn test_pruning_keeps_result() {
    for challenge in [lonely_four(), crossed_pairs(), triangle(), two_pairs()] {
        let pruned = solve(&challenge, &capped());
        let full = solve(
            &challenge,
            &Config {
                prune_symmetric: false,
                ..capped()
            },
        );
        assert_eq!(pruned.partition, full.partition);
        assert_eq!(pruned.steps, full.steps);
    }

    let challenge = lonely_four();
    let start = Partition::new(vec![0, 1, 2, 3]);
    let occupancy = Occupancy::new(&start);
    assert_eq!(
        move2_neighborhood(&challenge, &start, &occupancy, false).len(),
        2 * move2_neighborhood(&challenge, &start, &occupancy, true).len()
    );
}

#[test]
fn test_can_move_ceilings() {
    let challenge = Challenge::new(3, 4.0, vec![edge(0, 1, 1.0, 3.0)]).unwrap();

    // Alone -> room disappears, ceiling 4 / 1
    let partition = Partition::new(vec![0, 1, 1]);
    let occupancy = Occupancy::new(&partition);
    assert!(can_move(&challenge, &partition, &occupancy, 2, 0, 1));
    assert!(!can_move(&challenge, &partition, &occupancy, 2, 0, 0));

    // Not alone -> ceiling stays 4 / 2
    let partition = Partition::new(vec![0, 1, 0]);
    let occupancy = Occupancy::new(&partition);
    assert!(!can_move(&challenge, &partition, &occupancy, 2, 0, 1));
    assert!(can_move(&challenge, &partition, &occupancy, 2, 2, 1));

    // The only room cannot be vacated
    let single = Challenge::new(1, 1.0, vec![]).unwrap();
    let partition = Partition::new(vec![0]);
    let occupancy = Occupancy::new(&partition);
    assert!(!can_move(&single, &partition, &occupancy, 1, 0, 5));
}

#[test]
fn test_can_swap_rules() {
    let challenge = crossed_pairs();
    let partition = Partition::new(vec![0, 0, 1, 1]);
    let occupancy = Occupancy::new(&partition);
    assert!(!can_swap(&challenge, &partition, &occupancy, 2, 0, 1));
    assert!(!can_swap(&challenge, &partition, &occupancy, 2, 0, 2));
    assert!(can_swap(&challenge, &partition, &occupancy, 2, 0, 3));
    assert!(can_swap(&challenge, &partition, &occupancy, 2, 3, 0));
    assert!(!can_swap(&challenge, &partition, &occupancy, 0, 0, 3));

    let partition = Partition::new(vec![0, 1, 2, 3]);
    let occupancy = Occupancy::new(&partition);
    assert!(!can_swap(&challenge, &partition, &occupancy, 4, 0, 3));
}

#[test]
fn test_can_move2_rules() {
    let challenge = lonely_four();
    let partition = Partition::new(vec![0, 1, 2, 3]);
    let occupancy = Occupancy::new(&partition);

    assert!(can_move2(&challenge, &partition, &occupancy, 4, (0, 2), (1, 3)));
    // Same destination: {2, 0, 1} has stress 12 > 5
    assert!(!can_move2(&challenge, &partition, &occupancy, 4, (0, 2), (1, 2)));
    // Own room
    assert!(!can_move2(&challenge, &partition, &occupancy, 4, (0, 0), (1, 3)));
    // Into the room the other student leaves
    assert!(!can_move2(&challenge, &partition, &occupancy, 4, (0, 1), (1, 3)));
    assert!(!can_move2(&challenge, &partition, &occupancy, 4, (0, 2), (0, 3)));
    // k - 2 must stay positive
    assert!(!can_move2(&challenge, &partition, &occupancy, 2, (0, 2), (1, 3)));

    let loose = Challenge::new(4, 100.0, vec![edge(0, 1, 1.0, 1.0)]).unwrap();
    let partition = Partition::new(vec![0, 0, 1, 2]);
    let occupancy = Occupancy::new(&partition);
    assert!(!can_move2(&loose, &partition, &occupancy, 3, (0, 1), (3, 1)));
    assert!(can_move2(&loose, &partition, &occupancy, 3, (2, 0), (3, 0)));
}

#[test]
fn test_move_apply_and_revert() {
    let mut rooms = vec![4, 4, 7, 9];
    for mv in [
        Move::Relocate { student: 0, room: 9 },
        Move::Swap {
            student1: 1,
            student2: 2,
        },
        Move::Relocate2 {
            student1: 2,
            room1: 4,
            student2: 3,
            room2: 4,
        },
    ] {
        let undo = mv.apply(&mut rooms);
        assert_ne!(rooms, vec![4, 4, 7, 9]);
        undo.revert(&mut rooms);
        assert_eq!(rooms, vec![4, 4, 7, 9]);
    }

    Move::Swap {
        student1: 0,
        student2: 2,
    }
    .apply(&mut rooms);
    assert_eq!(rooms, vec![7, 4, 4, 9]);
}

#[test]
fn test_local_search_picks_first_best() {
    let challenge = lonely_four();
    let partition = Partition::new(vec![0, 1, 2, 3]);
    let candidates = vec![
        Move::Relocate2 {
            student1: 0,
            room1: 3,
            student2: 1,
            room2: 2,
        },
        Move::Relocate2 {
            student1: 2,
            room1: 0,
            student2: 3,
            room2: 1,
        },
        Move::Relocate2 {
            student1: 0,
            room1: 2,
            student2: 1,
            room2: 3,
        },
    ];

    let best = local_search(&challenge, &partition, &candidates, 0.0);
    assert_eq!(best.happiness, 8.0);
    assert_eq!(best.applied, Some(candidates[1]));
    assert_eq!(best.partition.rooms(), &[0, 1, 0, 1]);
    assert_eq!(best.partition.num_rooms(), 2);

    let none = local_search(&challenge, &partition, &candidates, 8.0);
    assert_eq!(none.applied, None);
    assert_eq!(none.happiness, 8.0);
    assert_eq!(none.partition, partition);

    let empty = local_search(&challenge, &partition, &[], 0.0);
    assert_eq!(empty.applied, None);
}

#[test]
fn test_neighborhood_order() {
    assert_eq!(Neighborhood::Move1.next(), Some(Neighborhood::Swap));
    assert_eq!(Neighborhood::Swap.next(), Some(Neighborhood::Move2));
    assert_eq!(Neighborhood::Move2.next(), None);
}

#[test]
fn test_iteration_limit() {
    let challenge = triangle();
    let descent = solve(
        &challenge,
        &Config {
            max_iterations: 1,
            ..Config::defaults()
        },
    );
    assert!(descent.stopped_early);
    assert_eq!(descent.evaluations, 1);
    assert_eq!(descent.steps.len(), 1);
    assert_valid(&challenge, &descent.to_solution());
}

#[test]
fn test_time_limit() {
    // Loose budget: everyone pairs up and rooms keep merging for many steps.
    let challenge = Challenge::generate_instance(
        &[7u8; 32],
        &Difficulty {
            num_students: 80,
            stress_budget: 1_000_000.0,
        },
    )
    .unwrap();
    let descent = solve(
        &challenge,
        &Config {
            time_limit_ms: 1,
            ..Config::defaults()
        },
    );
    assert!(descent.stopped_early);
    assert!(descent.evaluations >= 1);

    let happiness = assert_valid(&challenge, &descent.to_solution());
    assert_eq!(happiness, descent.happiness);
}

#[test]
fn test_config_initialize() {
    assert_eq!(Config::initialize(&None), Config::defaults());

    let config = Config::initialize(&hyperparameters(json!({
        "baseline": "zero",
        "max_iterations": 50
    })));
    assert_eq!(config.baseline, Baseline::Zero);
    assert_eq!(config.max_iterations, 50);
    assert_eq!(config.time_limit_ms, 0);
    assert!(config.prune_symmetric);

    let config = Config::initialize(&hyperparameters(json!({"baseline": 3})));
    assert_eq!(config, Config::defaults());
}

#[test]
fn test_solve_challenge_saves_solution() {
    let challenge = triangle();
    let saved = RefCell::new(None);
    let save_solution = |s: &Solution| -> anyhow::Result<()> {
        *saved.borrow_mut() = Some(s.clone());
        Ok(())
    };
    solve_challenge(&challenge, &save_solution, &None).unwrap();

    let solution = saved.into_inner().unwrap();
    assert_eq!(solution, Solution::new(vec![0, 0, 0]));

    let failing = |_: &Solution| -> anyhow::Result<()> { Err(anyhow::anyhow!("disk full")) };
    assert!(solve_challenge(&challenge, &failing, &None).is_err());
}

#[test]
fn test_generated_instances() {
    for (i, (num_students, stress_budget)) in
        [(6, 5.0), (6, 80.0), (8, 30.0), (10, 120.0), (10, 400.0)]
            .into_iter()
            .enumerate()
    {
        for nonce in 0..3u8 {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = nonce;
            let challenge = Challenge::generate_instance(
                &seed,
                &Difficulty {
                    num_students,
                    stress_budget,
                },
            )
            .unwrap();

            let (rooms, _) = create_initial_partition(&challenge);
            let initial_happiness = challenge.total_happiness(&rooms);
            assert_valid(&challenge, &Solution::new(rooms));

            let descent = solve(&challenge, &capped());
            assert!(!descent.stopped_early);

            let solution = descent.to_solution();
            let happiness = assert_valid(&challenge, &solution);
            assert_eq!(happiness, descent.happiness);
            assert_eq!(solution.rooms.len(), num_students);

            let mut previous = initial_happiness;
            for step in &descent.steps {
                assert!(step.happiness > previous);
                previous = step.happiness;
            }
            assert!(descent.happiness >= initial_happiness);

            let zero = solve(
                &challenge,
                &Config {
                    baseline: Baseline::Zero,
                    ..capped()
                },
            );
            assert_eq!(zero.partition, descent.partition);
        }
    }
}
