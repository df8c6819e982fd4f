use crate::serializable_struct_with_getters;
use rooms_utils::{jsonify, u8s_from_str};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Solutions travel as plain json objects so that this crate stays independent
// of the challenge definitions.
pub type Solution = Map<String, Value>;

serializable_struct_with_getters! {
    GenerateSettings {
        num_students: usize,
        stress_budget: f64,
    }
}
impl GenerateSettings {
    pub fn calc_seed(&self, rand_hash: &String, nonce: u64) -> serde_json::Result<[u8; 32]> {
        Ok(u8s_from_str(&format!(
            "{}_{}_{}",
            jsonify(self)?,
            rand_hash,
            nonce
        )))
    }
}

serializable_struct_with_getters! {
    OutputData {
        num_students: usize,
        num_rooms: usize,
        total_happiness: f64,
        accepted_moves: usize,
        neighborhood_evaluations: usize,
        runtime_ms: u64,
        hyperparameters: Option<Map<String, Value>>,
        solution: Solution,
    }
}
