use serde::{Deserialize, Serialize};

/// One patient placed in one hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub patient_id: String,
    pub hospital_id: String,
    pub distance_km: f64,
}

/// Scale factor from kilometres to the integer costs used by the optimal
/// solvers (metre resolution).
pub const COST_SCALE: f64 = 1_000.0;

pub(crate) fn scaled_cost(distance_km: f64) -> i64 {
    (distance_km * COST_SCALE).round() as i64
}

pub fn total_distance_km(assignments: &[Assignment]) -> f64 {
    assignments.iter().map(|a| a.distance_km).sum()
}
