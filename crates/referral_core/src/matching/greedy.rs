use crate::records::{HospitalRecord, PatientRecord};

use super::algorithm::AssignmentAlgorithm;
use super::types::Assignment;

/// Greedy nearest-available assignment.
///
/// # Algorithm Behavior
///
/// 1. Iterates through patients in input order
/// 2. For each patient, scans hospitals with remaining capacity and keeps the
///    nearest (the first one wins on equal distance)
/// 3. Decrements that hospital's remaining capacity
///
/// Capacities are tracked on a private copy, so the caller's records are never
/// touched. The result depends on input order and is not globally optimal.
///
/// # Performance
///
/// Time complexity: O(P·H).
#[derive(Debug, Default)]
pub struct GreedyAssignment;

impl AssignmentAlgorithm for GreedyAssignment {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn complexity(&self) -> &'static str {
        "O(P·H)"
    }

    fn assign(&self, patients: &[PatientRecord], hospitals: &[HospitalRecord]) -> Vec<Assignment> {
        let mut remaining: Vec<u32> = hospitals.iter().map(|h| h.capacity).collect();
        let mut results = Vec::new();

        for patient in patients {
            let mut best: Option<(usize, f64)> = None;
            for (idx, hospital) in hospitals.iter().enumerate() {
                if remaining[idx] == 0 {
                    continue;
                }
                let distance_km = patient.distance_km(hospital);
                if best.map_or(true, |(_, best_km)| distance_km < best_km) {
                    best = Some((idx, distance_km));
                }
            }

            if let Some((idx, distance_km)) = best {
                remaining[idx] -= 1;
                results.push(Assignment {
                    patient_id: patient.id.clone(),
                    hospital_id: hospitals[idx].id.clone(),
                    distance_km,
                });
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_hospital_until_full() {
        let patients = vec![
            PatientRecord::new("P1", 0.0, 0.0),
            PatientRecord::new("P2", 0.0, 0.1),
        ];
        let hospitals = vec![
            HospitalRecord::new("NEAR", 0.0, 0.05, 1),
            HospitalRecord::new("FAR", 0.0, 3.0, 5),
        ];
        let result = GreedyAssignment.assign(&patients, &hospitals);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].hospital_id, "NEAR");
        assert_eq!(result[1].hospital_id, "FAR");
        // caller's capacities untouched
        assert_eq!(hospitals[0].capacity, 1);
    }

    #[test]
    fn zero_capacity_everywhere_leaves_patient_out() {
        let patients = vec![PatientRecord::new("P1", 0.0, 0.0)];
        let hospitals = vec![HospitalRecord::new("H1", 0.0, 0.0, 0)];
        assert!(GreedyAssignment.assign(&patients, &hospitals).is_empty());
        assert!(GreedyAssignment.assign(&patients, &[]).is_empty());
        assert_eq!(GreedyAssignment.assign_one(&patients[0], &hospitals), None);
    }

    #[test]
    fn equal_distance_keeps_first_hospital() {
        let patients = vec![PatientRecord::new("P1", 0.0, 0.0)];
        let hospitals = vec![
            HospitalRecord::new("EAST", 0.0, 1.0, 1),
            HospitalRecord::new("WEST", 0.0, -1.0, 1),
        ];
        let result = GreedyAssignment.assign(&patients, &hospitals);
        assert_eq!(result[0].hospital_id, "EAST");
    }
}
