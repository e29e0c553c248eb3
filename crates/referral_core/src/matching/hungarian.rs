//! Hungarian (Kuhn-Munkres) algorithm for minimum-distance bipartite assignment.
//!
//! Hospital capacity is expressed by repeating a hospital once per bed slot,
//! so the problem becomes a plain rectangular assignment over
//! patients × slots.

use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

use crate::records::{HospitalRecord, PatientRecord};

use super::algorithm::AssignmentAlgorithm;
use super::types::{scaled_cost, Assignment};

/// Simple matrix type implementing pathfinding's Weights for i64.
struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        I64Weights(
            self.0
                .iter()
                .map(|r| r.iter().map(|&x| x.saturating_neg()).collect())
                .collect(),
        )
    }
}

/// Optimal assignment minimising total patient-hospital distance.
///
/// Costs are integer metres. Kuhn-Munkres maximises weight and needs
/// rows <= columns, so costs are negated and the matrix is transposed when
/// patients outnumber slots; in that case the patients left without a slot
/// are absent from the result.
#[derive(Debug, Default)]
pub struct HungarianAssignment;

impl HungarianAssignment {
    /// One entry per usable bed, holding the hospital index. A hospital never
    /// needs more slots than there are patients.
    fn expand_slots(patient_count: usize, hospitals: &[HospitalRecord]) -> Vec<usize> {
        hospitals
            .iter()
            .enumerate()
            .flat_map(|(idx, h)| {
                let slots = (h.capacity as usize).min(patient_count);
                std::iter::repeat(idx).take(slots)
            })
            .collect()
    }
}

impl AssignmentAlgorithm for HungarianAssignment {
    fn name(&self) -> &'static str {
        "Hungarian"
    }

    fn complexity(&self) -> &'static str {
        "O(n^3)"
    }

    fn assign(&self, patients: &[PatientRecord], hospitals: &[HospitalRecord]) -> Vec<Assignment> {
        let slots = Self::expand_slots(patients.len(), hospitals);
        if patients.is_empty() || slots.is_empty() {
            return Vec::new();
        }

        let costs: Vec<Vec<i64>> = patients
            .iter()
            .map(|p| {
                slots
                    .iter()
                    .map(|&h| scaled_cost(p.distance_km(&hospitals[h])))
                    .collect()
            })
            .collect();

        let mut slot_of_patient: Vec<Option<usize>> = vec![None; patients.len()];
        if patients.len() <= slots.len() {
            let weights = I64Weights(
                costs
                    .iter()
                    .map(|row| row.iter().map(|&c| -c).collect())
                    .collect(),
            );
            let (_total, assignments) = kuhn_munkres(&weights);
            for (patient_idx, slot_idx) in assignments.into_iter().enumerate() {
                slot_of_patient[patient_idx] = Some(slot_idx);
            }
        } else {
            let weights = I64Weights(
                (0..slots.len())
                    .map(|s| (0..patients.len()).map(|p| -costs[p][s]).collect())
                    .collect(),
            );
            let (_total, assignments) = kuhn_munkres(&weights);
            for (slot_idx, patient_idx) in assignments.into_iter().enumerate() {
                slot_of_patient[patient_idx] = Some(slot_idx);
            }
        }

        patients
            .iter()
            .zip(slot_of_patient)
            .filter_map(|(patient, slot)| {
                let hospital = &hospitals[slots[slot?]];
                Some(Assignment {
                    patient_id: patient.id.clone(),
                    hospital_id: hospital.id.clone(),
                    distance_km: patient.distance_km(hospital),
                })
            })
            .collect()
    }
}
