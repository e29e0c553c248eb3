use crate::records::{HospitalRecord, PatientRecord};

use super::types::Assignment;

/// Trait for algorithms that place patients into hospitals with capacity.
///
/// Shared contract for every implementation:
/// - a patient appears at most once in the output;
/// - a patient with no feasible hospital is simply absent;
/// - no hospital receives more patients than its capacity;
/// - inputs are never mutated.
pub trait AssignmentAlgorithm: Send + Sync {
    /// Display name used in comparison reports.
    fn name(&self) -> &'static str;

    /// Descriptive complexity label (not enforced).
    fn complexity(&self) -> &'static str;

    /// Assign a batch of patients.
    fn assign(&self, patients: &[PatientRecord], hospitals: &[HospitalRecord]) -> Vec<Assignment>;

    /// Assign a single patient against the candidate hospitals.
    ///
    /// The default implementation runs a one-patient batch.
    fn assign_one(
        &self,
        patient: &PatientRecord,
        hospitals: &[HospitalRecord],
    ) -> Option<Assignment> {
        self.assign(std::slice::from_ref(patient), hospitals)
            .into_iter()
            .find(|assignment| assignment.patient_id == patient.id)
    }
}
