//! Test helpers for common test setup and utilities.
//!
//! Fixtures share one small geography around Lima, Peru, so distances in
//! assertions stay in the single-digit kilometre range.

use crate::graph::Graph;
use crate::records::{HospitalRecord, InMemoryStore, PatientRecord};

/// Plaza de Armas de Lima.
pub const LIMA_CENTER: (f64, f64) = (-12.0464, -77.0428);

/// Three patients: two in Lima, one in Callao.
pub fn lima_patients() -> Vec<PatientRecord> {
    vec![
        PatientRecord::new("P001", LIMA_CENTER.0, LIMA_CENTER.1)
            .with_department("Lima")
            .with_disease("Fractura de tibia")
            .with_severity("Alta"),
        PatientRecord::new("P002", -12.1211, -77.0297)
            .with_department("Lima")
            .with_disease("Neumonía")
            .with_severity("Media"),
        PatientRecord::new("P003", -12.0566, -77.1181)
            .with_department("Callao")
            .with_disease("Infarto")
            .with_severity("Alta"),
    ]
}

/// Two Lima hospitals with a single free bed each.
pub fn lima_hospitals() -> Vec<HospitalRecord> {
    vec![
        HospitalRecord::new("H001", -12.0560, -77.0157, 1)
            .with_name("Hospital Nacional Dos de Mayo")
            .with_department("Lima")
            .with_specialties(["Traumatología", "Medicina Interna"]),
        HospitalRecord::new("H002", -12.0786, -77.0400, 1)
            .with_name("Hospital Rebagliati")
            .with_department("Lima")
            .with_specialties(["Cardiología", "Neumología"]),
    ]
}

pub fn lima_store() -> InMemoryStore {
    InMemoryStore::new(lima_patients(), lima_hospitals())
}

/// Symmetric 4-cycle `A-B-C-D-A` with weights 1, 2, 3, 4.
///
/// Its minimum spanning tree costs 6 and skips the weight-4 edge.
pub fn square_graph() -> Graph {
    let mut graph = Graph::new();
    for (a, b, w) in [("A", "B", 1.0), ("B", "C", 2.0), ("C", "D", 3.0), ("D", "A", 4.0)] {
        graph.add_edge(a, b, w);
        graph.add_edge(b, a, w);
    }
    graph
}
