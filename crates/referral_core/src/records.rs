//! Patient and hospital records supplied by the persistence collaborator,
//! and the [`RecordStore`] seam the orchestrator reads them through.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, GeoPoint, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub disease: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

impl PatientRecord {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            department: None,
            disease: None,
            severity: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_disease(mut self, disease: impl Into<String>) -> Self {
        self.disease = Some(disease.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn distance_km(&self, hospital: &HospitalRecord) -> f64 {
        haversine_km(self.lat, self.lon, hospital.lat, hospital.lon)
    }

    pub fn to_point(&self) -> GeoPoint {
        GeoPoint::new(self.id.clone(), self.lat, self.lon, NodeKind::Patient)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub capacity: u32,
}

impl HospitalRecord {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: None,
            lat,
            lon,
            department: None,
            specialties: Vec::new(),
            capacity,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_specialties<I, S>(mut self, specialties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specialties = specialties.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive substring match against the specialty list.
    pub fn offers(&self, specialty: &str) -> bool {
        let wanted = specialty.to_lowercase();
        self.specialties
            .iter()
            .any(|offered| offered.to_lowercase().contains(&wanted))
    }

    pub fn to_point(&self) -> GeoPoint {
        GeoPoint::new(self.id.clone(), self.lat, self.lon, NodeKind::Hospital)
    }
}

/// Read access to the patient/hospital feeds.
///
/// Implementations own persistence; the engine never writes back.
pub trait RecordStore: Send + Sync {
    fn patient(&self, id: &str) -> Option<PatientRecord>;

    fn patients(&self) -> Vec<PatientRecord>;

    fn hospitals(&self) -> Vec<HospitalRecord>;

    /// Graph nodes: every patient, then every hospital, in feed order.
    fn node_snapshot(&self) -> Vec<GeoPoint> {
        self.patients()
            .iter()
            .map(PatientRecord::to_point)
            .chain(self.hospitals().iter().map(HospitalRecord::to_point))
            .collect()
    }
}

/// A [`RecordStore`] over vectors already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub patients: Vec<PatientRecord>,
    pub hospitals: Vec<HospitalRecord>,
}

impl InMemoryStore {
    pub fn new(patients: Vec<PatientRecord>, hospitals: Vec<HospitalRecord>) -> Self {
        Self {
            patients,
            hospitals,
        }
    }
}

impl RecordStore for InMemoryStore {
    fn patient(&self, id: &str) -> Option<PatientRecord> {
        self.patients.iter().find(|p| p.id == id).cloned()
    }

    fn patients(&self) -> Vec<PatientRecord> {
        self.patients.clone()
    }

    fn hospitals(&self) -> Vec<HospitalRecord> {
        self.hospitals.clone()
    }
}
