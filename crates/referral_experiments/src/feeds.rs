//! CSV record feeds for patients and hospitals.
//!
//! Column names follow the national referral exports:
//!
//! - patients: `ID_Paciente, Gravedad, Departamento, Latitud, Longitud, Enfermedad`
//! - hospitals: `ID_Hospital, Nombre, Departamento, Latitud, Longitud,
//!   Especialidades, Capacidad`
//!
//! `Especialidades` is one cell holding a `,`/`;`/`|` separated list.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use referral_core::records::{HospitalRecord, InMemoryStore, PatientRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed row in {feed} feed: {source}")]
    Csv {
        feed: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("{feed} feed row {row}: {message}")]
    InvalidRow {
        feed: &'static str,
        row: usize,
        message: String,
    },
    #[error("duplicate id `{id}` in {feed} feed")]
    DuplicateId { feed: &'static str, id: String },
}

#[derive(Debug, Deserialize)]
struct PatientRow {
    #[serde(rename = "ID_Paciente")]
    id: String,
    #[serde(rename = "Gravedad", default)]
    severity: Option<String>,
    #[serde(rename = "Departamento", default)]
    department: Option<String>,
    #[serde(rename = "Latitud")]
    lat: f64,
    #[serde(rename = "Longitud")]
    lon: f64,
    #[serde(rename = "Enfermedad", default)]
    disease: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HospitalRow {
    #[serde(rename = "ID_Hospital")]
    id: String,
    #[serde(rename = "Nombre", default)]
    name: Option<String>,
    #[serde(rename = "Departamento", default)]
    department: Option<String>,
    #[serde(rename = "Latitud")]
    lat: f64,
    #[serde(rename = "Longitud")]
    lon: f64,
    #[serde(rename = "Especialidades", default)]
    specialties: Option<String>,
    #[serde(rename = "Capacidad", default)]
    capacity: Option<i64>,
}

#[derive(Serialize)]
struct PatientOutRow<'a> {
    #[serde(rename = "ID_Paciente")]
    id: &'a str,
    #[serde(rename = "Gravedad")]
    severity: Option<&'a str>,
    #[serde(rename = "Departamento")]
    department: Option<&'a str>,
    #[serde(rename = "Latitud")]
    lat: f64,
    #[serde(rename = "Longitud")]
    lon: f64,
    #[serde(rename = "Enfermedad")]
    disease: Option<&'a str>,
}

#[derive(Serialize)]
struct HospitalOutRow<'a> {
    #[serde(rename = "ID_Hospital")]
    id: &'a str,
    #[serde(rename = "Nombre")]
    name: Option<&'a str>,
    #[serde(rename = "Departamento")]
    department: Option<&'a str>,
    #[serde(rename = "Latitud")]
    lat: f64,
    #[serde(rename = "Longitud")]
    lon: f64,
    #[serde(rename = "Especialidades")]
    specialties: String,
    #[serde(rename = "Capacidad")]
    capacity: u32,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_specialties(cell: &str) -> Vec<String> {
    cell.split([',', ';', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_coordinates(feed: &'static str, row: usize, lat: f64, lon: f64) -> Result<(), FeedError> {
    if lat.is_finite() && lon.is_finite() {
        Ok(())
    } else {
        Err(FeedError::InvalidRow {
            feed,
            row,
            message: format!("non-finite coordinates ({lat}, {lon})"),
        })
    }
}

fn check_id(
    feed: &'static str,
    row: usize,
    id: &str,
    seen: &mut HashSet<String>,
) -> Result<(), FeedError> {
    if id.trim().is_empty() {
        return Err(FeedError::InvalidRow {
            feed,
            row,
            message: "empty id".to_string(),
        });
    }
    if !seen.insert(id.to_string()) {
        return Err(FeedError::DuplicateId {
            feed,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Parse a patient feed from any reader.
pub fn read_patients(reader: impl Read) -> Result<Vec<PatientRecord>, FeedError> {
    const FEED: &str = "patient";
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut seen = HashSet::new();
    let mut patients = Vec::new();

    for (idx, row) in rdr.deserialize::<PatientRow>().enumerate() {
        let row = row.map_err(|source| FeedError::Csv { feed: FEED, source })?;
        let line = idx + 1;
        check_id(FEED, line, &row.id, &mut seen)?;
        check_coordinates(FEED, line, row.lat, row.lon)?;

        let mut patient = PatientRecord::new(row.id, row.lat, row.lon);
        patient.severity = non_empty(row.severity);
        patient.department = non_empty(row.department);
        patient.disease = non_empty(row.disease);
        patients.push(patient);
    }
    debug!(count = patients.len(), "patients parsed");
    Ok(patients)
}

/// Parse a hospital feed from any reader. Missing or negative capacity reads
/// as zero.
pub fn read_hospitals(reader: impl Read) -> Result<Vec<HospitalRecord>, FeedError> {
    const FEED: &str = "hospital";
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut seen = HashSet::new();
    let mut hospitals = Vec::new();

    for (idx, row) in rdr.deserialize::<HospitalRow>().enumerate() {
        let row = row.map_err(|source| FeedError::Csv { feed: FEED, source })?;
        let line = idx + 1;
        check_id(FEED, line, &row.id, &mut seen)?;
        check_coordinates(FEED, line, row.lat, row.lon)?;

        let capacity = row.capacity.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32;
        let mut hospital = HospitalRecord::new(row.id, row.lat, row.lon, capacity);
        hospital.name = non_empty(row.name);
        hospital.department = non_empty(row.department);
        hospital.specialties = row
            .specialties
            .as_deref()
            .map(split_specialties)
            .unwrap_or_default();
        hospitals.push(hospital);
    }
    debug!(count = hospitals.len(), "hospitals parsed");
    Ok(hospitals)
}

/// Write patients in the feed layout read by [`read_patients`].
pub fn write_patients(writer: impl Write, patients: &[PatientRecord]) -> Result<(), FeedError> {
    const FEED: &str = "patient";
    let mut wtr = csv::Writer::from_writer(writer);
    for p in patients {
        wtr.serialize(PatientOutRow {
            id: &p.id,
            severity: p.severity.as_deref(),
            department: p.department.as_deref(),
            lat: p.lat,
            lon: p.lon,
            disease: p.disease.as_deref(),
        })
        .map_err(|source| FeedError::Csv { feed: FEED, source })?;
    }
    wtr.flush().map_err(|source| FeedError::Csv {
        feed: FEED,
        source: source.into(),
    })
}

/// Write hospitals in the feed layout read by [`read_hospitals`].
pub fn write_hospitals(writer: impl Write, hospitals: &[HospitalRecord]) -> Result<(), FeedError> {
    const FEED: &str = "hospital";
    let mut wtr = csv::Writer::from_writer(writer);
    for h in hospitals {
        wtr.serialize(HospitalOutRow {
            id: &h.id,
            name: h.name.as_deref(),
            department: h.department.as_deref(),
            lat: h.lat,
            lon: h.lon,
            specialties: h.specialties.join("; "),
            capacity: h.capacity,
        })
        .map_err(|source| FeedError::Csv { feed: FEED, source })?;
    }
    wtr.flush().map_err(|source| FeedError::Csv {
        feed: FEED,
        source: source.into(),
    })
}

fn open(path: &Path) -> Result<File, FeedError> {
    File::open(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_patients(path: impl AsRef<Path>) -> Result<Vec<PatientRecord>, FeedError> {
    read_patients(open(path.as_ref())?)
}

pub fn load_hospitals(path: impl AsRef<Path>) -> Result<Vec<HospitalRecord>, FeedError> {
    read_hospitals(open(path.as_ref())?)
}

/// Load both feeds into one store. Graph node ids must be unique across the
/// two feeds, so a patient and a hospital sharing an id is rejected.
pub fn load_store(
    patients_path: impl AsRef<Path>,
    hospitals_path: impl AsRef<Path>,
) -> Result<InMemoryStore, FeedError> {
    let patients = load_patients(patients_path)?;
    let hospitals = load_hospitals(hospitals_path)?;
    let store = store_from_records(patients, hospitals)?;
    info!(
        patients = store.patients.len(),
        hospitals = store.hospitals.len(),
        "record feeds loaded"
    );
    Ok(store)
}

/// Wrap already-parsed records, rejecting ids shared between the feeds.
pub fn store_from_records(
    patients: Vec<PatientRecord>,
    hospitals: Vec<HospitalRecord>,
) -> Result<InMemoryStore, FeedError> {
    let patient_ids: HashSet<&str> = patients.iter().map(|p| p.id.as_str()).collect();
    if let Some(clash) = hospitals.iter().find(|h| patient_ids.contains(h.id.as_str())) {
        return Err(FeedError::DuplicateId {
            feed: "hospital",
            id: clash.id.clone(),
        });
    }
    Ok(InMemoryStore::new(patients, hospitals))
}
