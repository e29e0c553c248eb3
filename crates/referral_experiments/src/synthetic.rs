//! Seeded synthetic patient and hospital datasets for benchmarking.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use referral_core::records::{HospitalRecord, PatientRecord};
use serde::{Deserialize, Serialize};

const SPECIALTIES: &[&str] = &[
    "Medicina Interna",
    "Traumatología",
    "Cardiología",
    "Pediatría",
    "Neumología",
    "Nefrología",
];

const DISEASES: &[&str] = &[
    "Fractura de radio",
    "Luxación de hombro",
    "Infarto agudo de miocardio",
    "Hipertensión arterial",
    "Neumonía",
    "Broncoespasmo",
    "Insuficiencia renal",
    "Fiebre persistente",
];

const SEVERITIES: &[&str] = &["Baja", "Media", "Alta"];

/// Default bounding box: metropolitan Lima and Callao (approx).
const DEFAULT_LAT_MIN: f64 = -12.25;
const DEFAULT_LAT_MAX: f64 = -11.85;
const DEFAULT_LON_MIN: f64 = -77.17;
const DEFAULT_LON_MAX: f64 = -76.85;

/// Points west of this longitude are labelled Callao, the rest Lima.
const CALLAO_LON_MAX: f64 = -77.09;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lon_min: DEFAULT_LON_MIN,
            lon_max: DEFAULT_LON_MAX,
        }
    }
}

impl BoundingBox {
    /// Same box with each axis ordered `min <= max`.
    pub fn normalized(self) -> Self {
        Self {
            lat_min: self.lat_min.min(self.lat_max),
            lat_max: self.lat_min.max(self.lat_max),
            lon_min: self.lon_min.min(self.lon_max),
            lon_max: self.lon_min.max(self.lon_max),
        }
    }
}

/// Parameters for one synthetic dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticParams {
    pub num_patients: usize,
    pub num_hospitals: usize,
    pub seed: u64,
    pub bounds: BoundingBox,
    /// Hospital capacity is drawn from `1..=max_capacity`.
    pub max_capacity: u32,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            num_patients: 100,
            num_hospitals: 20,
            seed: 42,
            bounds: BoundingBox::default(),
            max_capacity: 5,
        }
    }
}

impl SyntheticParams {
    pub fn with_patients(mut self, count: usize) -> Self {
        self.num_patients = count;
        self
    }

    pub fn with_hospitals(mut self, count: usize) -> Self {
        self.num_hospitals = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

fn department_for(lon: f64) -> &'static str {
    if lon < CALLAO_LON_MAX {
        "Callao"
    } else {
        "Lima"
    }
}

fn random_point(rng: &mut StdRng, bounds: &BoundingBox) -> (f64, f64) {
    (
        rng.gen_range(bounds.lat_min..=bounds.lat_max),
        rng.gen_range(bounds.lon_min..=bounds.lon_max),
    )
}

/// Generate a dataset. The same parameters always yield the same records.
pub fn generate(params: &SyntheticParams) -> (Vec<PatientRecord>, Vec<HospitalRecord>) {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let bounds = params.bounds.normalized();
    let max_capacity = params.max_capacity.max(1);

    let patients = (0..params.num_patients)
        .map(|i| {
            let (lat, lon) = random_point(&mut rng, &bounds);
            let mut patient = PatientRecord::new(format!("P{:04}", i + 1), lat, lon)
                .with_department(department_for(lon));
            if let Some(disease) = DISEASES.choose(&mut rng) {
                patient = patient.with_disease(*disease);
            }
            if let Some(severity) = SEVERITIES.choose(&mut rng) {
                patient = patient.with_severity(*severity);
            }
            patient
        })
        .collect();

    let hospitals = (0..params.num_hospitals)
        .map(|i| {
            let (lat, lon) = random_point(&mut rng, &bounds);
            let offered = rng.gen_range(1..=3);
            let specialties: Vec<&str> = SPECIALTIES
                .choose_multiple(&mut rng, offered)
                .copied()
                .collect();
            HospitalRecord::new(format!("H{:03}", i + 1), lat, lon, rng.gen_range(1..=max_capacity))
                .with_name(format!("Hospital {}", i + 1))
                .with_department(department_for(lon))
                .with_specialties(specialties)
        })
        .collect();

    (patients, hospitals)
}
