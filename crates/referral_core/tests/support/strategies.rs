#![allow(dead_code)]

use proptest::prelude::*;
use referral_core::geo::{GeoPoint, NodeKind};
use referral_core::records::{HospitalRecord, PatientRecord};

/// Coordinates inside a box around metropolitan Lima.
fn lat() -> impl Strategy<Value = f64> {
    -12.30..-11.80f64
}

fn lon() -> impl Strategy<Value = f64> {
    -77.30..-76.80f64
}

/// Snapshot of up to `max` nodes with unique ids and mixed kinds.
pub fn snapshot(max: usize) -> impl Strategy<Value = Vec<GeoPoint>> {
    prop::collection::vec((lat(), lon(), any::<bool>()), 0..=max).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (lat, lon, is_patient))| {
                let kind = if is_patient {
                    NodeKind::Patient
                } else {
                    NodeKind::Hospital
                };
                GeoPoint::new(format!("N{i}"), lat, lon, kind)
            })
            .collect()
    })
}

pub fn patients(max: usize) -> impl Strategy<Value = Vec<PatientRecord>> {
    prop::collection::vec((lat(), lon()), 0..=max).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (lat, lon))| PatientRecord::new(format!("P{i}"), lat, lon))
            .collect()
    })
}

pub fn hospitals(max: usize) -> impl Strategy<Value = Vec<HospitalRecord>> {
    prop::collection::vec((lat(), lon(), 0u32..=3), 0..=max).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (lat, lon, capacity))| {
                HospitalRecord::new(format!("H{i}"), lat, lon, capacity)
            })
            .collect()
    })
}
