//! Seam for inferring the medical specialty a patient needs.
//!
//! The engine ships no keyword table; deployments plug in their own resolver.

use crate::records::PatientRecord;

pub trait SpecialtyResolver: Send + Sync {
    /// Specialty for `patient`, or `None` to use the configured fallback.
    fn resolve(&self, patient: &PatientRecord) -> Option<String>;
}

impl<F> SpecialtyResolver for F
where
    F: Fn(&PatientRecord) -> Option<String> + Send + Sync,
{
    fn resolve(&self, patient: &PatientRecord) -> Option<String> {
        self(patient)
    }
}

/// Resolver that never infers anything, so every patient gets the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInference;

impl SpecialtyResolver for NoInference {
    fn resolve(&self, _patient: &PatientRecord) -> Option<String> {
        None
    }
}

/// Ordered `(keyword, specialty)` pairs matched as lowercase substrings of the
/// patient's disease text. The first matching keyword wins.
#[derive(Debug, Clone, Default)]
pub struct KeywordResolver {
    rules: Vec<(String, String)>,
}

impl KeywordResolver {
    pub fn new<I, K, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(keyword, specialty)| (keyword.into().to_lowercase(), specialty.into()))
                .collect(),
        }
    }
}

impl SpecialtyResolver for KeywordResolver {
    fn resolve(&self, patient: &PatientRecord) -> Option<String> {
        let disease = patient.disease.as_deref()?.to_lowercase();
        self.rules
            .iter()
            .find(|(keyword, _)| disease.contains(keyword.as_str()))
            .map(|(_, specialty)| specialty.clone())
    }
}
