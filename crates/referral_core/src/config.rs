use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::GraphPolicy;

/// Default search radius for radius graphs when comparing policies.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Specialty assumed when nothing more specific can be inferred.
pub const DEFAULT_FALLBACK_SPECIALTY: &str = "Medicina Interna";

/// Engine configuration shared by the orchestrator and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Policy used for the cached proximity graph.
    pub graph_policy: GraphPolicy,
    /// Radius used for the radius policy in policy comparisons.
    pub default_radius_km: f64,
    /// Run the assignment and network groups of a report concurrently.
    pub parallel: bool,
    /// Specialty used when the resolver has no answer for a patient.
    pub fallback_specialty: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            graph_policy: GraphPolicy::default(),
            default_radius_km: DEFAULT_RADIUS_KM,
            parallel: false,
            fallback_specialty: DEFAULT_FALLBACK_SPECIALTY.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_graph_policy(mut self, policy: GraphPolicy) -> Self {
        self.graph_policy = policy;
        self
    }

    pub fn with_default_radius_km(mut self, radius_km: f64) -> Self {
        self.default_radius_km = radius_km;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_fallback_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.fallback_specialty = specialty.into();
        self
    }

    /// Reject graph parameters that no build could use.
    pub fn validate(&self) -> Result<()> {
        self.graph_policy.validate()?;
        GraphPolicy::Radius {
            radius_km: self.default_radius_km,
        }
        .validate()
    }
}
