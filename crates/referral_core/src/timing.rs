//! Wall-clock timing for report entries and batch summaries.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Elapsed wall time in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Elapsed(pub f64);

impl Elapsed {
    pub fn from_duration(duration: Duration) -> Self {
        Self(duration.as_secs_f64() * 1_000.0)
    }

    pub fn as_ms(self) -> f64 {
        self.0
    }
}

/// Run `f` and measure how long it took.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Elapsed) {
    let start = Instant::now();
    let value = f();
    (value, Elapsed::from_duration(start.elapsed()))
}

/// Per-algorithm timing metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlgorithmTiming {
    pub total_ms: f64,
    pub call_count: u64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl AlgorithmTiming {
    pub fn record(&mut self, elapsed: Elapsed) {
        let ms = elapsed.as_ms();
        if self.call_count == 0 || ms < self.min_ms {
            self.min_ms = ms;
        }
        if ms > self.max_ms {
            self.max_ms = ms;
        }
        self.total_ms += ms;
        self.call_count += 1;
    }

    pub fn avg_ms(&self) -> f64 {
        if self.call_count == 0 {
            0.0
        } else {
            self.total_ms / self.call_count as f64
        }
    }
}

/// Aggregated timings keyed by algorithm name, in name order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlgorithmTimings {
    timings: BTreeMap<String, AlgorithmTiming>,
}

impl AlgorithmTimings {
    pub fn record(&mut self, algorithm: &str, elapsed: Elapsed) {
        self.timings
            .entry(algorithm.to_string())
            .or_default()
            .record(elapsed);
    }

    pub fn get(&self, algorithm: &str) -> Option<&AlgorithmTiming> {
        self.timings.get(algorithm)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AlgorithmTiming)> {
        self.timings.iter().map(|(name, timing)| (name.as_str(), timing))
    }

    /// Fold another set of timings into this one.
    pub fn merge(&mut self, other: &AlgorithmTimings) {
        for (name, timing) in &other.timings {
            let entry = self.timings.entry(name.clone()).or_default();
            if entry.call_count == 0 || (timing.call_count > 0 && timing.min_ms < entry.min_ms) {
                entry.min_ms = timing.min_ms;
            }
            entry.max_ms = entry.max_ms.max(timing.max_ms);
            entry.total_ms += timing.total_ms;
            entry.call_count += timing.call_count;
        }
    }
}
