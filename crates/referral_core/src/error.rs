//! Error taxonomy for the referral engine.
//!
//! "No route" and "no assignment" are ordinary outcomes and are represented as
//! values ([`crate::paths::PathResult::NoRoute`], an absent assignment), never
//! as errors.

use std::fmt;

/// Which record feed an unknown id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Patient,
    Hospital,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Patient => f.write_str("patient"),
            RecordKind::Hospital => f.write_str("hospital"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: RecordKind, id: String },
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: String },
    #[error("capacity network has no reverse residual entry for {to} -> {from}")]
    MalformedNetwork { from: String, to: String },
}

impl EngineError {
    pub fn patient_not_found(id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind: RecordKind::Patient,
            id: id.into(),
        }
    }

    /// True for the caller-visible "not found" outcome; everything else is fatal
    /// for the request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
