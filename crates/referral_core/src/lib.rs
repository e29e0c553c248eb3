pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod graph;
pub mod matching;
pub mod network;
pub mod orchestrator;
pub mod paths;
pub mod records;
pub mod report;
pub mod specialty;
pub mod timing;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use orchestrator::Orchestrator;
