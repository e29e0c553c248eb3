//! Explicit proximity-graph cache owned by the orchestrator.
//!
//! The graph is built lazily from a full record snapshot and shared as an
//! `Arc<Graph>`. Each generation is built at most once: the build runs while
//! the lock is held, so concurrent callers wait for the first build instead
//! of starting their own.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::Result;
use crate::graph::{self, Graph, GraphPolicy};
use crate::records::RecordStore;
use crate::timing::timed;

#[derive(Debug, Default)]
struct CacheState {
    graph: Option<Arc<Graph>>,
    generation: u64,
    builds: u64,
}

#[derive(Debug)]
pub struct GraphCache {
    policy: GraphPolicy,
    state: Mutex<CacheState>,
}

impl GraphCache {
    pub fn new(policy: GraphPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn policy(&self) -> GraphPolicy {
        self.policy
    }

    /// Bumped by every [`invalidate`](Self::invalidate) and
    /// [`rebuild`](Self::rebuild).
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Number of graph builds performed so far.
    pub fn build_count(&self) -> u64 {
        self.lock().builds
    }

    pub fn is_built(&self) -> bool {
        self.lock().graph.is_some()
    }

    /// Cached graph for the current generation, building it from `store`
    /// when absent.
    pub fn get_or_build(&self, store: &dyn RecordStore) -> Result<Arc<Graph>> {
        let mut state = self.lock();
        if let Some(graph) = &state.graph {
            debug!(generation = state.generation, "graph cache hit");
            return Ok(Arc::clone(graph));
        }
        self.build_locked(&mut state, store)
    }

    /// Drop the cached graph; the next read rebuilds it.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.graph = None;
        state.generation += 1;
        debug!(generation = state.generation, "graph cache invalidated");
    }

    /// Start a new generation and build it immediately.
    pub fn rebuild(&self, store: &dyn RecordStore) -> Result<Arc<Graph>> {
        let mut state = self.lock();
        state.graph = None;
        state.generation += 1;
        self.build_locked(&mut state, store)
    }

    fn build_locked(&self, state: &mut CacheState, store: &dyn RecordStore) -> Result<Arc<Graph>> {
        let nodes = store.node_snapshot();
        let (graph, elapsed) = timed(|| graph::build(&nodes, self.policy));
        let graph = Arc::new(graph?);
        state.graph = Some(Arc::clone(&graph));
        state.builds += 1;
        info!(
            policy = %self.policy,
            generation = state.generation,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            elapsed_ms = elapsed.as_ms(),
            "proximity graph built"
        );
        Ok(graph)
    }

    // A panic during a build leaves `graph` as `None`, so the state is still
    // consistent after poisoning.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::records::{HospitalRecord, InMemoryStore, PatientRecord};

    fn store() -> InMemoryStore {
        InMemoryStore::new(
            vec![
                PatientRecord::new("P1", -12.05, -77.04),
                PatientRecord::new("P2", -12.10, -77.03),
            ],
            vec![HospitalRecord::new("H1", -12.06, -77.05, 2)],
        )
    }

    #[test]
    fn builds_once_per_generation() {
        let cache = GraphCache::new(GraphPolicy::Knn { k: 2 });
        let store = store();
        assert!(!cache.is_built());

        let first = cache.get_or_build(&store).unwrap();
        let second = cache.get_or_build(&store).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 1);
        assert_eq!(first.node_count(), 3);
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let cache = GraphCache::new(GraphPolicy::Knn { k: 1 });
        let mut store = store();
        cache.get_or_build(&store).unwrap();

        store.patients.push(PatientRecord::new("P3", -12.2, -77.0));
        assert_eq!(cache.get_or_build(&store).unwrap().node_count(), 3);

        cache.invalidate();
        assert_eq!(cache.generation(), 1);
        assert_eq!(cache.get_or_build(&store).unwrap().node_count(), 4);
        assert_eq!(cache.build_count(), 2);
    }

    #[test]
    fn rebuild_bumps_generation_and_builds_eagerly() {
        let cache = GraphCache::new(GraphPolicy::BipartiteKnn { k: 1 });
        let store = store();
        let graph = cache.rebuild(&store).unwrap();
        assert_eq!(cache.generation(), 1);
        assert!(cache.is_built());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn invalid_policy_leaves_cache_empty() {
        let cache = GraphCache::new(GraphPolicy::Knn { k: 0 });
        let err = cache.get_or_build(&store()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { name: "k", .. }));
        assert!(!cache.is_built());
        assert_eq!(cache.build_count(), 0);
    }
}
