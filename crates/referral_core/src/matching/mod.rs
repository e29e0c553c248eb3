pub mod algorithm;
pub mod greedy;
pub mod hungarian;
pub mod min_cost_flow;
pub mod types;

use serde::{Deserialize, Serialize};

pub use algorithm::AssignmentAlgorithm;
pub use greedy::GreedyAssignment;
pub use hungarian::HungarianAssignment;
pub use min_cost_flow::MinCostFlowAssignment;
pub use types::{total_distance_km, Assignment, COST_SCALE};

/// Which assignment algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentAlgorithmKind {
    Greedy,
    Hungarian,
    MinCostFlow,
}

impl AssignmentAlgorithmKind {
    /// Report order.
    pub const ALL: [AssignmentAlgorithmKind; 3] = [
        AssignmentAlgorithmKind::Greedy,
        AssignmentAlgorithmKind::Hungarian,
        AssignmentAlgorithmKind::MinCostFlow,
    ];

    /// Order in which a single final placement is attempted: optimal
    /// solvers first, greedy last.
    pub const PREFERENCE: [AssignmentAlgorithmKind; 3] = [
        AssignmentAlgorithmKind::MinCostFlow,
        AssignmentAlgorithmKind::Hungarian,
        AssignmentAlgorithmKind::Greedy,
    ];

    pub fn create(self) -> Box<dyn AssignmentAlgorithm> {
        match self {
            AssignmentAlgorithmKind::Greedy => Box::new(GreedyAssignment),
            AssignmentAlgorithmKind::Hungarian => Box::new(HungarianAssignment),
            AssignmentAlgorithmKind::MinCostFlow => Box::new(MinCostFlowAssignment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_named_algorithms() {
        let names: Vec<_> = AssignmentAlgorithmKind::ALL
            .iter()
            .map(|kind| kind.create().name())
            .collect();
        assert_eq!(names, ["Greedy", "Hungarian", "Min-Cost Max-Flow"]);
    }
}
