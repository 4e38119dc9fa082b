//! Strict linearity check
//!
//! A graph is linear when it is a single simple path covering every node: one
//! start, one end, and every node with exactly the in/out degree such a path
//! implies. Degrees are checked over all nodes, so extra components fail even
//! when they are unreachable from the start.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Adjacency;
use crate::aggregate::GraphSnapshot;
use crate::value_objects::NodeId;

/// Why a graph is not linear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotLinearReason {
    /// There is nothing to sequence
    #[error("the graph has no clips")]
    Empty,
    /// Not exactly one node without incoming edges
    #[error("expected exactly one starting clip, found {count}")]
    StartCount { count: usize },
    /// Not exactly one node without outgoing edges
    #[error("expected exactly one ending clip, found {count}")]
    EndCount { count: usize },
    /// A node branches or merges
    #[error("clip {node_id} has {in_degree} incoming and {out_degree} outgoing connections")]
    Degree {
        node_id: NodeId,
        in_degree: usize,
        out_degree: usize,
    },
    /// Walking from the start does not reach every node
    #[error("only {visited} of {total} clips are reachable from the start")]
    Unreachable { visited: usize, total: usize },
}

/// Outcome of the linearity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Linearity {
    /// Every node in playback order
    Linear { order: Vec<NodeId> },
    NotLinear { reason: NotLinearReason },
}

impl Linearity {
    pub fn is_linear(&self) -> bool {
        matches!(self, Linearity::Linear { .. })
    }

    /// The full order when linear
    pub fn order(&self) -> Option<&[NodeId]> {
        match self {
            Linearity::Linear { order } => Some(order),
            Linearity::NotLinear { .. } => None,
        }
    }

    fn not_linear(reason: NotLinearReason) -> Self {
        Linearity::NotLinear { reason }
    }
}

/// Decide whether the whole snapshot forms one simple path
pub fn check_linearity(snapshot: &GraphSnapshot) -> Linearity {
    let adjacency = Adjacency::new(snapshot);
    if adjacency.is_empty() {
        return Linearity::not_linear(NotLinearReason::Empty);
    }

    let starts = adjacency.sources();
    if starts.len() != 1 {
        return Linearity::not_linear(NotLinearReason::StartCount { count: starts.len() });
    }
    let ends = adjacency.sinks();
    if ends.len() != 1 {
        return Linearity::not_linear(NotLinearReason::EndCount { count: ends.len() });
    }
    let (start, end) = (starts[0], ends[0]);

    for (node_id, entry) in adjacency.iter() {
        let expected_in = usize::from(node_id != start);
        let expected_out = usize::from(node_id != end);
        if entry.in_degree != expected_in || entry.successors.len() != expected_out {
            return Linearity::not_linear(NotLinearReason::Degree {
                node_id: node_id.clone(),
                in_degree: entry.in_degree,
                out_degree: entry.successors.len(),
            });
        }
    }

    let mut order = vec![start];
    let mut visited = HashSet::from([start]);
    let mut current = start;
    while let Some(&next) = adjacency.successors(current).first() {
        if !visited.insert(next) {
            break;
        }
        order.push(next);
        current = next;
    }

    if order.len() != adjacency.len() {
        return Linearity::not_linear(NotLinearReason::Unreachable {
            visited: order.len(),
            total: adjacency.len(),
        });
    }

    Linearity::Linear {
        order: order.into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{ids, snapshot};

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     LC[Linearity Checker] --> L[Linear Chains]
    ///     LC --> S[Start/End Counts]
    ///     LC --> D[Degree Violations]
    ///     LC --> U[Disjoint Cycles]
    /// ```

    fn reason(linearity: Linearity) -> NotLinearReason {
        match linearity {
            Linearity::NotLinear { reason } => reason,
            Linearity::Linear { order } => panic!("Expected not linear, got {order:?}"),
        }
    }

    #[test]
    fn test_single_node_is_linear() {
        let result = check_linearity(&snapshot(&["a"], &[]));
        assert_eq!(result.order(), Some(ids(&["a"]).as_slice()));
    }

    #[test]
    fn test_chain_is_linear_in_edge_order() {
        let result = check_linearity(&snapshot(&["b", "c", "a"], &[("b", "c"), ("a", "b")]));
        assert_eq!(result.order(), Some(ids(&["a", "b", "c"]).as_slice()));
    }

    #[test]
    fn test_empty_graph_is_not_linear() {
        assert_eq!(reason(check_linearity(&snapshot(&[], &[]))), NotLinearReason::Empty);
    }

    #[test]
    fn test_branch_is_not_linear() {
        let result = check_linearity(&snapshot(&["a", "b", "c"], &[("a", "b"), ("a", "c")]));
        assert_eq!(reason(result), NotLinearReason::EndCount { count: 2 });
    }

    #[test]
    fn test_two_starts_are_not_linear() {
        let result = check_linearity(&snapshot(
            &["a", "x", "b", "c"],
            &[("a", "b"), ("x", "b"), ("b", "c")],
        ));
        assert_eq!(reason(result), NotLinearReason::StartCount { count: 2 });
    }

    #[test]
    fn test_full_cycle_is_not_linear() {
        let result = check_linearity(&snapshot(&["a", "b"], &[("a", "b"), ("b", "a")]));
        assert_eq!(reason(result), NotLinearReason::StartCount { count: 0 });
    }

    #[test]
    fn test_merge_and_split_is_not_linear() {
        // a -> b -> d and a -> c -> d, plus d -> e: one start, one end, but branching
        let result = check_linearity(&snapshot(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("d", "e")],
        ));
        assert!(matches!(reason(result), NotLinearReason::Degree { .. }));
    }

    #[test]
    fn test_disjoint_cycle_is_not_linear() {
        let result = check_linearity(&snapshot(
            &["a", "b", "x", "y"],
            &[("a", "b"), ("x", "y"), ("y", "x")],
        ));
        assert_eq!(reason(result), NotLinearReason::Unreachable { visited: 2, total: 4 });
    }

    #[test]
    fn test_reason_display() {
        let reason = NotLinearReason::StartCount { count: 3 };
        assert!(reason.to_string().contains("found 3"));
    }
}
