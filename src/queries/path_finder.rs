//! Best-effort canonical ordering
//!
//! Walks one path from every source candidate (a node without incoming edges),
//! always following the first inserted outgoing edge, and keeps the longest path.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Adjacency;
use crate::aggregate::GraphSnapshot;
use crate::value_objects::NodeId;

/// Outcome of the canonical path search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalPath {
    /// The graph has no nodes
    Empty,
    /// Every node has an incoming edge, so no path can start anywhere.
    /// All nodes are reported as `rest`.
    NoValidStart { rest: Vec<NodeId> },
    /// The longest candidate path and every node not on it
    Found { path: Vec<NodeId>, rest: Vec<NodeId> },
}

impl CanonicalPath {
    /// The canonical path, empty unless one was found
    pub fn path(&self) -> &[NodeId] {
        match self {
            CanonicalPath::Found { path, .. } => path,
            _ => &[],
        }
    }

    /// Nodes outside the canonical path
    pub fn rest(&self) -> &[NodeId] {
        match self {
            CanonicalPath::Empty => &[],
            CanonicalPath::NoValidStart { rest } | CanonicalPath::Found { rest, .. } => rest,
        }
    }

    pub fn has_valid_start(&self) -> bool {
        !matches!(self, CanonicalPath::NoValidStart { .. })
    }

    pub fn into_parts(self) -> (Vec<NodeId>, Vec<NodeId>) {
        match self {
            CanonicalPath::Empty => (Vec::new(), Vec::new()),
            CanonicalPath::NoValidStart { rest } => (Vec::new(), rest),
            CanonicalPath::Found { path, rest } => (path, rest),
        }
    }
}

/// The maximal path from every source candidate, in candidate order
pub fn candidate_paths(snapshot: &GraphSnapshot) -> Vec<Vec<NodeId>> {
    let adjacency = Adjacency::new(snapshot);
    adjacency
        .sources()
        .into_iter()
        .map(|candidate| walk(&adjacency, candidate).into_iter().cloned().collect())
        .collect()
}

/// Select the canonical path of a snapshot.
///
/// The longest candidate path by node count wins; on a tie the candidate that comes
/// first in node order is kept. The result only depends on the snapshot.
pub fn find_canonical_path(snapshot: &GraphSnapshot) -> CanonicalPath {
    let adjacency = Adjacency::new(snapshot);
    if adjacency.is_empty() {
        return CanonicalPath::Empty;
    }

    let candidates = adjacency.sources();
    if candidates.is_empty() {
        return CanonicalPath::NoValidStart {
            rest: snapshot.node_ids(),
        };
    }

    let mut longest: Vec<&NodeId> = Vec::new();
    for candidate in candidates {
        let path = walk(&adjacency, candidate);
        if path.len() > longest.len() {
            longest = path;
        }
    }

    let on_path: HashSet<&NodeId> = longest.iter().copied().collect();
    let rest = snapshot
        .nodes
        .iter()
        .map(|node| &node.id)
        .filter(|id| !on_path.contains(id))
        .cloned()
        .collect();

    CanonicalPath::Found {
        path: longest.into_iter().cloned().collect(),
        rest,
    }
}

/// Follow first outgoing edges from `start` until a dead end or a node already on
/// the path
fn walk<'a>(adjacency: &Adjacency<'a>, start: &'a NodeId) -> Vec<&'a NodeId> {
    let mut path = vec![start];
    let mut visited = HashSet::from([start]);
    let mut current = start;

    while let Some(&next) = adjacency.successors(current).first() {
        if !visited.insert(next) {
            break;
        }
        path.push(next);
        current = next;
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{ids, snapshot};

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     PF[Path Finder] --> E[Empty Graph]
    ///     PF --> C[Chains]
    ///     PF --> B[Branches]
    ///     PF --> CY[Cycles]
    ///     PF --> T[Tie Break]
    /// ```

    #[test]
    fn test_empty_graph() {
        let result = find_canonical_path(&snapshot(&[], &[]));
        assert_eq!(result, CanonicalPath::Empty);
        assert!(result.path().is_empty());
        assert!(result.rest().is_empty());
    }

    #[test]
    fn test_nodes_without_edges() {
        let result = find_canonical_path(&snapshot(&["a", "b", "c"], &[]));
        assert_eq!(result.path(), ids(&["a"]).as_slice());
        assert_eq!(result.rest(), ids(&["b", "c"]).as_slice());
    }

    #[test]
    fn test_chain_is_canonical() {
        let result = find_canonical_path(&snapshot(
            &["c", "a", "b"],
            &[("a", "b"), ("b", "c")],
        ));
        assert_eq!(result.path(), ids(&["a", "b", "c"]).as_slice());
        assert!(result.rest().is_empty());
    }

    #[test]
    fn test_branch_follows_first_inserted_edge() {
        let first_b = find_canonical_path(&snapshot(&["a", "b", "c"], &[("a", "b"), ("a", "c")]));
        assert_eq!(first_b.path(), ids(&["a", "b"]).as_slice());
        assert_eq!(first_b.rest(), ids(&["c"]).as_slice());

        let first_c = find_canonical_path(&snapshot(&["a", "b", "c"], &[("a", "c"), ("a", "b")]));
        assert_eq!(first_c.path(), ids(&["a", "c"]).as_slice());
        assert_eq!(first_c.rest(), ids(&["b"]).as_slice());
    }

    #[test]
    fn test_longest_candidate_wins() {
        let result = find_canonical_path(&snapshot(
            &["x", "a", "b", "c"],
            &[("a", "b"), ("b", "c")],
        ));
        assert_eq!(result.path(), ids(&["a", "b", "c"]).as_slice());
        assert_eq!(result.rest(), ids(&["x"]).as_slice());
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let result = find_canonical_path(&snapshot(
            &["c", "d", "a", "b"],
            &[("a", "b"), ("c", "d")],
        ));
        assert_eq!(result.path(), ids(&["c", "d"]).as_slice());
        assert_eq!(result.rest(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_full_cycle_has_no_valid_start() {
        let result = find_canonical_path(&snapshot(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "a")],
        ));
        assert_eq!(result, CanonicalPath::NoValidStart { rest: ids(&["a", "b", "c"]) });
        assert!(!result.has_valid_start());
    }

    #[test]
    fn test_cycle_reachable_from_source_terminates() {
        let result = find_canonical_path(&snapshot(
            &["s", "a", "b"],
            &[("s", "a"), ("a", "b"), ("b", "a")],
        ));
        assert_eq!(result.path(), ids(&["s", "a", "b"]).as_slice());
    }

    #[test]
    fn test_candidate_paths() {
        let paths = candidate_paths(&snapshot(&["a", "b", "c"], &[("a", "b")]));
        assert_eq!(paths, vec![ids(&["a", "b"]), ids(&["c"])]);
    }

    #[test]
    fn test_idempotent() {
        let graph = snapshot(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d"), ("b", "d")]);
        assert_eq!(find_canonical_path(&graph), find_canonical_path(&graph));
    }
}
