//! Clip graph queries
//!
//! Queries are pure functions over a [`GraphSnapshot`]. They never fail: every graph
//! shape, including empty, cyclic and disconnected graphs, maps to a well-defined
//! result value.

mod linearity;
mod path_finder;
mod status;

pub use linearity::*;
pub use path_finder::*;
pub use status::*;

use indexmap::IndexMap;

use crate::aggregate::GraphSnapshot;
use crate::value_objects::NodeId;

/// Degree and adjacency information for every node of a snapshot.
///
/// Nodes keep snapshot order and successors keep edge insertion order. Edges whose
/// endpoints are missing from the snapshot are ignored.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency<'a> {
    entries: IndexMap<&'a NodeId, AdjacencyEntry<'a>>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AdjacencyEntry<'a> {
    pub in_degree: usize,
    pub successors: Vec<&'a NodeId>,
}

impl<'a> Adjacency<'a> {
    pub fn new(snapshot: &'a GraphSnapshot) -> Self {
        let mut entries: IndexMap<&NodeId, AdjacencyEntry> = snapshot
            .nodes
            .iter()
            .map(|node| (&node.id, AdjacencyEntry::default()))
            .collect();

        for edge in &snapshot.edges {
            if !entries.contains_key(&edge.source) || !entries.contains_key(&edge.target) {
                continue;
            }
            if let Some(entry) = entries.get_mut(&edge.source) {
                entry.successors.push(&edge.target);
            }
            if let Some(entry) = entries.get_mut(&edge.target) {
                entry.in_degree += 1;
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a NodeId, &AdjacencyEntry<'a>)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn successors(&self, node_id: &NodeId) -> &[&'a NodeId] {
        self.entries
            .get(node_id)
            .map(|entry| entry.successors.as_slice())
            .unwrap_or_default()
    }

    /// Nodes without incoming edges, in snapshot order
    pub fn sources(&self) -> Vec<&'a NodeId> {
        self.iter()
            .filter(|(_, entry)| entry.in_degree == 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Nodes without outgoing edges, in snapshot order
    pub fn sinks(&self) -> Vec<&'a NodeId> {
        self.iter()
            .filter(|(_, entry)| entry.successors.is_empty())
            .map(|(id, _)| id)
            .collect()
    }
}
