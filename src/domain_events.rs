//! Domain events enum for the clip graph domain

use crate::events::{
    ChainBuilt, EdgeAdded, EdgeRemoved, EdgesCleared, NodeAdded, NodeMoved, NodeRemoved,
    NodesArranged, NodesReordered,
};
use serde::{Deserialize, Serialize};

/// Enum wrapper for clip graph domain events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphDomainEvent {
    /// A clip node was added
    NodeAdded(NodeAdded),
    /// A clip node was removed
    NodeRemoved(NodeRemoved),
    /// A clip node was moved
    NodeMoved(NodeMoved),
    /// An edge was added between nodes
    EdgeAdded(EdgeAdded),
    /// An edge was removed from the graph
    EdgeRemoved(EdgeRemoved),
    /// All edges were removed
    EdgesCleared(EdgesCleared),
    /// The node order changed
    NodesReordered(NodesReordered),
    /// Nodes were laid out along a chain
    NodesArranged(NodesArranged),
    /// A chain of edges replaced the previous edge set
    ChainBuilt(ChainBuilt),
}

impl GraphDomainEvent {
    /// Dotted subject the event is published under
    pub fn subject(&self) -> &'static str {
        match self {
            Self::NodeAdded(_) => "clipgraph.node.added.v1",
            Self::NodeRemoved(_) => "clipgraph.node.removed.v1",
            Self::NodeMoved(_) => "clipgraph.node.moved.v1",
            Self::EdgeAdded(_) => "clipgraph.edge.added.v1",
            Self::EdgeRemoved(_) => "clipgraph.edge.removed.v1",
            Self::EdgesCleared(_) => "clipgraph.edges.cleared.v1",
            Self::NodesReordered(_) => "clipgraph.nodes.reordered.v1",
            Self::NodesArranged(_) => "clipgraph.nodes.arranged.v1",
            Self::ChainBuilt(_) => "clipgraph.chain.built.v1",
        }
    }

    /// Whether the event changes node or edge membership.
    ///
    /// Moves and arrangements only touch positions.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::NodeMoved(_) | Self::NodesArranged(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{NodeId, Position2D};

    #[test]
    fn test_event_classification() {
        let added = GraphDomainEvent::NodeAdded(NodeAdded {
            node_id: NodeId::new("a"),
            position: Position2D::default(),
        });
        let moved = GraphDomainEvent::NodeMoved(NodeMoved {
            node_id: NodeId::new("a"),
            position: Position2D::new(1.0, 1.0),
        });

        assert!(added.is_structural());
        assert!(!moved.is_structural());
        assert_eq!(added.subject(), "clipgraph.node.added.v1");
        assert_eq!(moved.subject(), "clipgraph.node.moved.v1");
    }
}
