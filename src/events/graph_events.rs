//! Clip graph domain events

use serde::{Deserialize, Serialize};

use crate::value_objects::{EdgeId, NodeId, Orientation, Position2D};

/// Node added event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAdded {
    /// The node that was added, equal to its clip id
    pub node_id: NodeId,
    /// Where the node was placed
    pub position: Position2D,
}

/// Node removed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRemoved {
    /// The ID of the node that was removed
    pub node_id: NodeId,
}

/// Node moved event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMoved {
    pub node_id: NodeId,
    pub position: Position2D,
}

/// Edge added event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAdded {
    /// The unique identifier of the edge
    pub edge_id: EdgeId,
    /// The clip that plays first
    pub source_id: NodeId,
    /// The clip that plays after the source
    pub target_id: NodeId,
}

/// Edge removed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRemoved {
    /// The ID of the edge that was removed
    pub edge_id: EdgeId,
}

/// Every edge of the graph was removed at once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgesCleared {
    pub edge_ids: Vec<EdgeId>,
}

/// The node order was permuted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodesReordered {
    /// The new node order
    pub order: Vec<NodeId>,
    /// Whether the order came from a random shuffle
    pub shuffled: bool,
}

/// Nodes were repositioned along a chain without touching edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodesArranged {
    pub orientation: Orientation,
    pub order: Vec<NodeId>,
}

/// A fresh chain of edges was built over the node order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainBuilt {
    pub orientation: Orientation,
    /// Nodes in chain order
    pub order: Vec<NodeId>,
    /// Edges of the chain, `order[i] -> order[i + 1]`
    pub edge_ids: Vec<EdgeId>,
}
