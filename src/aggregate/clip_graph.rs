//! Clip Graph Aggregate
//!
//! The authoritative container for the clip nodes and "plays after" edges of one
//! editing session. Nodes and edges live in insertion-ordered maps keyed by id;
//! edges refer to nodes by id only.
//!
//! Every mutation is applied in full or not at all and returns the events it
//! committed. A mutation that changes nothing returns no events.

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clip::ClipRecord;
use crate::commands::{GraphCommand, GraphCommandError, GraphCommandResult};
use crate::domain_events::GraphDomainEvent;
use crate::events::{
    ChainBuilt, EdgeAdded, EdgeRemoved, EdgesCleared, NodeAdded, NodeMoved, NodeRemoved,
    NodesArranged, NodesReordered,
};
use crate::layout;
use crate::queries::find_canonical_path;
use crate::value_objects::{EdgeId, NodeId, Orientation, Position2D};

/// A clip placed in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub data: ClipRecord,
    pub position: Position2D,
}

/// A directed "plays after" connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    /// Create the edge `source -> target` with its derived id
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
        }
    }
}

/// Read-only copy of a graph's nodes and edges, both in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == node_id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id.clone()).collect()
    }

    /// The clips of `order`, skipping ids that are not in the snapshot
    pub fn clips_for(&self, order: &[NodeId]) -> Vec<ClipRecord> {
        order
            .iter()
            .filter_map(|id| self.node(id))
            .map(|node| node.data.clone())
            .collect()
    }
}

/// The clip graph of one editing session
#[derive(Debug, Clone, Default)]
pub struct ClipGraph {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    /// Number of nodes ever inserted, used to derive default positions
    insertions: usize,
}

impl ClipGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn contains_edge(&self, edge_id: &EdgeId) -> bool {
        self.edges.contains_key(edge_id)
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id)
    }

    /// Nodes in their current order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Copy of the current nodes and edges
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }

    /// Add a node for `clip` unless one already exists.
    ///
    /// Without an explicit position the node is placed in a vertical stack by its
    /// insertion index, which never reuses a slot even after removals.
    pub fn add_node(&mut self, clip: ClipRecord, position: Option<Position2D>) -> Vec<GraphDomainEvent> {
        let node_id = clip.node_id();
        if self.nodes.contains_key(&node_id) {
            return Vec::new();
        }

        let position = position
            .unwrap_or_else(|| layout::compute_position(self.insertions, Orientation::Vertical));
        self.insertions += 1;
        self.nodes.insert(
            node_id.clone(),
            Node {
                id: node_id.clone(),
                data: clip,
                position,
            },
        );
        tracing::debug!("Node added: {} at {:?}", node_id, position);

        vec![GraphDomainEvent::NodeAdded(NodeAdded { node_id, position })]
    }

    /// Remove a node together with every edge touching it
    pub fn remove_node(&mut self, node_id: &NodeId) -> Vec<GraphDomainEvent> {
        if self.nodes.shift_remove(node_id).is_none() {
            return Vec::new();
        }

        let mut events = Vec::new();
        self.edges.retain(|edge_id, edge| {
            let touches = &edge.source == node_id || &edge.target == node_id;
            if touches {
                events.push(GraphDomainEvent::EdgeRemoved(EdgeRemoved {
                    edge_id: edge_id.clone(),
                }));
            }
            !touches
        });
        tracing::debug!("Node removed: {} ({} edges cascaded)", node_id, events.len());

        events.push(GraphDomainEvent::NodeRemoved(NodeRemoved {
            node_id: node_id.clone(),
        }));
        events
    }

    /// Connect `source_id -> target_id`.
    ///
    /// Rejects self-loops, missing endpoints and duplicate edges without changing
    /// the graph.
    pub fn connect(
        &mut self,
        source_id: NodeId,
        target_id: NodeId,
    ) -> GraphCommandResult<Vec<GraphDomainEvent>> {
        if source_id == target_id {
            return Err(GraphCommandError::SelfLoop(source_id));
        }
        if !self.nodes.contains_key(&source_id) {
            return Err(GraphCommandError::NodeNotFound(source_id));
        }
        if !self.nodes.contains_key(&target_id) {
            return Err(GraphCommandError::NodeNotFound(target_id));
        }

        let edge = Edge::new(source_id, target_id);
        if self.edges.contains_key(&edge.id) {
            return Err(GraphCommandError::DuplicateEdge {
                source_id: edge.source,
                target_id: edge.target,
            });
        }

        tracing::debug!("Edge added: {} from {} to {}", edge.id, edge.source, edge.target);
        let event = GraphDomainEvent::EdgeAdded(EdgeAdded {
            edge_id: edge.id.clone(),
            source_id: edge.source.clone(),
            target_id: edge.target.clone(),
        });
        self.edges.insert(edge.id.clone(), edge);

        Ok(vec![event])
    }

    /// Remove an edge if present
    pub fn disconnect(&mut self, edge_id: &EdgeId) -> Vec<GraphDomainEvent> {
        match self.edges.shift_remove(edge_id) {
            Some(_) => {
                tracing::debug!("Edge removed: {}", edge_id);
                vec![GraphDomainEvent::EdgeRemoved(EdgeRemoved {
                    edge_id: edge_id.clone(),
                })]
            }
            None => Vec::new(),
        }
    }

    /// Move a node if present
    pub fn set_position(&mut self, node_id: &NodeId, position: Position2D) -> Vec<GraphDomainEvent> {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.position = position;
                vec![GraphDomainEvent::NodeMoved(NodeMoved {
                    node_id: node_id.clone(),
                    position,
                })]
            }
            None => Vec::new(),
        }
    }

    /// Remove every edge, keeping the nodes
    pub fn disconnect_all(&mut self) -> Vec<GraphDomainEvent> {
        if self.edges.is_empty() {
            return Vec::new();
        }

        let edge_ids: Vec<EdgeId> = self.edges.drain(..).map(|(id, _)| id).collect();
        tracing::debug!("Edges cleared: {}", edge_ids.len());
        vec![GraphDomainEvent::EdgesCleared(EdgesCleared { edge_ids })]
    }

    /// Replace every edge with a chain over the current node order and lay the
    /// nodes out along it
    pub fn auto_connect(&mut self, orientation: Orientation) -> Vec<GraphDomainEvent> {
        if self.nodes.is_empty() && self.edges.is_empty() {
            return Vec::new();
        }

        let order: Vec<NodeId> = self.nodes.keys().cloned().collect();
        let chain: IndexMap<EdgeId, Edge> = layout::chain_edges(&order)
            .into_iter()
            .map(|edge| (edge.id.clone(), edge))
            .collect();
        let edge_ids: Vec<EdgeId> = chain.keys().cloned().collect();

        let mut events = self.disconnect_all();
        self.edges = chain;
        self.place(&order, orientation);
        tracing::debug!("Chain built over {} nodes ({})", order.len(), orientation);

        events.push(GraphDomainEvent::ChainBuilt(ChainBuilt {
            orientation,
            order,
            edge_ids,
        }));
        events
    }

    /// Move the canonical path to the front of the node order, then chain every
    /// node behind it
    pub fn connect_canonical(&mut self, orientation: Orientation) -> Vec<GraphDomainEvent> {
        let order = self.canonical_order();
        let mut events = self.reorder(order, false);
        events.extend(self.auto_connect(orientation));
        events
    }

    /// Permute the nodes uniformly at random, then rebuild the chain from scratch
    pub fn shuffle<R: Rng + ?Sized>(
        &mut self,
        orientation: Orientation,
        rng: &mut R,
    ) -> Vec<GraphDomainEvent> {
        let mut order: Vec<NodeId> = self.nodes.keys().cloned().collect();
        order.shuffle(rng);

        let mut events = self.reorder(order, true);
        events.extend(self.auto_connect(orientation));
        events
    }

    /// Lay the nodes out in canonical order, leaving edges untouched
    pub fn arrange(&mut self, orientation: Orientation) -> Vec<GraphDomainEvent> {
        if self.nodes.is_empty() {
            return Vec::new();
        }

        let order = self.canonical_order();
        self.place(&order, orientation);
        vec![GraphDomainEvent::NodesArranged(NodesArranged { orientation, order })]
    }

    /// Apply a command and return the events it committed
    pub fn handle_command<R: Rng + ?Sized>(
        &mut self,
        command: GraphCommand,
        rng: &mut R,
    ) -> GraphCommandResult<Vec<GraphDomainEvent>> {
        let events = match command {
            GraphCommand::AddClip { clip, position } => self.add_node(clip, position),
            GraphCommand::RemoveClip { node_id } => self.remove_node(&node_id),
            GraphCommand::Connect {
                source_id,
                target_id,
            } => self.connect(source_id, target_id)?,
            GraphCommand::Disconnect { edge_id } => self.disconnect(&edge_id),
            GraphCommand::MoveNode { node_id, position } => self.set_position(&node_id, position),
            GraphCommand::DisconnectAll => self.disconnect_all(),
            GraphCommand::AutoConnect { orientation } => self.auto_connect(orientation),
            GraphCommand::ConnectCanonical { orientation } => self.connect_canonical(orientation),
            GraphCommand::Shuffle { orientation } => self.shuffle(orientation, rng),
            GraphCommand::Arrange { orientation } => self.arrange(orientation),
        };
        Ok(events)
    }

    /// Canonical path followed by the remaining nodes in node order
    fn canonical_order(&self) -> Vec<NodeId> {
        let (path, rest) = find_canonical_path(&self.snapshot()).into_parts();
        path.into_iter().chain(rest).collect()
    }

    /// Put the nodes in `order`, which must be a permutation of the current ids
    fn reorder(&mut self, order: Vec<NodeId>, shuffled: bool) -> Vec<GraphDomainEvent> {
        if order.iter().eq(self.nodes.keys()) {
            return Vec::new();
        }

        let mut previous = std::mem::take(&mut self.nodes);
        self.nodes = order
            .iter()
            .filter_map(|id| previous.swap_remove(id).map(|node| (id.clone(), node)))
            .collect();
        debug_assert!(previous.is_empty());

        vec![GraphDomainEvent::NodesReordered(NodesReordered { order, shuffled })]
    }

    fn place(&mut self, order: &[NodeId], orientation: Orientation) {
        for (node_id, position) in layout::chain_positions(order, orientation) {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.position = position;
            }
        }
    }
}
