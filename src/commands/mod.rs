//! Clip graph commands
//!
//! Commands represent intent to modify a clip graph. They are applied by the editing
//! session, which validates structural rules and emits the corresponding events.

use serde::{Deserialize, Serialize};

use crate::clip::ClipRecord;
use crate::value_objects::{EdgeId, NodeId, Orientation, Position2D};

/// Commands for clip graph operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphCommand {
    /// Add a node for a selected clip
    AddClip {
        /// The clip to add, the node id is the clip id
        clip: ClipRecord,
        /// Explicit position, otherwise one is derived from the insertion index
        position: Option<Position2D>,
    },

    /// Remove a clip node and every edge touching it
    RemoveClip {
        /// The node to remove
        node_id: NodeId,
    },

    /// Connect two clips so that `target_id` plays after `source_id`
    Connect {
        source_id: NodeId,
        target_id: NodeId,
    },

    /// Remove an edge
    Disconnect {
        edge_id: EdgeId,
    },

    /// Move a node
    MoveNode {
        node_id: NodeId,
        position: Position2D,
    },

    /// Remove every edge, keeping the nodes
    DisconnectAll,

    /// Replace all edges with a chain over the current node order
    AutoConnect {
        orientation: Orientation,
    },

    /// Reorder nodes so the canonical path leads, then chain them
    ConnectCanonical {
        orientation: Orientation,
    },

    /// Randomly permute the nodes, then chain them
    Shuffle {
        orientation: Orientation,
    },

    /// Lay nodes out in canonical order without touching edges
    Arrange {
        orientation: Orientation,
    },
}

impl GraphCommand {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            GraphCommand::AddClip { .. } => "AddClip",
            GraphCommand::RemoveClip { .. } => "RemoveClip",
            GraphCommand::Connect { .. } => "Connect",
            GraphCommand::Disconnect { .. } => "Disconnect",
            GraphCommand::MoveNode { .. } => "MoveNode",
            GraphCommand::DisconnectAll => "DisconnectAll",
            GraphCommand::AutoConnect { .. } => "AutoConnect",
            GraphCommand::ConnectCanonical { .. } => "ConnectCanonical",
            GraphCommand::Shuffle { .. } => "Shuffle",
            GraphCommand::Arrange { .. } => "Arrange",
        }
    }
}

/// Result type for graph operations
pub type GraphCommandResult<T> = Result<T, GraphCommandError>;

/// Structural errors raised by rejected graph mutations.
///
/// A rejected command never leaves a partial change behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GraphCommandError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    /// An edge may not connect a node to itself
    #[error("Cannot connect node {0} to itself")]
    SelfLoop(NodeId),
    /// The directed edge already exists
    #[error("Edge already exists: {source_id} -> {target_id}")]
    DuplicateEdge { source_id: NodeId, target_id: NodeId },
}
