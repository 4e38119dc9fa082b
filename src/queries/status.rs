//! Sequence readiness
//!
//! Combines the canonical path and the linearity check into the single status the
//! editing session reports after every mutation.

use serde::{Deserialize, Serialize};

use super::{check_linearity, find_canonical_path, CanonicalPath, Linearity, NotLinearReason};
use crate::aggregate::GraphSnapshot;
use crate::value_objects::NodeId;

/// How close the graph is to a submittable sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SequenceStatus {
    /// No clips yet
    Empty,
    /// The whole graph is one path; the sequence can be submitted
    Ready { order: Vec<NodeId> },
    /// A best-effort path exists but does not cover the graph as a single path
    Partial {
        path: Vec<NodeId>,
        rest: Vec<NodeId>,
        reason: NotLinearReason,
    },
    /// Every clip has a predecessor, so there is no place to start
    NoValidStart { rest: Vec<NodeId> },
}

impl SequenceStatus {
    /// Evaluate a snapshot
    pub fn evaluate(snapshot: &GraphSnapshot) -> Self {
        let reason = match check_linearity(snapshot) {
            Linearity::Linear { order } => return SequenceStatus::Ready { order },
            Linearity::NotLinear { reason } => reason,
        };

        match find_canonical_path(snapshot) {
            CanonicalPath::Empty => SequenceStatus::Empty,
            CanonicalPath::NoValidStart { rest } => SequenceStatus::NoValidStart { rest },
            CanonicalPath::Found { path, rest } => SequenceStatus::Partial { path, rest, reason },
        }
    }

    /// Whether the sequence may be handed to the uploader
    pub fn is_submittable(&self) -> bool {
        matches!(self, SequenceStatus::Ready { .. })
    }

    /// Playback order, once the sequence is ready
    pub fn order(&self) -> Option<&[NodeId]> {
        match self {
            SequenceStatus::Ready { order } => Some(order),
            _ => None,
        }
    }

    /// Share of clips already on the best path, between 0 and 1
    pub fn progress(&self) -> f64 {
        match self {
            SequenceStatus::Empty | SequenceStatus::NoValidStart { .. } => 0.0,
            SequenceStatus::Ready { .. } => 1.0,
            SequenceStatus::Partial { path, rest, .. } => {
                path.len() as f64 / (path.len() + rest.len()) as f64
            }
        }
    }
}
