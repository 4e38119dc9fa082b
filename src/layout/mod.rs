//! Chain layout for clip graphs
//!
//! Positions are pure functions of a node's index in a chain and the chosen
//! orientation. Each orientation maps to one positioner in a fixed lookup table.

use crate::aggregate::Edge;
use crate::value_objects::{NodeId, Orientation, Position2D};

/// Horizontal distance between consecutive nodes of a horizontal chain
pub const HORIZONTAL_SPACING: f64 = 300.0;

/// Vertical offset of every other node of a horizontal chain
pub const ROW_OFFSET: f64 = 400.0;

/// Vertical distance between consecutive nodes of a vertical chain
pub const VERTICAL_SPACING: f64 = 400.0;

type Positioner = fn(usize) -> Position2D;

/// Indexed by `Orientation as usize`
const POSITIONERS: [(Orientation, Positioner); 2] = [
    (Orientation::Horizontal, horizontal_position),
    (Orientation::Vertical, vertical_position),
];

fn horizontal_position(index: usize) -> Position2D {
    Position2D::new(index as f64 * HORIZONTAL_SPACING, (index % 2) as f64 * ROW_OFFSET)
}

fn vertical_position(index: usize) -> Position2D {
    Position2D::new(0.0, index as f64 * VERTICAL_SPACING)
}

/// Position of the `index`-th node of a chain
pub fn compute_position(index: usize, orientation: Orientation) -> Position2D {
    let (_, positioner) = POSITIONERS[orientation as usize];
    positioner(index)
}

/// Positions for every node of `order`, in order
pub fn chain_positions(order: &[NodeId], orientation: Orientation) -> Vec<(NodeId, Position2D)> {
    order
        .iter()
        .enumerate()
        .map(|(index, id)| (id.clone(), compute_position(index, orientation)))
        .collect()
}

/// Edges `order[i] -> order[i + 1]` for every consecutive pair
pub fn chain_edges(order: &[NodeId]) -> Vec<Edge> {
    order
        .windows(2)
        .map(|pair| Edge::new(pair[0].clone(), pair[1].clone()))
        .collect()
}
