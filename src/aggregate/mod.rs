//! Clip graph aggregate

pub mod clip_graph;

pub use clip_graph::*;
