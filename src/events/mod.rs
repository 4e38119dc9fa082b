//! Clip graph events

mod graph_events;

pub use graph_events::*;
