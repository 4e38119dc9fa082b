//! Clip graph domain
//!
//! Selected video clips are nodes of a directed graph; edges state that one clip
//! plays right after another. The graph can be edited freely, arranged
//! automatically, and checked for linearity. A graph that forms exactly one path
//! is sequenced into a gapless timeline and a render plan for the video renderer.

pub mod aggregate;
pub mod clip;
pub mod commands;
pub mod config;
pub mod domain_events;
pub mod events;
pub mod handlers;
pub mod infrastructure;
pub mod layout;
pub mod queries;
pub mod sequencer;
pub mod value_objects;

// Re-export main types
pub use aggregate::*;
pub use events::*;
pub use domain_events::*;

// Re-export commands and their types
pub use commands::{GraphCommand, GraphCommandError, GraphCommandResult};

// Re-export query types
pub use queries::{
    check_linearity, find_canonical_path, CanonicalPath, Linearity, NotLinearReason,
    SequenceStatus,
};

// Re-export the editing session
pub use handlers::{
    ClipBatch, ClipSearch, EditingSession, PendingSubmit, RequestSection, RequestTicket,
    SessionError, SessionObserver, SessionUpdate,
};

// Re-export clip and sequencing types
pub use clip::{
    ClipKind, ClipPlacement, ClipRecord, ClipSearchParams, ClipSource, ClipSourceError,
    SearchPeriod, SourceClip,
};
pub use config::{ConfigError, SessionConfig, VideoConfig};
pub use sequencer::{
    format_duration, to_timeline, total_duration, RenderPlan, Sequencer, SequenceUploader,
    SubmitError, TimelineEntry, UploadError, UploadReceipt,
};

// Re-export value objects
pub use value_objects::{EdgeId, NodeId, Orientation, Position2D, SessionId};
