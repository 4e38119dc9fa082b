//! Editing session
//!
//! The session owns the clip graph of one editing session and is the only way to
//! mutate it. Every effective mutation is followed by exactly one recomputation of
//! the sequence status, published in order to registered observers and channel
//! subscribers. Asynchronous calls to the clip catalog and the uploader are guarded
//! so that a superseded response is discarded instead of applied.

mod request_guard;

pub use request_guard::{RequestSection, RequestTicket, RequestTracker};

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::aggregate::{ClipGraph, GraphSnapshot};
use crate::clip::{ClipIngestError, ClipRecord, ClipSearchParams, ClipSource, ClipSourceError};
use crate::commands::{GraphCommand, GraphCommandError, GraphCommandResult};
use crate::config::{ConfigError, SessionConfig};
use crate::domain_events::GraphDomainEvent;
use crate::queries::SequenceStatus;
use crate::sequencer::{upload_plan, RenderPlan, SequenceUploader, Sequencer, SubmitError, UploadReceipt};
use crate::value_objects::{NodeId, Orientation, SessionId};

/// Errors surfaced by the editing session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Command(#[from] GraphCommandError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    ClipSource(#[from] ClipSourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A newer request of the same section was issued while this one was in flight
    #[error("Discarded response: {0} was superseded by a newer request")]
    Superseded(RequestTicket),
}

/// Published once after every effective mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub session_id: SessionId,
    /// Increases by one with every update
    pub revision: u64,
    /// Name of the command that caused the update
    pub command: String,
    pub events: Vec<GraphDomainEvent>,
    /// Status recomputed from the graph as of this update
    pub status: SequenceStatus,
}

/// Callback notified of session updates
pub trait SessionObserver: Send + Sync {
    fn on_update(&mut self, update: &SessionUpdate);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionUpdate) + Send + Sync,
{
    fn on_update(&mut self, update: &SessionUpdate) {
        self(update)
    }
}

/// Clips returned by a catalog search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipBatch {
    pub clips: Vec<ClipRecord>,
    /// Catalog records that failed ingestion
    pub rejected: Vec<ClipIngestError>,
}

/// A catalog search issued by a session, not yet run
pub struct ClipSearch {
    ticket: RequestTicket,
    tracker: RequestTracker,
    source: Arc<dyn ClipSource>,
    params: ClipSearchParams,
}

impl ClipSearch {
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    /// Fetch and ingest the clips.
    ///
    /// Fails with [`SessionError::Superseded`] when a newer search was issued before
    /// the catalog answered.
    pub async fn run(self) -> Result<ClipBatch, SessionError> {
        self.params.validate().map_err(ClipSourceError::from)?;
        let fetched = self.source.fetch_clips(&self.params).await?;

        if !self.tracker.is_current(&self.ticket) {
            tracing::warn!(ticket = %self.ticket, "Discarding superseded clip search response");
            return Err(SessionError::Superseded(self.ticket));
        }

        let mut batch = ClipBatch::default();
        for source_clip in fetched {
            match ClipRecord::try_from(source_clip) {
                Ok(clip) => batch.clips.push(clip),
                Err(error) => {
                    tracing::warn!(error = %error, "Rejected clip from catalog");
                    batch.rejected.push(error);
                }
            }
        }
        tracing::debug!(
            ticket = %self.ticket,
            accepted = batch.clips.len(),
            rejected = batch.rejected.len(),
            "Clip search completed"
        );
        Ok(batch)
    }
}

/// A validated render plan waiting to be uploaded
pub struct PendingSubmit {
    ticket: RequestTicket,
    tracker: RequestTracker,
    uploader: Arc<dyn SequenceUploader>,
    plan: RenderPlan,
}

impl PendingSubmit {
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// Upload the plan.
    ///
    /// A submission superseded by a newer one or by a graph mutation never reaches
    /// the uploader. Uploader failures are returned as is. A receipt arriving after
    /// the submission was superseded is discarded.
    pub async fn send(self) -> Result<UploadReceipt, SessionError> {
        if !self.tracker.is_current(&self.ticket) {
            tracing::warn!(ticket = %self.ticket, "Dropping superseded submission before upload");
            return Err(SessionError::Superseded(self.ticket));
        }

        let receipt = upload_plan(self.uploader.as_ref(), &self.plan).await?;

        if !self.tracker.is_current(&self.ticket) {
            tracing::warn!(ticket = %self.ticket, job_id = %receipt.job_id, "Discarding superseded upload receipt");
            return Err(SessionError::Superseded(self.ticket));
        }
        Ok(receipt)
    }
}

/// One clip editing session
pub struct EditingSession {
    id: SessionId,
    config: SessionConfig,
    graph: ClipGraph,
    sequencer: Sequencer,
    source: Arc<dyn ClipSource>,
    uploader: Arc<dyn SequenceUploader>,
    requests: RequestTracker,
    observers: Vec<Box<dyn SessionObserver>>,
    subscribers: Vec<mpsc::UnboundedSender<SessionUpdate>>,
    revision: u64,
    status: SequenceStatus,
    rng: StdRng,
}

impl EditingSession {
    /// Start a session with an empty graph
    pub fn new(
        config: SessionConfig,
        source: Arc<dyn ClipSource>,
        uploader: Arc<dyn SequenceUploader>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let id = SessionId::new();
        tracing::info!(session_id = %id, server = %config.server.base_url(), "Editing session started");

        Ok(Self {
            id,
            sequencer: Sequencer::new(config.video.clone()),
            config,
            graph: ClipGraph::new(),
            source,
            uploader,
            requests: RequestTracker::new(),
            observers: Vec::new(),
            subscribers: Vec::new(),
            revision: 0,
            status: SequenceStatus::Empty,
            rng: StdRng::from_entropy(),
        })
    }

    /// Use a seeded random generator for shuffles
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Orientation used when a layout command does not name one
    pub fn default_orientation(&self) -> Orientation {
        self.config.layout.orientation
    }

    pub fn graph(&self) -> &ClipGraph {
        &self.graph
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    /// Status as of the latest structural change
    pub fn status(&self) -> &SequenceStatus {
        &self.status
    }

    /// Whether submission is enabled right now
    pub fn can_submit(&self) -> bool {
        self.status.is_submittable()
    }

    pub fn add_observer(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Receive every future update on a channel
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Apply a command.
    ///
    /// Rejected commands leave the graph untouched and publish nothing.
    pub fn handle(&mut self, command: GraphCommand) -> GraphCommandResult<Vec<GraphDomainEvent>> {
        let name = command.name();
        let events = match self.graph.handle_command(command, &mut self.rng) {
            Ok(events) => events,
            Err(error) => {
                tracing::warn!(session_id = %self.id, command = name, error = %error, "Graph command rejected");
                return Err(error);
            }
        };

        if !events.is_empty() {
            self.publish(name, events.clone());
        }
        Ok(events)
    }

    /// A clip entered the selection
    pub fn select_clip(&mut self, clip: ClipRecord) -> Vec<GraphDomainEvent> {
        let events = self.graph.add_node(clip, None);
        if !events.is_empty() {
            self.publish("AddClip", events.clone());
        }
        events
    }

    /// A clip left the selection
    pub fn deselect_clip(&mut self, node_id: &NodeId) -> Vec<GraphDomainEvent> {
        let events = self.graph.remove_node(node_id);
        if !events.is_empty() {
            self.publish("RemoveClip", events.clone());
        }
        events
    }

    /// Make the graph hold exactly the clips of `selection`.
    ///
    /// New clips are added in selection order, clips no longer selected are removed
    /// with their edges. The whole sync is published as one update.
    pub fn sync_selection(&mut self, selection: &[ClipRecord]) -> Vec<GraphDomainEvent> {
        let selected: std::collections::HashSet<NodeId> =
            selection.iter().map(ClipRecord::node_id).collect();
        let stale: Vec<NodeId> = self
            .graph
            .nodes()
            .map(|node| node.id.clone())
            .filter(|id| !selected.contains(id))
            .collect();

        let mut events = Vec::new();
        for node_id in &stale {
            events.extend(self.graph.remove_node(node_id));
        }
        for clip in selection {
            events.extend(self.graph.add_node(clip.clone(), None));
        }

        if !events.is_empty() {
            self.publish("SyncSelection", events.clone());
        }
        events
    }

    /// Connect two clips so that `target_id` plays after `source_id`
    pub fn connect(
        &mut self,
        source_id: NodeId,
        target_id: NodeId,
    ) -> GraphCommandResult<Vec<GraphDomainEvent>> {
        self.handle(GraphCommand::Connect {
            source_id,
            target_id,
        })
    }

    /// Issue a catalog search, superseding any search still in flight
    pub fn clip_search(&self, params: ClipSearchParams) -> ClipSearch {
        ClipSearch {
            ticket: self.requests.issue(RequestSection::ClipSearch),
            tracker: self.requests.clone(),
            source: Arc::clone(&self.source),
            params,
        }
    }

    /// Validate the current graph and prepare its upload.
    ///
    /// Fails with [`SubmitError::NotLinear`] unless the whole graph is one path. The
    /// returned submission is superseded by the next effective mutation.
    pub fn prepare_submit(&self) -> Result<PendingSubmit, SessionError> {
        let plan = self.sequencer.plan(&self.graph.snapshot())?;
        Ok(PendingSubmit {
            ticket: self.requests.issue(RequestSection::Submit),
            tracker: self.requests.clone(),
            uploader: Arc::clone(&self.uploader),
            plan,
        })
    }

    /// Prepare and upload the current sequence
    pub async fn submit(&self) -> Result<UploadReceipt, SessionError> {
        self.prepare_submit()?.send().await
    }

    /// End the session. Responses still in flight are discarded when they arrive.
    pub fn close(self) {
        for section in RequestSection::ALL {
            self.requests.cancel(section);
        }
        tracing::info!(session_id = %self.id, revision = self.revision, "Editing session closed");
    }

    fn publish(&mut self, command: &str, events: Vec<GraphDomainEvent>) {
        self.revision += 1;
        self.requests.cancel(RequestSection::Submit);
        if events.iter().any(GraphDomainEvent::is_structural) {
            self.status = SequenceStatus::evaluate(&self.graph.snapshot());
        }

        let update = SessionUpdate {
            session_id: self.id,
            revision: self.revision,
            command: command.to_string(),
            events,
            status: self.status.clone(),
        };
        tracing::debug!(
            session_id = %self.id,
            revision = update.revision,
            command,
            subjects = ?update.events.iter().map(GraphDomainEvent::subject).collect::<Vec<_>>(),
            submittable = update.status.is_submittable(),
            "Sequence updated"
        );

        for observer in &mut self.observers {
            observer.on_update(&update);
        }
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }
}
