//! Sequencing of an ordered clip list
//!
//! Turns the playback order of a linear graph into a gapless timeline and the render
//! plan the external renderer consumes, and hands that plan to the uploader.

mod timeline;

pub use timeline::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::aggregate::GraphSnapshot;
use crate::clip::ClipRecord;
use crate::config::{Transition, VideoConfig};
use crate::queries::{check_linearity, Linearity, NotLinearReason};

/// One clip of a render plan, expressed in frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSegment {
    pub clip_id: String,
    pub video_url: String,
    pub from_frame: u64,
    pub duration_in_frames: u64,
}

/// Everything the renderer needs to compose the final video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub transition: Transition,
    pub total_duration: f64,
    pub total_frames: u64,
    pub segments: Vec<RenderSegment>,
    pub clips: Vec<ClipRecord>,
}

impl RenderPlan {
    /// Build the plan for `clips` in playback order.
    ///
    /// Segment boundaries and the total length are rounded to whole seconds before
    /// being converted to frames; the video is never shorter than one second.
    pub fn new(clips: Vec<ClipRecord>, video: &VideoConfig) -> Self {
        let fps = u64::from(video.fps);
        let total = total_duration(&clips);
        let segments = to_timeline(&clips)
            .into_iter()
            .map(|entry| RenderSegment {
                clip_id: entry.clip.id().to_string(),
                video_url: entry.clip.video_url().to_string(),
                from_frame: seconds_to_frames(entry.start, fps),
                duration_in_frames: seconds_to_frames(entry.duration, fps),
            })
            .collect();

        Self {
            width: video.width,
            height: video.height,
            fps: video.fps,
            transition: video.transition.clone(),
            total_duration: total,
            total_frames: seconds_to_frames(total.round().max(1.0), fps),
            segments,
            clips,
        }
    }
}

fn seconds_to_frames(seconds: f64, fps: u64) -> u64 {
    (seconds.round().max(0.0) as u64).saturating_mul(fps)
}

/// Receipt returned by the uploader once a plan is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Identifier the render server assigned to the job
    pub job_id: String,
}

/// Failures reported by the upload/render collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Render server unreachable: {0}")]
    Unreachable(String),
    #[error("Render server rejected the sequence: {0}")]
    Rejected(String),
}

/// The external renderer/uploader
#[async_trait]
pub trait SequenceUploader: Send + Sync {
    /// Submit a plan for rendering
    async fn upload(&self, plan: &RenderPlan) -> Result<UploadReceipt, UploadError>;
}

/// Errors from preparing or submitting a sequence
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// The graph is not a single path; nothing was sent
    #[error("Sequence is not linear: {0}")]
    NotLinear(NotLinearReason),
    /// The uploader failed; the cause is kept
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
}

/// Builds render plans and submits them
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    video: VideoConfig,
}

impl Sequencer {
    pub fn new(video: VideoConfig) -> Self {
        Self { video }
    }

    pub fn video(&self) -> &VideoConfig {
        &self.video
    }

    /// Build the plan for a snapshot, refusing anything but a linear graph
    pub fn plan(&self, snapshot: &GraphSnapshot) -> Result<RenderPlan, SubmitError> {
        match check_linearity(snapshot) {
            Linearity::Linear { order } => {
                Ok(RenderPlan::new(snapshot.clips_for(&order), &self.video))
            }
            Linearity::NotLinear { reason } => Err(SubmitError::NotLinear(reason)),
        }
    }

    /// Plan and upload a snapshot.
    ///
    /// Uploader failures are returned to the caller as is; there is no retry.
    pub async fn submit(
        &self,
        uploader: &dyn SequenceUploader,
        snapshot: &GraphSnapshot,
    ) -> Result<UploadReceipt, SubmitError> {
        let plan = self.plan(snapshot)?;
        upload_plan(uploader, &plan).await
    }
}

/// Hand an already validated plan to the uploader
pub(crate) async fn upload_plan(
    uploader: &dyn SequenceUploader,
    plan: &RenderPlan,
) -> Result<UploadReceipt, SubmitError> {
    tracing::info!(
        clip_count = plan.clips.len(),
        total_frames = plan.total_frames,
        fps = plan.fps,
        "Submitting sequence for rendering"
    );

    match uploader.upload(plan).await {
        Ok(receipt) => {
            tracing::info!(job_id = %receipt.job_id, "Sequence accepted by render server");
            Ok(receipt)
        }
        Err(error) => {
            tracing::error!(error = %error, "Sequence upload failed");
            Err(SubmitError::Upload(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::snapshot;
    use parking_lot::Mutex;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     S[Sequencer] --> RP[RenderPlan]
    ///     S --> G[Linearity Gate]
    ///     S --> U[Upload]
    ///     U --> F[Failure Propagation]
    /// ```

    struct RecordingUploader {
        plans: Mutex<Vec<RenderPlan>>,
        fail: bool,
    }

    #[async_trait]
    impl SequenceUploader for RecordingUploader {
        async fn upload(&self, plan: &RenderPlan) -> Result<UploadReceipt, UploadError> {
            self.plans.lock().push(plan.clone());
            if self.fail {
                Err(UploadError::Unreachable("connection refused".to_string()))
            } else {
                Ok(UploadReceipt { job_id: "job-1".to_string() })
            }
        }
    }

    fn clip(id: &str, duration: f64) -> ClipRecord {
        ClipRecord::new(id, duration)
            .unwrap()
            .with_urls("", format!("https://cdn/{id}.mp4"))
    }

    #[test]
    fn test_render_plan_frames() {
        let plan = RenderPlan::new(
            vec![clip("a", 3.0), clip("b", 4.4), clip("c", 2.0)],
            &VideoConfig::default(),
        );

        assert_eq!(plan.total_frames, 9 * 30);
        assert_eq!(plan.segments[0].from_frame, 0);
        assert_eq!(plan.segments[1].from_frame, 90);
        assert_eq!(plan.segments[1].duration_in_frames, 120);
        assert_eq!(plan.segments[2].from_frame, 7 * 30);
        assert_eq!(plan.segments[2].video_url, "https://cdn/c.mp4");
    }

    #[test]
    fn test_render_plan_minimum_length() {
        let plan = RenderPlan::new(vec![clip("a", 0.2)], &VideoConfig::default());
        assert_eq!(plan.total_frames, 30);

        let empty = RenderPlan::new(Vec::new(), &VideoConfig::default());
        assert_eq!(empty.total_frames, 30);
        assert!(empty.segments.is_empty());
    }

    #[test]
    fn test_plan_requires_linear_graph() {
        let sequencer = Sequencer::default();

        let branch = snapshot(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        assert!(matches!(sequencer.plan(&branch), Err(SubmitError::NotLinear(_))));

        let chain = snapshot(&["c", "b", "a"], &[("a", "b"), ("b", "c")]);
        let plan = sequencer.plan(&chain).unwrap();
        let order: Vec<&str> = plan.clips.iter().map(|c| c.id()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_submit_blocked_when_not_linear() {
        let uploader = RecordingUploader { plans: Mutex::new(Vec::new()), fail: false };
        let sequencer = Sequencer::default();

        let result = sequencer
            .submit(&uploader, &snapshot(&["a", "b"], &[]))
            .await;

        assert!(matches!(result, Err(SubmitError::NotLinear(NotLinearReason::StartCount { count: 2 }))));
        assert!(uploader.plans.lock().is_empty());
    }

    #[tokio::test]
    async fn test_submit_reports_upload_failure() {
        let uploader = RecordingUploader { plans: Mutex::new(Vec::new()), fail: true };
        let sequencer = Sequencer::default();

        let result = sequencer
            .submit(&uploader, &snapshot(&["a", "b"], &[("a", "b")]))
            .await;

        assert_eq!(
            result,
            Err(SubmitError::Upload(UploadError::Unreachable("connection refused".to_string())))
        );
        assert_eq!(uploader.plans.lock().len(), 1);
    }
}
