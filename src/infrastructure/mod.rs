//! Infrastructure layer implementations
//!
//! Concrete clip catalogs and uploaders. The in-memory variants back tests and
//! offline use; [`JsonFileUploader`] writes render plans to disk for an external
//! renderer to pick up.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::clip::{ClipKind, ClipSearchParams, ClipSource, ClipSourceError, SourceClip};
use crate::sequencer::{RenderPlan, SequenceUploader, UploadError, UploadReceipt};

/// Clip catalog serving a fixed list of clips
#[derive(Debug, Default)]
pub struct InMemoryClipSource {
    clips: Vec<SourceClip>,
}

impl InMemoryClipSource {
    pub fn new(clips: Vec<SourceClip>) -> Self {
        Self { clips }
    }

    fn matches(clip: &SourceClip, params: &ClipSearchParams) -> bool {
        let field = match params.kind {
            ClipKind::Game => &clip.game_id,
            ClipKind::User => &clip.broadcaster_name,
        };
        field.eq_ignore_ascii_case(params.name.trim())
    }
}

#[async_trait]
impl ClipSource for InMemoryClipSource {
    async fn fetch_clips(&self, params: &ClipSearchParams) -> Result<Vec<SourceClip>, ClipSourceError> {
        params.validate()?;

        let mut found: Vec<SourceClip> = self
            .clips
            .iter()
            .filter(|clip| Self::matches(clip, params))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        found.truncate(usize::from(params.first));

        tracing::debug!(kind = ?params.kind, name = %params.name, found = found.len(), "In-memory clip search");
        Ok(found)
    }
}

/// Uploader that keeps every accepted plan in memory
#[derive(Debug, Default)]
pub struct InMemoryUploader {
    plans: Mutex<Vec<RenderPlan>>,
    failure: Option<String>,
}

impl InMemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// An uploader that rejects every plan with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            plans: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    /// Plans accepted so far, oldest first
    pub fn uploaded(&self) -> Vec<RenderPlan> {
        self.plans.lock().clone()
    }
}

#[async_trait]
impl SequenceUploader for InMemoryUploader {
    async fn upload(&self, plan: &RenderPlan) -> Result<UploadReceipt, UploadError> {
        if let Some(reason) = &self.failure {
            return Err(UploadError::Rejected(reason.clone()));
        }

        let mut plans = self.plans.lock();
        plans.push(plan.clone());
        Ok(UploadReceipt {
            job_id: format!("job-{}", plans.len()),
        })
    }
}

/// Uploader that writes each plan as a JSON file into a directory
#[derive(Debug)]
pub struct JsonFileUploader {
    dir: PathBuf,
    next_job: AtomicU64,
}

impl JsonFileUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_job: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl SequenceUploader for JsonFileUploader {
    async fn upload(&self, plan: &RenderPlan) -> Result<UploadReceipt, UploadError> {
        let json = serde_json::to_vec_pretty(plan)
            .map_err(|e| UploadError::Rejected(format!("plan is not serializable: {e}")))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Unreachable(format!("{}: {e}", self.dir.display())))?;

        let job_id = format!("job-{}", self.next_job.fetch_add(1, Ordering::Relaxed));
        let path = self.dir.join(format!("{job_id}.json"));
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| UploadError::Unreachable(format!("{}: {e}", path.display())))?;

        tracing::debug!("Render plan written to {}", path.display());
        Ok(UploadReceipt { job_id })
    }
}
