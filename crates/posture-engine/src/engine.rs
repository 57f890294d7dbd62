//! Pose-estimation engine boundary.
//!
//! The estimator is an external black box. It publishes its results into a
//! single-slot, latest-wins channel so engine cadence is decoupled from
//! processing cadence: a result that has not been consumed is simply
//! overwritten by the next one.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use posture_core::{Error, LandmarkFrame, Result};

use crate::config::EstimatorSettings;

/// Lifecycle of the pose estimator as seen by the session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

impl EngineStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, EngineStatus::Ready)
    }
}

/// One estimator result
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Landmarks for a detected person
    Frame(LandmarkFrame),
    /// Image processed, nobody in view
    NoPerson,
    /// Estimator crashed; no further results will follow
    Failed(String),
}

/// Trait for pose-estimation backends
#[async_trait]
pub trait PoseEstimator: Send {
    /// Load the model. Settings are fixed for the estimator's lifetime.
    async fn initialize(&mut self, settings: &EstimatorSettings) -> Result<()>;

    /// Check if the model is loaded and can estimate
    fn is_ready(&self) -> bool;

    /// Estimate the next frame; `None` when no person is visible
    async fn estimate(&mut self) -> Result<Option<LandmarkFrame>>;
}

/// Create a latest-wins channel between an estimator and a session driver
pub fn landmark_channel() -> (LandmarkFeed, LandmarkStream) {
    let (tx, rx) = watch::channel(None);
    (LandmarkFeed { tx }, LandmarkStream { rx })
}

/// Producer half, held by the estimator side
#[derive(Debug, Clone)]
pub struct LandmarkFeed {
    tx: watch::Sender<Option<EngineMessage>>,
}

impl LandmarkFeed {
    /// Replace the pending result. Fails once the consumer is gone.
    pub fn publish(&self, message: EngineMessage) -> Result<()> {
        self.tx
            .send(Some(message))
            .map_err(|_| Error::Estimator("landmark stream closed".into()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, held by the session driver
#[derive(Debug)]
pub struct LandmarkStream {
    rx: watch::Receiver<Option<EngineMessage>>,
}

impl LandmarkStream {
    /// Wait for the most recent unseen result; `None` once every feed is dropped
    pub async fn next(&mut self) -> Option<EngineMessage> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(message) = self.rx.borrow_and_update().clone() {
                return Some(message);
            }
        }
    }
}

/// Initialize an estimator, mapping any failure to a non-fatal status
pub async fn initialize_engine<E>(estimator: &mut E, settings: &EstimatorSettings) -> EngineStatus
where
    E: PoseEstimator + ?Sized,
{
    match estimator.initialize(settings).await {
        Ok(()) if estimator.is_ready() => {
            tracing::info!(
                model_complexity = ?settings.model_complexity,
                min_detection_confidence = settings.min_detection_confidence,
                min_tracking_confidence = settings.min_tracking_confidence,
                "Pose estimator ready"
            );
            EngineStatus::Ready
        }
        Ok(()) => {
            tracing::warn!("Pose estimator initialized but not ready");
            EngineStatus::Failed("estimator not ready after initialization".into())
        }
        Err(e) => {
            tracing::warn!("Pose estimator failed to initialize: {}", e);
            EngineStatus::Failed(e.to_string())
        }
    }
}

/// Drive an estimator into a feed until it fails or the consumer goes away
pub async fn pump_estimator<E>(mut estimator: E, feed: LandmarkFeed) -> Result<()>
where
    E: PoseEstimator,
{
    loop {
        let message = match estimator.estimate().await {
            Ok(Some(frame)) => EngineMessage::Frame(frame),
            Ok(None) => EngineMessage::NoPerson,
            Err(e) => {
                tracing::error!("Pose estimation error: {}", e);
                let _ = feed.publish(EngineMessage::Failed(e.to_string()));
                return Err(e);
            }
        };

        if feed.publish(message).is_err() {
            tracing::debug!("Landmark stream dropped, stopping estimator");
            return Ok(());
        }
    }
}

/// Replays recorded landmark frames at a fixed cadence, looping forever.
///
/// Recordings are JSON lines: one [`LandmarkFrame`] per line, or `null` for
/// an image with nobody in view.
pub struct ReplayEstimator {
    frames: Vec<Option<LandmarkFrame>>,
    cadence: Duration,
    cursor: usize,
    ready: bool,
}

impl ReplayEstimator {
    pub fn new(frames: Vec<Option<LandmarkFrame>>, cadence: Duration) -> Self {
        Self {
            frames,
            cadence,
            cursor: 0,
            ready: false,
        }
    }

    /// Load a JSON-lines recording
    pub fn from_jsonl(path: impl AsRef<Path>, cadence: Duration) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let frames = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(serde_json::from_str::<Option<LandmarkFrame>>)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::new(frames, cadence))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl PoseEstimator for ReplayEstimator {
    async fn initialize(&mut self, settings: &EstimatorSettings) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Error::EngineUnavailable("recording has no frames".into()));
        }
        tracing::debug!(
            frames = self.frames.len(),
            model_complexity = ?settings.model_complexity,
            "Replay estimator loaded"
        );
        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn estimate(&mut self) -> Result<Option<LandmarkFrame>> {
        if !self.ready {
            return Err(Error::EngineUnavailable("estimator not initialized".into()));
        }
        tokio::time::sleep(self.cadence).await;

        let frame = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }
}
