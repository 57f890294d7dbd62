//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use posture_core::{Error, Result};

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Posture validator thresholds
    pub validator: ValidatorConfig,

    /// Session controller tuning
    pub session: SessionConfig,

    /// Settings handed to the pose estimator at initialization
    pub estimator: EstimatorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Landmarks with visibility below this are treated as absent
    pub visibility_floor: f32,

    /// Lateral head offset (normalized x) beyond which a turn is detected
    pub direction_threshold: f64,

    /// Maximum left/right vertical misalignment for a lying-down body
    pub lying_down_threshold: f64,

    /// How far below the body reference the head may sit
    pub head_band: f64,

    /// Facial landmarks needed before the head centroid replaces the nose
    pub min_facial_landmarks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Repetitions needed to complete a session
    pub required_count: u32,

    /// Upper bound on processed frames per second
    pub target_fps: u32,

    /// Silence (ms) after which a live session is reported as stalled
    pub stall_timeout_ms: u64,

    /// Cadence (ms) of the synthetic direction cycle in fallback mode
    pub fallback_interval_ms: u64,
}

/// Pose model variant, fixed at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelComplexity {
    Lite,
    #[default]
    Full,
    Heavy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    pub model_complexity: ModelComplexity,

    /// Minimum confidence for the detector to report a person
    pub min_detection_confidence: f32,

    /// Minimum confidence to keep tracking between frames
    pub min_tracking_confidence: f32,

    /// Temporal landmark smoothing inside the estimator
    pub smooth_landmarks: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            visibility_floor: 0.3,
            direction_threshold: 0.08,
            lying_down_threshold: 0.15,
            head_band: 0.15,
            min_facial_landmarks: 2,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            required_count: 20,
            target_fps: 15,
            stall_timeout_ms: 5_000,
            fallback_interval_ms: 2_000,
        }
    }
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            model_complexity: ModelComplexity::Full,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.3,
            smooth_landmarks: true,
        }
    }
}

impl SessionConfig {
    /// Minimum spacing between two processed frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    pub fn stall_timeout(&self) -> Duration {
        Duration::from_millis(self.stall_timeout_ms)
    }

    pub fn fallback_interval(&self) -> Duration {
        Duration::from_millis(self.fallback_interval_ms)
    }
}

impl PostureConfig {
    /// Load configuration from file, overlaid with `POSTURE__*` environment variables
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("POSTURE").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let parsed: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("POSTURE").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let parsed: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        let v = &self.validator;
        if !(0.0..=1.0).contains(&v.visibility_floor) {
            return Err(Error::Config(format!(
                "validator.visibility_floor must be within [0, 1], got {}",
                v.visibility_floor
            )));
        }
        if v.direction_threshold <= 0.0 {
            return Err(Error::Config(
                "validator.direction_threshold must be positive".into(),
            ));
        }
        if v.lying_down_threshold <= 0.0 {
            return Err(Error::Config(
                "validator.lying_down_threshold must be positive".into(),
            ));
        }
        if v.head_band < 0.0 {
            return Err(Error::Config("validator.head_band must not be negative".into()));
        }

        let s = &self.session;
        if s.required_count == 0 {
            return Err(Error::Config("session.required_count must be at least 1".into()));
        }
        if s.target_fps == 0 {
            return Err(Error::Config("session.target_fps must be at least 1".into()));
        }
        if s.stall_timeout_ms == 0 || s.fallback_interval_ms == 0 {
            return Err(Error::Config(
                "session timeouts and intervals must be non-zero".into(),
            ));
        }

        let e = &self.estimator;
        for (name, value) in [
            ("min_detection_confidence", e.min_detection_confidence),
            ("min_tracking_confidence", e.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "estimator.{name} must be within [0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }
}
