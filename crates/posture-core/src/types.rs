//! Fundamental types for posture repetition tracking.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point2D;

/// Unique identifier for a detection session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }
}

/// 33-point body landmark topology (BlazePose / MediaPipe Pose)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    const ALL: [PoseLandmark; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Landmarks that make up the head reference point
    pub fn facial() -> &'static [PoseLandmark] {
        &[
            PoseLandmark::Nose,
            PoseLandmark::LeftEye,
            PoseLandmark::RightEye,
            PoseLandmark::LeftEar,
            PoseLandmark::RightEar,
        ]
    }
}

/// Single normalized body keypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Detection confidence in [0, 1]; engines that do not report it leave it unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// A missing visibility score counts as fully confident.
    pub fn is_confident(&self, floor: f32) -> bool {
        self.visibility.map_or(true, |v| v >= floor)
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// All landmarks returned by one estimation call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub timestamp: Timestamp,
    pub landmarks: Vec<Option<Landmark>>,
}

impl LandmarkFrame {
    pub fn new(timestamp: Timestamp, landmarks: Vec<Option<Landmark>>) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }

    /// Build a frame where every entry is present
    pub fn from_landmarks(timestamp: Timestamp, landmarks: Vec<Landmark>) -> Self {
        Self::new(timestamp, landmarks.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// True when the frame carries the full 33-point topology
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= PoseLandmark::COUNT
    }

    pub fn get(&self, landmark: PoseLandmark) -> Option<&Landmark> {
        self.landmarks.get(landmark.index()).and_then(Option::as_ref)
    }

    /// Landmark if present and at or above the confidence floor
    pub fn confident(&self, landmark: PoseLandmark, floor: f32) -> Option<&Landmark> {
        self.get(landmark).filter(|lm| lm.is_confident(floor))
    }
}

/// Lateral head direction relative to the torso
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    #[default]
    Center,
    Right,
}

impl Direction {
    pub fn is_center(self) -> bool {
        self == Direction::Center
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Center => "center",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Why a frame was not judged a correct posture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostureIssue {
    /// The estimator returned no person at all
    NoPerson,
    /// Frame too short, or required landmarks absent or below the confidence floor
    InsufficientLandmarks { missing: Vec<PoseLandmark> },
    /// Shoulders (or hips) not level enough to be lying down
    NotLyingDown,
    /// Head outside the vertical band around the body reference
    HeadMisaligned,
}

impl PostureIssue {
    /// Camera framing problems take precedence over posture problems
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            PostureIssue::NoPerson | PostureIssue::InsufficientLandmarks { .. }
        )
    }
}

/// Raw geometry behind an assessment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureMetrics {
    pub body_reference: Point2D,
    pub head_reference: Point2D,
    /// head.x - body.x
    pub head_offset: f64,
    /// |left.y - right.y| of the shoulders
    pub shoulder_tilt: f64,
    pub hip_tilt: Option<f64>,
    /// head.y - body.y (image y grows downwards)
    pub head_drop: f64,
}

/// Per-frame posture judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureAssessment {
    pub is_correct_pose: bool,
    pub direction: Direction,
    pub feedback: String,
    pub issue: Option<PostureIssue>,
    pub metrics: Option<PostureMetrics>,
}

impl PostureAssessment {
    /// Assessment for a synthetic, always-correct frame facing `direction`
    pub fn synthetic(direction: Direction) -> Self {
        Self {
            is_correct_pose: true,
            direction,
            feedback: String::new(),
            issue: None,
            metrics: None,
        }
    }
}
