//! Per-frame posture validation.
//!
//! The validator is a pure function of one [`LandmarkFrame`]:
//!
//! 1. Require the full 33-point topology plus a confident nose and shoulders.
//! 2. Body reference = centroid of the shoulders, extended with both hips when
//!    both are confidently present.
//! 3. Head reference = centroid of the confident facial landmarks (nose, eyes,
//!    ears) once enough of them are visible, otherwise the nose alone.
//! 4. `head_offset = head.x - body.x` classifies Left / Center / Right.
//! 5. Level shoulders (and hips) mean the subject is lying down; the head must
//!    also sit within a vertical band around the body reference.
//!
//! Engines that do not report visibility are never penalized for it.

use posture_core::{
    centroid, vertical_misalignment, Direction, Landmark, LandmarkFrame, PoseLandmark,
    PostureAssessment, PostureIssue, PostureMetrics,
};

use crate::config::ValidatorConfig;
use crate::feedback::FeedbackGenerator;

const REQUIRED: [PoseLandmark; 3] = [
    PoseLandmark::Nose,
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
];

/// Stateless posture judge
#[derive(Debug, Clone, Default)]
pub struct PostureValidator {
    config: ValidatorConfig,
    feedback: FeedbackGenerator,
}

impl PostureValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            feedback: FeedbackGenerator::new(),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Judge a single frame. Never fails: defective input yields an incorrect pose.
    pub fn validate(&self, frame: &LandmarkFrame) -> PostureAssessment {
        let floor = self.config.visibility_floor;

        if !frame.is_complete() {
            let missing = REQUIRED
                .iter()
                .copied()
                .filter(|lm| frame.confident(*lm, floor).is_none())
                .collect();
            return self.rejected(PostureIssue::InsufficientLandmarks { missing });
        }

        let (nose, left_shoulder, right_shoulder) = match (
            frame.confident(PoseLandmark::Nose, floor),
            frame.confident(PoseLandmark::LeftShoulder, floor),
            frame.confident(PoseLandmark::RightShoulder, floor),
        ) {
            (Some(n), Some(l), Some(r)) => (n, l, r),
            (n, l, r) => {
                let missing = [n, l, r]
                    .iter()
                    .zip(REQUIRED)
                    .filter(|(found, _)| found.is_none())
                    .map(|(_, lm)| lm)
                    .collect();
                return self.rejected(PostureIssue::InsufficientLandmarks { missing });
            }
        };

        let hips = match (
            frame.confident(PoseLandmark::LeftHip, floor),
            frame.confident(PoseLandmark::RightHip, floor),
        ) {
            (Some(l), Some(r)) => Some((l, r)),
            _ => None,
        };

        let mut torso = vec![left_shoulder.point(), right_shoulder.point()];
        if let Some((left_hip, right_hip)) = hips {
            torso.push(left_hip.point());
            torso.push(right_hip.point());
        }
        let Some(body_reference) = centroid(&torso) else {
            return self.rejected(PostureIssue::InsufficientLandmarks { missing: Vec::new() });
        };

        let head_reference = self.head_reference(frame, nose);
        let head_offset = head_reference.x - body_reference.x;
        let direction = self.classify(head_offset);

        let shoulder_tilt =
            vertical_misalignment(&left_shoulder.point(), &right_shoulder.point());
        let hip_tilt = hips.map(|(l, r)| vertical_misalignment(&l.point(), &r.point()));
        let threshold = self.config.lying_down_threshold;
        let lying_down = shoulder_tilt < threshold && hip_tilt.map_or(true, |t| t < threshold);

        let head_drop = head_reference.y - body_reference.y;
        let head_in_band = head_drop < self.config.head_band;

        let issue = if !lying_down {
            Some(PostureIssue::NotLyingDown)
        } else if !head_in_band {
            Some(PostureIssue::HeadMisaligned)
        } else {
            None
        };

        tracing::trace!(
            %direction,
            head_offset,
            shoulder_tilt,
            lying_down,
            head_in_band,
            "posture evaluated"
        );

        PostureAssessment {
            is_correct_pose: issue.is_none(),
            direction,
            feedback: self.feedback.describe(issue.as_ref(), direction),
            issue,
            metrics: Some(PostureMetrics {
                body_reference,
                head_reference,
                head_offset,
                shoulder_tilt,
                hip_tilt,
                head_drop,
            }),
        }
    }

    /// Classify a lateral head offset against the jitter threshold
    pub fn classify(&self, head_offset: f64) -> Direction {
        let threshold = self.config.direction_threshold;
        if head_offset > threshold {
            Direction::Right
        } else if head_offset < -threshold {
            Direction::Left
        } else {
            Direction::Center
        }
    }

    fn head_reference(&self, frame: &LandmarkFrame, nose: &Landmark) -> posture_core::Point2D {
        let facial: Vec<_> = PoseLandmark::facial()
            .iter()
            .filter_map(|lm| frame.confident(*lm, self.config.visibility_floor))
            .map(Landmark::point)
            .collect();

        if facial.len() >= self.config.min_facial_landmarks.max(1) {
            centroid(&facial).unwrap_or_else(|| nose.point())
        } else {
            nose.point()
        }
    }

    fn rejected(&self, issue: PostureIssue) -> PostureAssessment {
        PostureAssessment {
            is_correct_pose: false,
            direction: Direction::Center,
            feedback: self.feedback.describe(Some(&issue), Direction::Center),
            issue: Some(issue),
            metrics: None,
        }
    }
}
