//! User-facing status text.
//!
//! Message selection follows a fixed priority chain:
//! camera framing → not lying down → head alignment → completion → in-progress.

use posture_core::{
    progress, Direction, PostureAssessment, PostureIssue, SessionMode, SessionState,
};

use crate::engine::EngineStatus;

pub const NO_PERSON: &str = "No person detected. Move into view of the camera.";
pub const INSUFFICIENT_LANDMARKS: &str =
    "Insufficient landmarks: keep your face and both shoulders in view of the camera.";
pub const NOT_LYING_DOWN: &str =
    "Not lying down: lie flat on your back and keep your shoulders level.";
pub const HEAD_MISALIGNED: &str = "Adjust your position so your head rests in line with your shoulders.";
pub const COMPLETED: &str = "Exercise complete! Great work.";
pub const STOPPED: &str = "Camera stopped.";
pub const READY: &str = "Ready. Start the session when you are lying down.";
pub const RESTARTED: &str = "Restarting the exercise.";
pub const SIMULATION: &str = "Pose detection unavailable. Running in simulation mode.";

/// Stateless renderer of feedback strings
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackGenerator;

impl FeedbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Render the status line for `assessment` in the context of `session`
    pub fn render(&self, assessment: &PostureAssessment, session: &SessionState) -> String {
        if let Some(issue) = &assessment.issue {
            return issue_message(issue).to_string();
        }

        if session.completed || session.repetition_count >= session.required_count {
            return COMPLETED.to_string();
        }

        let count = session.repetition_count;
        let required = session.required_count;
        let pct = progress(count, required).round() as u32;

        match session.mode {
            SessionMode::Fallback => format!(
                "Simulated session in progress, facing {} ({count}/{required}, {pct}%)",
                assessment.direction
            ),
            SessionMode::Live => match assessment.direction {
                Direction::Left => {
                    format!("Turning left, good! ({count}/{required}, {pct}%)")
                }
                Direction::Right => {
                    format!("Turning right, good! ({count}/{required}, {pct}%)")
                }
                Direction::Center => format!(
                    "Centered. Keep turning your head left and right ({count}/{required}, {pct}%)"
                ),
            },
        }
    }

    /// Session-free description, used when no counter context exists
    pub fn describe(&self, issue: Option<&PostureIssue>, direction: Direction) -> String {
        match issue {
            Some(issue) => issue_message(issue).to_string(),
            None => match direction {
                Direction::Left => "Turning left, good!".to_string(),
                Direction::Right => "Turning right, good!".to_string(),
                Direction::Center => {
                    "Centered. Keep turning your head left and right".to_string()
                }
            },
        }
    }
}

fn issue_message(issue: &PostureIssue) -> &'static str {
    match issue {
        PostureIssue::NoPerson => NO_PERSON,
        PostureIssue::InsufficientLandmarks { .. } => INSUFFICIENT_LANDMARKS,
        PostureIssue::NotLyingDown => NOT_LYING_DOWN,
        PostureIssue::HeadMisaligned => HEAD_MISALIGNED,
    }
}

/// Short status badge for the detection source
pub fn status_label(session: &SessionState, engine: &EngineStatus) -> &'static str {
    if !session.active {
        return "Idle";
    }
    match (session.mode, engine) {
        (SessionMode::Live, _) => "Live detection",
        (SessionMode::Fallback, EngineStatus::Loading) => "Loading",
        (SessionMode::Fallback, _) => "Simulation",
    }
}
