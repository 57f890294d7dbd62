//! Session controller: lifecycle, counters and live/fallback mode.
//!
//! The controller owns the one [`SessionState`] of a detection session. Every
//! mutation flows through a direction transition observed by the
//! [`DirectionTracker`], whether the direction came from a validated live
//! frame or from the synthetic fallback cycle, so both modes count
//! repetitions identically.
//!
//! Time is passed in explicitly so the controller stays deterministic and
//! runtime-agnostic; [`crate::SessionHandle`] supplies the clock.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use posture_core::{
    Direction, Error, PostureAssessment, Result, SessionMode, SessionOutcome, SessionState,
    Timestamp,
};

use crate::config::SessionConfig;
use crate::direction::DirectionTracker;
use crate::engine::EngineStatus;
use crate::fallback::FallbackCycle;
use crate::feedback::{self, FeedbackGenerator};
use crate::pacing::{FpsCounter, FrameGate};
use crate::watchdog::StallWatchdog;

/// Notifications for the embedding application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Classified head direction changed
    DirectionChanged(Direction),
    /// A debounced return to center; carries the new count
    RepetitionCompleted(u32),
    /// Fired exactly once per session when the required count is reached
    SessionCompleted { outcome: SessionOutcome },
    /// Detection source switched between live and fallback
    ModeChanged { mode: SessionMode, reason: String },
    /// No frames arrived within the stall timeout while live
    Stalled { silent_for: Duration },
}

/// Why a frame was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No session is running
    Inactive,
    /// The input does not belong to the current mode
    ModeMismatch,
}

/// Result of offering one input to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Processed(Vec<SessionEvent>),
    /// Dropped by the frame-rate gate
    Throttled,
    Rejected(Rejection),
}

impl FrameOutcome {
    pub fn events(&self) -> &[SessionEvent] {
        match self {
            FrameOutcome::Processed(events) => events,
            _ => &[],
        }
    }

    pub fn into_events(self) -> Vec<SessionEvent> {
        match self {
            FrameOutcome::Processed(events) => events,
            _ => Vec::new(),
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, FrameOutcome::Processed(_))
    }
}

pub struct SessionController {
    config: SessionConfig,
    state: SessionState,
    tracker: DirectionTracker,
    gate: FrameGate,
    watchdog: StallWatchdog,
    fallback: FallbackCycle,
    fps: FpsCounter,
    engine: EngineStatus,
    prefer_fallback: bool,
    generator: FeedbackGenerator,
    feedback: String,
    last_assessment: Option<PostureAssessment>,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: SessionState::new(config.required_count),
            tracker: DirectionTracker::new(),
            gate: FrameGate::new(config.frame_interval()),
            watchdog: StallWatchdog::new(config.stall_timeout()),
            fallback: FallbackCycle::new(),
            fps: FpsCounter::new(),
            engine: EngineStatus::Loading,
            prefer_fallback: false,
            generator: FeedbackGenerator::new(),
            feedback: idle_feedback(&EngineStatus::Loading).to_string(),
            last_assessment: None,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_feedback(&self) -> &str {
        &self.feedback
    }

    pub fn last_assessment(&self) -> Option<&PostureAssessment> {
        self.last_assessment.as_ref()
    }

    pub fn engine_status(&self) -> &EngineStatus {
        &self.engine
    }

    pub fn status_label(&self) -> &'static str {
        feedback::status_label(&self.state, &self.engine)
    }

    fn is_live(&self) -> bool {
        self.state.active && self.state.mode == SessionMode::Live
    }

    /// Record the estimator's lifecycle; consulted by the next `start`
    pub fn set_engine_status(&mut self, status: EngineStatus) {
        self.engine = status;
        if !self.state.active {
            self.feedback = idle_feedback(&self.engine).to_string();
        }
    }

    /// Begin a new session, live if the estimator is ready and otherwise fallback
    pub fn start(&mut self, now: Instant) -> Result<SessionMode> {
        if self.state.active {
            return Err(Error::InvalidState {
                operation: "start",
                state: "active",
            });
        }

        let mode = if self.engine.is_ready() && !self.prefer_fallback {
            SessionMode::Live
        } else {
            SessionMode::Fallback
        };

        self.state = SessionState::new(self.config.required_count);
        self.state.mode = mode;
        self.state.active = true;
        self.state.started_at = Some(Timestamp::now());
        self.clear_transient();

        match mode {
            SessionMode::Live => {
                self.watchdog.arm(now);
                self.feedback = "Camera active. Start turning your head slowly.".to_string();
            }
            SessionMode::Fallback => {
                self.watchdog.disarm();
                self.feedback = feedback::SIMULATION.to_string();
            }
        }

        tracing::info!(
            session_id = %self.state.session_id,
            %mode,
            required = self.state.required_count,
            "Session started"
        );
        Ok(mode)
    }

    /// Halt frame consumption. Counters clear; the completion outcome is kept.
    pub fn stop(&mut self) {
        if !self.state.active {
            return;
        }

        self.state.active = false;
        self.state.repetition_count = 0;
        self.state.progress_percent = 0.0;
        self.state.last_direction = Direction::Center;
        self.state.frames_per_second = 0;
        self.clear_transient();
        self.watchdog.disarm();
        self.feedback = feedback::STOPPED.to_string();

        tracing::info!(
            session_id = %self.state.session_id,
            completed = self.state.completed,
            "Session stopped"
        );
    }

    /// Return the counters to their initial values. A running session keeps running.
    pub fn reset(&mut self) {
        let previous = std::mem::replace(
            &mut self.state,
            SessionState::new(self.config.required_count),
        );
        if previous.active {
            self.state.session_id = previous.session_id;
            self.state.active = true;
            self.state.mode = previous.mode;
            self.state.started_at = previous.started_at;
            self.feedback = feedback::RESTARTED.to_string();
        } else {
            self.feedback = idle_feedback(&self.engine).to_string();
        }
        self.clear_transient();

        tracing::debug!(session_id = %self.state.session_id, "Session reset");
    }

    fn clear_transient(&mut self) {
        self.tracker.reset();
        self.gate.reset();
        self.fallback.reset();
        self.fps.reset();
        self.last_assessment = None;
    }

    /// Apply one validated live frame
    pub fn on_frame(&mut self, assessment: PostureAssessment, now: Instant) -> FrameOutcome {
        if let Err(rejection) = self.admit_live() {
            return FrameOutcome::Rejected(rejection);
        }
        self.watchdog.feed(now);
        if !self.gate.accept(now) {
            return FrameOutcome::Throttled;
        }
        self.record_fps(now);

        FrameOutcome::Processed(self.apply(assessment))
    }

    /// The estimator processed an image but found nobody in it
    pub fn on_empty_result(&mut self, now: Instant) -> FrameOutcome {
        if let Err(rejection) = self.admit_live() {
            return FrameOutcome::Rejected(rejection);
        }
        self.watchdog.feed(now);
        if !self.gate.accept(now) {
            return FrameOutcome::Throttled;
        }
        self.record_fps(now);

        self.feedback = feedback::NO_PERSON.to_string();
        self.last_assessment = None;
        FrameOutcome::Processed(Vec::new())
    }

    /// Advance the synthetic cycle by one step
    pub fn fallback_tick(&mut self) -> FrameOutcome {
        if !self.state.active {
            return FrameOutcome::Rejected(Rejection::Inactive);
        }
        if self.state.mode != SessionMode::Fallback {
            return FrameOutcome::Rejected(Rejection::ModeMismatch);
        }

        let direction = self.fallback.advance();
        FrameOutcome::Processed(self.apply(PostureAssessment::synthetic(direction)))
    }

    fn admit_live(&self) -> std::result::Result<(), Rejection> {
        if !self.state.active {
            tracing::debug!("Frame rejected: no active session");
            return Err(Rejection::Inactive);
        }
        if self.state.mode != SessionMode::Live {
            return Err(Rejection::ModeMismatch);
        }
        Ok(())
    }

    fn record_fps(&mut self, now: Instant) {
        if let Some(fps) = self.fps.record(now) {
            self.state.frames_per_second = fps;
        }
    }

    fn apply(&mut self, assessment: PostureAssessment) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if let Some(transition) = self.tracker.observe(assessment.direction) {
            let direction = transition.direction();
            self.state.last_direction = direction;
            events.push(SessionEvent::DirectionChanged(direction));

            if transition.counts_repetition() {
                let just_completed = self.state.record_repetition();
                let count = self.state.repetition_count;
                tracing::debug!(count, required = self.state.required_count, "Repetition counted");
                events.push(SessionEvent::RepetitionCompleted(count));

                if just_completed {
                    // Both modes count identically, so both complete successfully
                    let outcome = SessionOutcome::Success;
                    tracing::info!(
                        session_id = %self.state.session_id,
                        count,
                        mode = %self.state.mode,
                        "Session completed"
                    );
                    events.push(SessionEvent::SessionCompleted { outcome });
                }
            }
        }

        self.feedback = self.generator.render(&assessment, &self.state);
        self.last_assessment = Some(assessment);
        events
    }

    /// The estimator crashed or its stream closed: continue in fallback
    pub fn engine_failed(&mut self, reason: &str) -> Vec<SessionEvent> {
        tracing::warn!("Pose estimator unavailable: {}", reason);
        self.engine = EngineStatus::Failed(reason.to_string());

        if !self.is_live() {
            if !self.state.active {
                self.feedback = idle_feedback(&self.engine).to_string();
            }
            return Vec::new();
        }
        self.enter_fallback(reason)
    }

    /// Manually prefer the synthetic cycle, now and for future sessions
    pub fn switch_to_fallback(&mut self) -> Vec<SessionEvent> {
        self.prefer_fallback = true;
        if !self.is_live() {
            return Vec::new();
        }
        self.enter_fallback("switched to simulation")
    }

    /// Go back to live detection if the estimator is ready
    pub fn retry_live(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.prefer_fallback = false;
        if !self.state.active
            || self.state.mode != SessionMode::Fallback
            || !self.engine.is_ready()
        {
            return Vec::new();
        }

        self.state.mode = SessionMode::Live;
        self.gate.reset();
        self.watchdog.arm(now);
        self.feedback = "Live detection resumed.".to_string();
        tracing::info!(session_id = %self.state.session_id, "Switched to live detection");

        vec![SessionEvent::ModeChanged {
            mode: SessionMode::Live,
            reason: "estimator available".to_string(),
        }]
    }

    fn enter_fallback(&mut self, reason: &str) -> Vec<SessionEvent> {
        self.state.mode = SessionMode::Fallback;
        self.watchdog.disarm();
        self.fallback.reset();
        self.feedback = feedback::SIMULATION.to_string();
        tracing::info!(session_id = %self.state.session_id, reason, "Switched to fallback mode");

        vec![SessionEvent::ModeChanged {
            mode: SessionMode::Fallback,
            reason: reason.to_string(),
        }]
    }

    /// Report a stall once frames have been silent past the timeout
    pub fn check_stalled(&mut self, now: Instant) -> Option<SessionEvent> {
        if !self.is_live() {
            return None;
        }
        let silent_for = self.watchdog.check(now)?;
        tracing::warn!(
            session_id = %self.state.session_id,
            silent_ms = silent_for.as_millis() as u64,
            "Session stalled: no frames from estimator"
        );
        Some(SessionEvent::Stalled { silent_for })
    }

    /// Instant at which the next stall would be reported
    pub fn stall_deadline(&self) -> Option<Instant> {
        if !self.is_live() {
            return None;
        }
        self.watchdog.deadline()
    }

    /// True while the synthetic cycle should be ticking
    pub fn wants_fallback_ticks(&self) -> bool {
        self.state.active && self.state.mode == SessionMode::Fallback
    }
}

fn idle_feedback(engine: &EngineStatus) -> &'static str {
    match engine {
        EngineStatus::Loading => "Loading pose estimator...",
        EngineStatus::Ready => feedback::READY,
        EngineStatus::Failed(_) => feedback::SIMULATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::tests::lying_frame;
    use crate::validator::PostureValidator;
    use posture_core::PostureIssue;

    fn config(required: u32) -> SessionConfig {
        SessionConfig {
            required_count: required,
            ..Default::default()
        }
    }

    fn live_controller(required: u32, t0: Instant) -> SessionController {
        let mut controller = SessionController::new(config(required));
        controller.set_engine_status(EngineStatus::Ready);
        assert_eq!(controller.start(t0).unwrap(), SessionMode::Live);
        controller
    }

    /// Feed directions 100ms apart, past the frame gate
    fn feed(
        controller: &mut SessionController,
        t0: Instant,
        start_ms: u64,
        directions: &[Direction],
    ) -> Vec<SessionEvent> {
        directions
            .iter()
            .enumerate()
            .flat_map(|(i, d)| {
                let now = t0 + Duration::from_millis(start_ms + 100 * i as u64);
                controller
                    .on_frame(PostureAssessment::synthetic(*d), now)
                    .into_events()
            })
            .collect()
    }

    fn completions(events: &[SessionEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::SessionCompleted { .. }))
            .count()
    }

    #[test]
    fn test_start_picks_mode_from_engine_status() {
        let t0 = Instant::now();
        let mut controller = SessionController::new(config(20));
        assert_eq!(controller.start(t0).unwrap(), SessionMode::Fallback);
        assert!(matches!(
            controller.start(t0),
            Err(Error::InvalidState { operation: "start", .. })
        ));

        controller.stop();
        controller.set_engine_status(EngineStatus::Ready);
        assert_eq!(controller.start(t0).unwrap(), SessionMode::Live);
    }

    #[test]
    fn test_frames_rejected_before_start_and_after_stop() {
        let t0 = Instant::now();
        let mut controller = SessionController::new(config(20));
        controller.set_engine_status(EngineStatus::Ready);

        let before = controller.state().clone();
        assert_eq!(
            controller.on_frame(PostureAssessment::synthetic(Direction::Left), t0),
            FrameOutcome::Rejected(Rejection::Inactive)
        );
        assert_eq!(controller.state(), &before);

        controller.start(t0).unwrap();
        controller.stop();
        assert_eq!(
            controller.on_frame(PostureAssessment::synthetic(Direction::Left), t0),
            FrameOutcome::Rejected(Rejection::Inactive)
        );
    }

    #[test]
    fn test_counts_on_return_to_center() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);
        use Direction::*;

        let events = feed(&mut controller, t0, 0, &[Center, Left, Center, Center, Right, Left, Center]);

        assert_eq!(controller.state().repetition_count, 2);
        assert!((controller.state().progress_percent - 10.0).abs() < 1e-9);
        assert_eq!(
            events,
            vec![
                SessionEvent::DirectionChanged(Left),
                SessionEvent::DirectionChanged(Center),
                SessionEvent::RepetitionCompleted(1),
                SessionEvent::DirectionChanged(Right),
                SessionEvent::DirectionChanged(Left),
                SessionEvent::DirectionChanged(Center),
                SessionEvent::RepetitionCompleted(2),
            ]
        );
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);
        use Direction::*;

        let mut directions = Vec::new();
        for _ in 0..19 {
            directions.extend([Left, Center]);
        }
        let events = feed(&mut controller, t0, 0, &directions);
        assert_eq!(controller.state().repetition_count, 19);
        assert!(!controller.state().completed);
        assert_eq!(completions(&events), 0);

        let events = feed(&mut controller, t0, 10_000, &[Right, Center]);
        assert!(controller.state().completed);
        assert_eq!(
            events.last(),
            Some(&SessionEvent::SessionCompleted {
                outcome: SessionOutcome::Success
            })
        );
        assert_eq!(completions(&events), 1);
        assert_eq!(controller.current_feedback(), feedback::COMPLETED);

        let events = feed(&mut controller, t0, 20_000, &[Left, Center, Right, Center]);
        assert_eq!(completions(&events), 0);
        assert!(controller.state().completed);
        assert_eq!(controller.state().repetition_count, 22);
        assert_eq!(controller.state().progress_percent, 100.0);
    }

    #[test]
    fn test_frame_gate_throttles() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);

        let first = controller.on_frame(PostureAssessment::synthetic(Direction::Left), t0);
        assert!(first.is_processed());
        let second = controller.on_frame(
            PostureAssessment::synthetic(Direction::Center),
            t0 + Duration::from_millis(10),
        );
        assert_eq!(second, FrameOutcome::Throttled);
        assert_eq!(controller.state().repetition_count, 0);
        assert_eq!(controller.state().last_direction, Direction::Left);
    }

    #[test]
    fn test_fallback_cycle_reaches_required_count() {
        let mut controller = SessionController::new(config(20));
        controller.set_engine_status(EngineStatus::Failed("no model".into()));
        assert_eq!(controller.start(Instant::now()).unwrap(), SessionMode::Fallback);

        let mut events = Vec::new();
        let mut ticks = 0;
        while !controller.state().completed {
            events.extend(controller.fallback_tick().into_events());
            ticks += 1;
            assert!(ticks < 100);
        }

        assert_eq!(ticks, 41);
        assert_eq!(controller.state().repetition_count, 20);
        assert_eq!(controller.state().mode, SessionMode::Fallback);
        assert_eq!(
            events.last(),
            Some(&SessionEvent::SessionCompleted {
                outcome: SessionOutcome::Success
            })
        );
    }

    #[test]
    fn test_live_frames_rejected_in_fallback() {
        let t0 = Instant::now();
        let mut controller = SessionController::new(config(20));
        controller.start(t0).unwrap();
        assert_eq!(
            controller.on_frame(PostureAssessment::synthetic(Direction::Left), t0),
            FrameOutcome::Rejected(Rejection::ModeMismatch)
        );

        let mut live = live_controller(20, t0);
        assert_eq!(
            live.fallback_tick(),
            FrameOutcome::Rejected(Rejection::ModeMismatch)
        );
    }

    #[test]
    fn test_stop_keeps_completed_reset_clears_it() {
        let t0 = Instant::now();
        let mut controller = live_controller(1, t0);
        feed(&mut controller, t0, 0, &[Direction::Left, Direction::Center]);
        assert!(controller.state().completed);

        controller.stop();
        let state = controller.state();
        assert!(!state.active);
        assert!(state.completed);
        assert_eq!(state.repetition_count, 0);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(controller.current_feedback(), feedback::STOPPED);

        controller.reset();
        assert!(!controller.state().completed);
        assert_eq!(controller.state().required_count, 1);
    }

    #[test]
    fn test_reset_while_active_keeps_running() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);
        let id = controller.state().session_id;
        feed(&mut controller, t0, 0, &[Direction::Left, Direction::Center, Direction::Right]);

        controller.reset();
        let state = controller.state();
        assert!(state.active);
        assert_eq!(state.mode, SessionMode::Live);
        assert_eq!(state.session_id, id);
        assert_eq!(state.repetition_count, 0);
        assert_eq!(state.last_direction, Direction::Center);

        // Tracker restarted at center: returning to center alone does not count
        let events = feed(&mut controller, t0, 5_000, &[Direction::Center]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_reset_restarts_fallback_cycle() {
        let mut controller = SessionController::new(config(20));
        controller.start(Instant::now()).unwrap();

        // C, L, C: one repetition, next step would be R
        for _ in 0..3 {
            controller.fallback_tick();
        }
        assert_eq!(controller.state().repetition_count, 1);

        controller.reset();
        assert!(controller.state().active);
        assert_eq!(controller.state().mode, SessionMode::Fallback);
        assert_eq!(controller.state().repetition_count, 0);

        // Cycle starts over at C, L
        let mut events = controller.fallback_tick().into_events();
        events.extend(controller.fallback_tick().into_events());
        assert_eq!(events, vec![SessionEvent::DirectionChanged(Direction::Left)]);
        assert_eq!(controller.state().last_direction, Direction::Left);

        let events = controller.fallback_tick().into_events();
        assert!(events.contains(&SessionEvent::RepetitionCompleted(1)));
    }

    #[test]
    fn test_accepted_frames_update_fps() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);
        assert_eq!(controller.state().frames_per_second, 0);

        for i in 0..=10u64 {
            let now = t0 + Duration::from_millis(100 * i);
            let assessment = PostureAssessment::synthetic(Direction::Center);
            assert!(controller.on_frame(assessment.clone(), now).is_processed());
            // Throttled frames are not counted
            assert_eq!(
                controller.on_frame(assessment, now + Duration::from_millis(30)),
                FrameOutcome::Throttled
            );
        }

        assert_eq!(controller.state().frames_per_second, 11);

        controller.stop();
        assert_eq!(controller.state().frames_per_second, 0);
    }

    #[test]
    fn test_watchdog_reports_stall_once() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);

        assert_eq!(controller.check_stalled(t0 + Duration::from_secs(4)), None);
        assert_eq!(controller.stall_deadline(), Some(t0 + Duration::from_secs(5)));
        assert_eq!(
            controller.check_stalled(t0 + Duration::from_secs(6)),
            Some(SessionEvent::Stalled {
                silent_for: Duration::from_secs(6)
            })
        );
        assert_eq!(controller.check_stalled(t0 + Duration::from_secs(7)), None);

        controller.on_empty_result(t0 + Duration::from_secs(8));
        assert_eq!(controller.current_feedback(), feedback::NO_PERSON);
        assert!(controller.check_stalled(t0 + Duration::from_secs(14)).is_some());
    }

    #[test]
    fn test_watchdog_idle_in_fallback() {
        let t0 = Instant::now();
        let mut controller = SessionController::new(config(20));
        controller.start(t0).unwrap();
        assert_eq!(controller.check_stalled(t0 + Duration::from_secs(60)), None);
        assert_eq!(controller.stall_deadline(), None);
    }

    #[test]
    fn test_engine_failure_switches_to_fallback() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);
        feed(&mut controller, t0, 0, &[Direction::Left, Direction::Center]);

        let events = controller.engine_failed("model crashed");
        assert_eq!(
            events,
            vec![SessionEvent::ModeChanged {
                mode: SessionMode::Fallback,
                reason: "model crashed".into()
            }]
        );
        assert_eq!(controller.state().mode, SessionMode::Fallback);
        assert_eq!(controller.state().repetition_count, 1);
        assert!(controller.wants_fallback_ticks());
        assert_eq!(controller.status_label(), "Simulation");

        // Counting continues with the same rule
        controller.fallback_tick();
        controller.fallback_tick();
        controller.fallback_tick();
        assert_eq!(controller.state().repetition_count, 2);
    }

    #[test]
    fn test_manual_mode_toggle() {
        let t0 = Instant::now();
        let mut controller = live_controller(20, t0);

        let events = controller.switch_to_fallback();
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::ModeChanged { mode: SessionMode::Fallback, .. }]
        ));

        let events = controller.retry_live(t0 + Duration::from_secs(1));
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::ModeChanged { mode: SessionMode::Live, .. }]
        ));
        assert_eq!(controller.state().mode, SessionMode::Live);
    }

    #[test]
    fn test_prefer_fallback_applies_to_next_start() {
        let t0 = Instant::now();
        let mut controller = SessionController::new(config(20));
        controller.set_engine_status(EngineStatus::Ready);
        controller.switch_to_fallback();
        assert_eq!(controller.start(t0).unwrap(), SessionMode::Fallback);
    }

    #[test]
    fn test_validated_frames_drive_counter() {
        let t0 = Instant::now();
        let validator = PostureValidator::default();
        let mut controller = live_controller(20, t0);

        let right = validator.validate(&lying_frame(0.10));
        let center = validator.validate(&lying_frame(0.0));
        controller.on_frame(right, t0);
        let outcome = controller.on_frame(center, t0 + Duration::from_millis(200));

        assert_eq!(
            outcome.events(),
            &[
                SessionEvent::DirectionChanged(Direction::Center),
                SessionEvent::RepetitionCompleted(1)
            ]
        );
        assert!(controller.current_feedback().contains("(1/20, 5%)"));
        assert!(controller.last_assessment().unwrap().is_correct_pose);
    }

    #[test]
    fn test_insufficient_landmarks_feedback_propagates() {
        let t0 = Instant::now();
        let validator = PostureValidator::default();
        let mut controller = live_controller(20, t0);

        let assessment = validator.validate(&posture_core::LandmarkFrame::default());
        controller.on_frame(assessment, t0);

        assert!(controller
            .current_feedback()
            .starts_with("Insufficient landmarks"));
        assert!(matches!(
            controller.last_assessment().unwrap().issue,
            Some(PostureIssue::InsufficientLandmarks { .. })
        ));
    }
}
