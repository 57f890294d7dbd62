//! Shared, thread-safe access to one session controller.
//!
//! All mutations go through a single lock so frames, fallback ticks and user
//! commands never interleave. Observers are invoked after the lock is
//! released, so they may drive the session through the handle. Registering
//! a new observer from inside a callback deadlocks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;

use posture_core::{PostureAssessment, Result, SessionMode, SessionState};

use crate::config::SessionConfig;
use crate::engine::EngineStatus;
use crate::session::{FrameOutcome, SessionController, SessionEvent};

type Observer = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Registration returned by [`SessionHandle::on_event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Current instant on the runtime clock; follows tokio's paused time in tests
pub(crate) fn clock() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[derive(Clone)]
pub struct SessionHandle {
    controller: Arc<Mutex<SessionController>>,
    observers: Arc<RwLock<Vec<(ObserverId, Observer)>>>,
    next_observer: Arc<AtomicU64>,
    /// Signals the driver that mode or activity changed outside its loop
    wake: Arc<Notify>,
}

impl SessionHandle {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            controller: Arc::new(Mutex::new(SessionController::new(config))),
            observers: Arc::new(RwLock::new(Vec::new())),
            next_observer: Arc::new(AtomicU64::new(0)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Add a callback for session events
    pub fn on_event<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Box::new(callback)));
        id
    }

    /// Drop a callback added by [`on_event`](Self::on_event); false if already gone
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(registered, _)| *registered != id);
        observers.len() != before
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    fn dispatch(&self, events: &[SessionEvent]) {
        if events.is_empty() {
            return;
        }
        let observers = self.observers.read();
        for event in events {
            for (_, observer) in observers.iter() {
                observer(event);
            }
        }
    }

    /// Read the controller under its lock; mutations go through the handle methods
    pub fn inspect<R>(&self, f: impl FnOnce(&SessionController) -> R) -> R {
        f(&self.controller.lock())
    }

    /// Resolves after the next lifecycle or mode change
    pub(crate) async fn changed(&self) {
        self.wake.notified().await;
    }

    pub fn start(&self) -> Result<SessionMode> {
        let mode = self.controller.lock().start(clock())?;
        self.wake.notify_one();
        Ok(mode)
    }

    pub fn stop(&self) {
        self.controller.lock().stop();
        self.wake.notify_one();
    }

    pub fn reset(&self) {
        self.controller.lock().reset();
        self.wake.notify_one();
    }

    pub fn set_engine_status(&self, status: EngineStatus) {
        self.controller.lock().set_engine_status(status);
    }

    pub fn on_frame(&self, assessment: PostureAssessment) -> FrameOutcome {
        let outcome = self.controller.lock().on_frame(assessment, clock());
        self.dispatch(outcome.events());
        outcome
    }

    pub fn on_empty_result(&self) -> FrameOutcome {
        self.controller.lock().on_empty_result(clock())
    }

    pub fn fallback_tick(&self) -> FrameOutcome {
        let outcome = self.controller.lock().fallback_tick();
        self.dispatch(outcome.events());
        outcome
    }

    pub fn engine_failed(&self, reason: &str) {
        let events = self.controller.lock().engine_failed(reason);
        self.wake.notify_one();
        self.dispatch(&events);
    }

    pub fn switch_to_fallback(&self) {
        let events = self.controller.lock().switch_to_fallback();
        self.wake.notify_one();
        self.dispatch(&events);
    }

    pub fn retry_live(&self) {
        let events = self.controller.lock().retry_live(clock());
        self.wake.notify_one();
        self.dispatch(&events);
    }

    pub fn check_stalled(&self) -> Option<SessionEvent> {
        let event = self.controller.lock().check_stalled(clock());
        if let Some(event) = &event {
            self.dispatch(std::slice::from_ref(event));
        }
        event
    }

    pub(crate) fn stall_deadline(&self) -> Option<Instant> {
        self.controller.lock().stall_deadline()
    }

    pub(crate) fn wants_fallback_ticks(&self) -> bool {
        self.controller.lock().wants_fallback_ticks()
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> SessionState {
        self.controller.lock().state().clone()
    }

    pub fn current_feedback(&self) -> String {
        self.controller.lock().current_feedback().to_string()
    }

    pub fn status_label(&self) -> &'static str {
        self.controller.lock().status_label()
    }
}
