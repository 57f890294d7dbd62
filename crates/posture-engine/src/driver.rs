//! Async driver connecting a landmark stream to a session.
//!
//! One task owns the consumer side of the estimator channel, the fallback
//! ticker and the stall watchdog, and applies each of them to the session
//! through its [`SessionHandle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::engine::{EngineMessage, LandmarkStream};
use crate::handle::{ObserverId, SessionHandle};
use crate::session::SessionEvent;
use crate::validator::PostureValidator;

const EVENT_CAPACITY: usize = 64;

pub struct SessionDriver {
    handle: SessionHandle,
    validator: PostureValidator,
    fallback_interval: Duration,
}

impl SessionDriver {
    pub fn new(
        handle: SessionHandle,
        validator: PostureValidator,
        fallback_interval: Duration,
    ) -> Self {
        Self {
            handle,
            validator,
            fallback_interval,
        }
    }

    /// Spawn the driver loop on the current runtime.
    ///
    /// Session events are forwarded to [`DriverHandle::subscribe`] receivers
    /// until the loop exits, after which they see `RecvError::Closed`.
    pub fn spawn(self, stream: LandmarkStream) -> DriverHandle {
        let (tx, events) = broadcast::channel(EVENT_CAPACITY);
        let shutdown = Arc::new(Notify::new());
        let is_running = Arc::new(AtomicBool::new(true));

        // The observer holds the only sender
        let id = self.handle.on_event(move |event| {
            // No subscribers is fine
            let _ = tx.send(event.clone());
        });
        let forwarder = Forwarder {
            handle: self.handle.clone(),
            id,
        };

        let task = tokio::spawn(self.run(
            stream,
            shutdown.clone(),
            is_running.clone(),
            forwarder,
        ));

        DriverHandle {
            task,
            events,
            shutdown,
            is_running,
        }
    }

    async fn run(
        self,
        mut stream: LandmarkStream,
        shutdown: Arc<Notify>,
        is_running: Arc<AtomicBool>,
        _forwarder: Forwarder,
    ) {
        let mut ticker = time::interval(self.fallback_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        let mut stream_open = true;
        tracing::debug!("Session driver started");

        while is_running.load(Ordering::Acquire) {
            let deadline = self.handle.stall_deadline().map(Instant::from_std);
            let ticking = self.handle.wants_fallback_ticks();
            let watchdog = time::sleep_until(
                deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)),
            );

            tokio::select! {
                _ = shutdown.notified() => break,

                _ = self.handle.changed() => {}

                message = stream.next(), if stream_open => match message {
                    Some(message) => self.apply(message),
                    None => {
                        stream_open = false;
                        tracing::debug!("Landmark stream closed");
                        self.handle.engine_failed("landmark stream closed");
                    }
                },

                _ = ticker.tick(), if ticking => {
                    self.handle.fallback_tick();
                }

                _ = watchdog, if deadline.is_some() => {
                    self.handle.check_stalled();
                }
            }
        }

        is_running.store(false, Ordering::Release);
        tracing::debug!("Session driver stopped");
    }

    fn apply(&self, message: EngineMessage) {
        match message {
            EngineMessage::Frame(frame) => {
                let assessment = self.validator.validate(&frame);
                self.handle.on_frame(assessment);
            }
            EngineMessage::NoPerson => {
                self.handle.on_empty_result();
            }
            EngineMessage::Failed(reason) => {
                self.handle.engine_failed(&reason);
            }
        }
    }
}

/// Unregisters the event forwarder when the driver loop ends, however it ends
struct Forwarder {
    handle: SessionHandle,
    id: ObserverId,
}

impl Drop for Forwarder {
    fn drop(&mut self) {
        self.handle.remove_observer(self.id);
    }
}

/// Control side of a spawned [`SessionDriver`]
pub struct DriverHandle {
    task: JoinHandle<()>,
    /// Never read; kept so later subscribers can attach to the channel
    events: broadcast::Receiver<SessionEvent>,
    shutdown: Arc<Notify>,
    is_running: Arc<AtomicBool>,
}

impl DriverHandle {
    /// Receive session events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.resubscribe()
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// Stop the driver loop and wait for it to exit
    pub async fn shutdown(self) {
        self.is_running.store(false, Ordering::Release);
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            tracing::error!("Session driver task failed: {}", e);
        }
    }
}
