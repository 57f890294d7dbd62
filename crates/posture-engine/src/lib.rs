//! # Posture-Engine
//!
//! Validation and repetition counting for a supine head-turn exercise.
//!
//! A pose estimator publishes [`LandmarkFrame`](posture_core::LandmarkFrame)s
//! into a latest-wins channel. Each frame is judged by the
//! [`PostureValidator`] and the resulting direction is folded into a
//! session by the [`SessionController`].
//!
//! ## Counting rule
//!
//! One repetition is counted each time the head returns to center from a
//! turned position. Turning out, swapping sides and repeated samples never
//! count. When no estimator is available the session runs on a synthetic
//! `Center → Left → Center → Right` cycle and counts by the same rule.
//!
//! ## Components
//!
//! 1. **Validator**: pure per-frame posture and direction classification
//! 2. **Direction tracker**: debounced transition detection
//! 3. **Session controller**: lifecycle, counters, live/fallback mode
//! 4. **Driver**: async task wiring the estimator stream, fallback ticker and stall watchdog

pub mod config;
pub mod direction;
pub mod driver;
pub mod engine;
pub mod fallback;
pub mod feedback;
pub mod handle;
pub mod pacing;
pub mod session;
pub mod validator;
pub mod watchdog;

pub use crate::config::*;
pub use direction::*;
pub use driver::*;
pub use engine::*;
pub use fallback::*;
pub use feedback::FeedbackGenerator;
pub use handle::{ObserverId, SessionHandle};
pub use pacing::*;
pub use session::*;
pub use validator::*;
pub use watchdog::*;
