//! # Posture-Core
//!
//! Core types and utilities for landmark-based posture repetition tracking.
//!
//! A pose-estimation engine emits one [`LandmarkFrame`] per processed image:
//! 33 normalized keypoints in the BlazePose topology, each with an optional
//! visibility score. Downstream crates judge each frame into a
//! [`PostureAssessment`] and fold the resulting [`Direction`] stream into a
//! repetition count.

pub mod error;
pub mod geometry;
pub mod session;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use session::*;
pub use types::*;
