//! Gesture stream consumption and debouncing
//!
//! The camera-side classifier produces one noisy [`GestureSample`] per
//! rendered frame. This module turns that stream into at most one
//! [`GestureConfirmed`] event per debounce window, per gesture type, and
//! defines the boundary trait the camera integration implements.
//!
//! Debouncing is keyed by gesture type rather than globally: a child who
//! jumps to answer often triggers a spurious squat classification from
//! the same motion, and a global window would let that noise mask the
//! real answer. Per-type windows suppress repeats of the same gesture
//! across consecutive frames without coupling unrelated types.

use std::time::Duration;

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use crate::checkpoint::Gesture;

/// A single classified frame from the gesture source
///
/// Samples are ephemeral: produced per frame, consumed once by the
/// debouncer, never persisted. Timestamps are assumed monotonically
/// non-decreasing across the stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GestureSample {
    /// The movement the classifier saw in this frame
    pub gesture: Gesture,
    /// Classifier confidence in `[0, 1]`
    pub confidence: f32,
    /// Capture time of the frame
    pub timestamp: SystemTime,
}

/// A debounced gesture event, emitted at most once per window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfirmed {
    /// The confirmed gesture type
    pub gesture: Gesture,
    /// The timestamp of the sample that confirmed it
    pub at: SystemTime,
}

/// Converts the raw sample stream into debounced gesture events
///
/// A sample confirms iff its confidence clears the floor and the last
/// confirmation of the *same* gesture type is more than one debounce
/// interval in the past. Everything else (idle frames, low confidence,
/// chatter inside the window, regressed timestamps) is dropped silently.
///
/// The debouncer knows nothing about which question is active; the quiz
/// machine ignores confirmations that arrive in the wrong phase.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Minimum spacing between confirmations of the same gesture type
    interval: Duration,
    /// Minimum classifier confidence for a sample to count
    min_confidence: f32,
    /// Last confirmation time per gesture type
    last_confirmed: EnumMap<Gesture, Option<SystemTime>>,
}

impl Debouncer {
    /// Creates a debouncer with the given window and confidence floor
    pub fn new(interval: Duration, min_confidence: f32) -> Self {
        Self {
            interval,
            min_confidence,
            last_confirmed: EnumMap::default(),
        }
    }

    /// Feeds one sample through the debouncer
    ///
    /// # Returns
    ///
    /// `Some(GestureConfirmed)` if this sample opens a new debounce
    /// window for its gesture type, `None` if the sample was dropped.
    pub fn observe(&mut self, sample: GestureSample) -> Option<GestureConfirmed> {
        if matches!(sample.gesture, Gesture::Idle) {
            return None;
        }

        if sample.confidence < self.min_confidence {
            tracing::trace!(
                gesture = ?sample.gesture,
                confidence = sample.confidence,
                "dropping low-confidence sample"
            );
            return None;
        }

        if let Some(last) = self.last_confirmed[sample.gesture] {
            match sample.timestamp.duration_since(last) {
                Ok(elapsed) if elapsed > self.interval => {}
                // Within the window, or the stream clock regressed
                _ => return None,
            }
        }

        self.last_confirmed[sample.gesture] = Some(sample.timestamp);
        tracing::debug!(gesture = ?sample.gesture, "gesture confirmed");

        Some(GestureConfirmed {
            gesture: sample.gesture,
            at: sample.timestamp,
        })
    }

    /// Discards all in-flight debounce timestamps
    ///
    /// Called on session teardown; debounce state is never carried
    /// between sessions.
    pub fn reset(&mut self) {
        self.last_confirmed = EnumMap::default();
    }
}

/// Errors raised when the camera-side gesture source cannot run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user denied camera access
    #[error("camera permission denied")]
    PermissionDenied,
    /// The pose classifier failed to initialize
    #[error("gesture classifier failed to initialize: {0}")]
    InitFailed(String),
}

/// Boundary trait for the camera-backed gesture producer
///
/// Implementations own the camera and classifier lifecycle and push
/// [`GestureSample`]s into the engine at whatever rate frames render.
/// `stop` must release the camera; the engine guarantees it is called
/// on every exit path, including errors and teardown.
pub trait GestureSource {
    /// Acquires the camera and starts producing samples
    ///
    /// # Errors
    ///
    /// Returns a [`CameraError`] if the camera cannot be acquired or the
    /// classifier cannot initialize; the session may continue in a
    /// degraded mode where answers come from a fallback input.
    fn start(&mut self) -> Result<(), CameraError>;

    /// Stops producing samples and releases the camera
    fn stop(&mut self);
}
