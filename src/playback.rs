//! Playback adapter boundary
//!
//! This module isolates the engine from the concrete video surface. The
//! engine issues fire-and-forget commands through [`PlaybackHandle`] and
//! observes the surface through polled queries and [`PlayerEvent`]s; it
//! never assumes a command took effect synchronously. Implementations
//! might wrap an embedded iframe player, a native media element, or a
//! scripted fake in tests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Playback state of the external video surface
///
/// The engine treats state codes abstractly; anything it does not
/// recognize is folded into `Buffering`, under which the scheduler
/// simply does not fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// The surface has not begun playback
    Unstarted,
    /// Playback is advancing
    Playing,
    /// Playback is halted but resumable
    Paused,
    /// The surface is stalled fetching data (also the safe default for
    /// unknown codes)
    Buffering,
    /// The video reached its end
    Ended,
}

impl PlayerState {
    /// Maps an external surface's integer state code to a [`PlayerState`]
    ///
    /// Known codes follow the embedded-player convention: -1 unstarted,
    /// 0 ended, 1 playing, 2 paused, 3 buffering, 5 cued. Unrecognized
    /// codes map to `Buffering`.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::Unstarted,
            0 => Self::Ended,
            1 => Self::Playing,
            2 => Self::Paused,
            _ => Self::Buffering,
        }
    }
}

/// An opaque error code reported by the playback surface
///
/// The engine never interprets the code beyond passing it to the
/// consumer; [`describe`](Self::describe) translates the codes the
/// embedded-player convention defines for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerErrorCode(i32);

impl PlayerErrorCode {
    /// Wraps a raw error code from the playback surface
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw error code
    pub fn code(self) -> i32 {
        self.0
    }

    /// Human-readable description of the error code
    pub fn describe(self) -> &'static str {
        match self.0 {
            2 => "invalid video id",
            5 => "HTML5 player error",
            100 => "video not found or private",
            101 | 150 => "video not available in embedded players",
            _ => "unknown player error",
        }
    }
}

/// An event emitted by the playback surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The surface transitioned to a new playback state
    StateChange(PlayerState),
    /// The surface reported a fatal error
    Error(PlayerErrorCode),
}

/// Command-and-query contract over the external video surface
///
/// Commands are fire-and-forget: the adapter forwards them to the
/// surface without guaranteeing synchronous effect. Callers confirm
/// outcomes by observing [`PlayerEvent`]s or polling `current_time` and
/// `state`. The adapter performs no error recovery of its own; surface
/// errors arrive as [`PlayerEvent::Error`].
pub trait PlaybackHandle {
    /// Commands the surface to start or resume playback
    fn play(&self);

    /// Commands the surface to halt playback
    fn pause(&self);

    /// Commands the surface to jump to the given playback position
    fn seek(&self, to: Duration);

    /// Current playback position as last reported by the surface
    fn current_time(&self) -> Duration;

    /// Current playback state as last reported by the surface
    fn state(&self) -> PlayerState;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known_states() {
        assert_eq!(PlayerState::from_code(-1), PlayerState::Unstarted);
        assert_eq!(PlayerState::from_code(0), PlayerState::Ended);
        assert_eq!(PlayerState::from_code(1), PlayerState::Playing);
        assert_eq!(PlayerState::from_code(2), PlayerState::Paused);
        assert_eq!(PlayerState::from_code(3), PlayerState::Buffering);
    }

    #[test]
    fn test_from_code_unknown_states_are_buffering() {
        assert_eq!(PlayerState::from_code(5), PlayerState::Buffering);
        assert_eq!(PlayerState::from_code(42), PlayerState::Buffering);
        assert_eq!(PlayerState::from_code(-7), PlayerState::Buffering);
    }

    #[test]
    fn test_error_code_descriptions() {
        assert_eq!(PlayerErrorCode::new(2).describe(), "invalid video id");
        assert_eq!(PlayerErrorCode::new(100).describe(), "video not found or private");
        assert_eq!(
            PlayerErrorCode::new(101).describe(),
            PlayerErrorCode::new(150).describe()
        );
        assert_eq!(PlayerErrorCode::new(9999).describe(), "unknown player error");
        assert_eq!(PlayerErrorCode::new(9999).code(), 9999);
    }
}
