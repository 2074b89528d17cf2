//! # Hopquiz Engine Library
//!
//! This library provides the core logic for gesture-answered interactive
//! video quizzes: a child watches a streamed video, the video pauses at
//! predetermined checkpoints, and multiple-choice questions are answered
//! by jumping, squatting, or clapping in front of a camera.
//!
//! The engine is sans-IO. It watches playback position against a fixed
//! playlist of checkpoints, fires each checkpoint exactly once,
//! debounces the camera classifier's noisy gesture stream into single
//! answer events, and reconciles scoring, completion, and resumption.
//! The concrete video player, camera pipeline, timers, and UI stay
//! behind the [`playback::PlaybackHandle`], [`gesture::GestureSource`],
//! and [`tunnel::Tunnel`] boundaries, so they are swappable
//! implementations rather than part of the contract.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod checkpoint;
pub mod constants;
pub mod engine;
pub mod gesture;
pub mod playback;
pub mod quiz;
pub mod scheduler;
pub mod session;
pub mod tunnel;

pub use checkpoint::{AnswerOption, Checkpoint, CheckpointId, Gesture, OptionId, Playlist};
pub use engine::{Command, Engine, Event};
pub use gesture::{Debouncer, GestureConfirmed, GestureSample, GestureSource};
pub use playback::{PlaybackHandle, PlayerEvent, PlayerState};
pub use quiz::{AlarmMessage, Phase, Quiz, QuizOptions, SyncMessage, UpdateMessage};
pub use session::{FinalSummary, SessionSnapshot};
pub use tunnel::Tunnel;
