//! Quiz state machine and session coordination
//!
//! This module contains the central coordinator for a quiz run. The
//! [`Quiz`] owns the session, drives the playback surface, consumes
//! scheduler polls and debounced gesture events, and emits score and
//! state updates to the consumer.
//!
//! Two independently-clocked loops feed the machine: the scheduler's
//! fixed polling tick and the gesture source's per-frame callback. Both
//! arrive here as ordered method calls on `&mut self`, so every state
//! transition is strictly serialized regardless of source loop timing;
//! neither loop ever touches the session directly.

use std::time::Duration;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    checkpoint::{AnswerOption, CheckpointId, Gesture, Playlist},
    constants,
    gesture::{CameraError, Debouncer, GestureConfirmed, GestureSample},
    playback::{PlaybackHandle, PlayerErrorCode, PlayerEvent, PlayerState},
    scheduler::CheckpointScheduler,
    session::{FinalSummary, Session, SessionSnapshot},
    tunnel::Tunnel,
};

/// Represents the current phase of a quiz run
///
/// The machine loops `Playing ⇄ AwaitingGesture → Feedback → Playing`
/// once per checkpoint until every checkpoint is resolved and the video
/// ends. `Errored` is reachable from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    /// No session exists
    Idle,
    /// Session created; playback not yet commanded to play
    WaitingToStart,
    /// Playback running, checkpoint polling active
    Playing,
    /// Playback paused on a fired checkpoint, answer pending
    AwaitingGesture {
        /// The checkpoint awaiting an answer
        checkpoint: CheckpointId,
    },
    /// Showing the outcome of an answer before resuming
    Feedback {
        /// The checkpoint that was just resolved
        checkpoint: CheckpointId,
        /// How it was resolved
        outcome: AnswerOutcome,
    },
    /// Terminal: final score and tallies are frozen
    Completed,
    /// The playback surface reported a fatal error; resuming requires
    /// an explicit start command
    Errored {
        /// The error code the surface reported
        code: PlayerErrorCode,
    },
}

/// How a checkpoint was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// The gesture that answered, or `None` on timeout
    pub chosen: Option<Gesture>,
    /// Whether the chosen option was the correct one
    pub correct: bool,
}

/// Session-level failures surfaced to the consumer
///
/// Faults travel as typed messages, never as panics across the poll or
/// callback boundary. The machine decides the consequence: a playback
/// fault halts the session, a camera fault degrades it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fault {
    /// The playback surface reported a fatal error
    Playback {
        /// The opaque error code
        code: PlayerErrorCode,
    },
    /// The gesture source could not initialize; checkpoints still fire
    /// but answers must come from the consumer's fallback input
    CameraUnavailable {
        /// Why the camera could not be used
        reason: String,
    },
}

/// Alarm messages for timed quiz transitions
///
/// Scheduled through the `schedule_message` closure and delivered back
/// via [`Quiz::receive_alarm`]. Stale alarms (the phase moved on before
/// delivery) are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Auto-resolve an unanswered checkpoint as incorrect
    AnswerTimeout {
        /// The checkpoint that was awaiting an answer when scheduled
        checkpoint: CheckpointId,
    },
    /// End the feedback display and resume playback
    FeedbackElapsed {
        /// The checkpoint whose feedback is being displayed
        checkpoint: CheckpointId,
    },
}

/// Update messages sent to the consumer about quiz state changes
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// Session created; waiting for a raised hand or explicit start
    AwaitingStart,
    /// Playback commanded to run
    Started,
    /// A checkpoint fired and its question is on screen
    QuestionPresented {
        /// The fired checkpoint
        checkpoint: CheckpointId,
        /// Position of the checkpoint in the playlist (0-based)
        index: usize,
        /// Total number of checkpoints
        count: usize,
        /// The question text
        question: String,
        /// The three gesture-answerable options
        options: Vec<AnswerOption>,
    },
    /// A debounced gesture was confirmed (independent of correctness)
    GestureObserved {
        /// The confirmed gesture
        gesture: Gesture,
        /// Total confirmed occurrences of this gesture this session
        count: u64,
    },
    /// A checkpoint was resolved by an answer or timeout
    AnswerJudged {
        /// The resolved checkpoint
        checkpoint: CheckpointId,
        /// The gesture that answered, or `None` on timeout
        chosen: Option<Gesture>,
        /// Whether the answer was correct
        correct: bool,
        /// Cumulative score after judging
        score: u64,
    },
    /// A checkpoint's window was jumped over; it will never fire
    CheckpointMissed {
        /// The skipped checkpoint
        checkpoint: CheckpointId,
    },
    /// Feedback display ended and playback resumed
    Resumed,
    /// The quiz completed; results are frozen
    Summary(FinalSummary),
    /// A session-level failure occurred
    Fault(Fault),
}

/// Sync messages carrying the complete view for an attaching consumer
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// No session exists
    Idle,
    /// Waiting for the start gesture or command
    WaitingToStart {
        /// Current session counters
        snapshot: SessionSnapshot,
    },
    /// Playback running
    Playing {
        /// Current session counters
        snapshot: SessionSnapshot,
    },
    /// A question is on screen awaiting a gesture
    AwaitingGesture {
        /// Current session counters
        snapshot: SessionSnapshot,
        /// The fired checkpoint
        checkpoint: CheckpointId,
        /// Position of the checkpoint in the playlist (0-based)
        index: usize,
        /// Total number of checkpoints
        count: usize,
        /// The question text
        question: String,
        /// The three gesture-answerable options
        options: Vec<AnswerOption>,
    },
    /// Feedback for the last answer is on screen
    Feedback {
        /// Current session counters
        snapshot: SessionSnapshot,
        /// The checkpoint that was just resolved
        checkpoint: CheckpointId,
        /// How it was resolved
        outcome: AnswerOutcome,
    },
    /// The quiz completed
    Completed {
        /// The frozen results
        summary: FinalSummary,
    },
    /// The session halted on a playback fault
    Errored {
        /// The fault that halted the session
        fault: Fault,
    },
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never
    /// happen with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never
    /// happen with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Validation result type for duration validation
type ValidationResult = garde::Result;

/// Validates that a duration falls within bounds given in milliseconds
fn validate_duration<const MIN_MS: u64, const MAX_MS: u64>(
    field: &'static str,
    val: &Duration,
) -> ValidationResult {
    if (MIN_MS..=MAX_MS).contains(&u64::try_from(val.as_millis()).unwrap_or(u64::MAX)) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_MS}ms,{MAX_MS}ms]",
        )))
    }
}

/// Validates the scheduler polling tick
fn validate_tick(val: &Duration) -> ValidationResult {
    validate_duration::<{ constants::scheduler::MIN_TICK }, { constants::scheduler::MAX_TICK }>(
        "tick", val,
    )
}

/// Validates the gesture debounce interval
fn validate_debounce(val: &Duration) -> ValidationResult {
    validate_duration::<{ constants::debounce::MIN_INTERVAL }, { constants::debounce::MAX_INTERVAL }>(
        "debounce_interval",
        val,
    )
}

/// Validates the feedback display delay
fn validate_feedback_delay(val: &Duration) -> ValidationResult {
    validate_duration::<{ constants::feedback::MIN_DELAY }, { constants::feedback::MAX_DELAY }>(
        "feedback_delay",
        val,
    )
}

/// Validates the optional answer timeout
fn validate_answer_timeout(val: &Option<Duration>) -> ValidationResult {
    match val {
        Some(timeout) => validate_duration::<
            { constants::answer::MIN_TIMEOUT },
            { constants::answer::MAX_TIMEOUT },
        >("answer_timeout", timeout),
        None => Ok(()),
    }
}

/// Tunable parameters for a quiz run
///
/// All timing values were tuned empirically in the field; they are
/// configuration bounded by [`constants`], not engine invariants.
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizOptions {
    /// Scheduler polling interval; shorter trigger windows require
    /// shorter ticks
    #[garde(custom(|v, _| validate_tick(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    tick: Duration,
    /// Minimum spacing between confirmations of the same gesture type
    #[garde(custom(|v, _| validate_debounce(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    debounce_interval: Duration,
    /// Minimum classifier confidence for a sample to count
    #[garde(range(min = 0.0, max = 1.0))]
    min_confidence: f32,
    /// How long the answer feedback stays on screen before resuming
    #[garde(custom(|v, _| validate_feedback_delay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    feedback_delay: Duration,
    /// Auto-resolve an unanswered checkpoint after this long;
    /// `None` waits indefinitely
    #[garde(custom(|v, _| validate_answer_timeout(v)))]
    #[serde_as(as = "Option<serde_with::DurationMilliSeconds<u64>>")]
    answer_timeout: Option<Duration>,
}

impl Default for QuizOptions {
    /// The empirically tuned defaults
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(constants::scheduler::DEFAULT_TICK),
            debounce_interval: Duration::from_millis(constants::debounce::DEFAULT_INTERVAL),
            min_confidence: constants::debounce::DEFAULT_MIN_CONFIDENCE,
            feedback_delay: Duration::from_millis(constants::feedback::DEFAULT_DELAY),
            answer_timeout: None,
        }
    }
}

impl QuizOptions {
    /// Scheduler polling interval
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Gesture debounce interval
    pub fn debounce_interval(&self) -> Duration {
        self.debounce_interval
    }

    /// Minimum classifier confidence
    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Feedback display delay
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// Optional answer timeout
    pub fn answer_timeout(&self) -> Option<Duration> {
        self.answer_timeout
    }

    /// Replaces the answer timeout
    pub fn with_answer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.answer_timeout = timeout;
        self
    }

    /// Replaces the feedback delay
    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    /// Replaces the debounce interval
    pub fn with_debounce_interval(mut self, interval: Duration) -> Self {
        self.debounce_interval = interval;
        self
    }
}

/// The central quiz coordinator
///
/// Owns the session exclusively; the scheduler poll and the gesture
/// callback both go through `&mut self` methods here, which is what
/// serializes the two loops. Playback commands keep a strict pairing:
/// `pause` is issued exactly on entering `AwaitingGesture` and `play`
/// exactly on leaving `Feedback` for `Playing` (plus the initial start),
/// so the learner can never be left paused outside a question.
pub struct Quiz {
    /// Checkpoint firing decisions
    scheduler: CheckpointScheduler,
    /// Raw sample stream to confirmed events
    debouncer: Debouncer,
    /// The mutable per-run record
    session: Session,
    /// Current machine phase
    phase: Phase,
    /// Tunable timing parameters
    options: QuizOptions,
}

impl Quiz {
    /// Creates a machine over a validated playlist
    pub fn new(playlist: Playlist, options: QuizOptions) -> Self {
        Self {
            scheduler: CheckpointScheduler::new(playlist),
            debouncer: Debouncer::new(options.debounce_interval, options.min_confidence),
            session: Session::new(),
            phase: Phase::Idle,
            options,
        }
    }

    /// Current machine phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The tunable parameters this run uses
    pub fn options(&self) -> &QuizOptions {
        &self.options
    }

    /// The playlist this run is answering
    pub fn playlist(&self) -> &Playlist {
        self.scheduler.playlist()
    }

    /// Read-only view of the session counters
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Handles the consumer's start command
    ///
    /// From `Idle` this creates the session and waits for the start
    /// gesture; from `WaitingToStart` it begins playback immediately
    /// (the explicit alternative to raising a hand); from `Errored` it
    /// resumes the halted session. Anywhere else it is a no-op.
    pub fn start<P: PlaybackHandle, T: Tunnel>(&mut self, playback: &P, tunnel: &T) {
        match self.phase {
            Phase::Idle => {
                self.session = Session::new();
                self.phase = Phase::WaitingToStart;
                tunnel.send_update(&UpdateMessage::AwaitingStart);
            }
            Phase::WaitingToStart | Phase::Errored { .. } => {
                self.begin_playing(playback, tunnel);
            }
            _ => (),
        }
    }

    /// Commands playback to run and activates checkpoint polling
    fn begin_playing<P: PlaybackHandle, T: Tunnel>(&mut self, playback: &P, tunnel: &T) {
        self.phase = Phase::Playing;
        playback.play();
        tracing::info!("playback started");
        tunnel.send_update(&UpdateMessage::Started);
    }

    /// Evaluates one scheduler tick
    ///
    /// Call this on the fixed polling interval while a session runs.
    /// Fires at most one checkpoint; checkpoints whose window was
    /// jumped over are marked missed. If the surface already reports
    /// `Ended`, the quiz completes (polling-only drivers need no
    /// separate ended event).
    pub fn tick<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        playback: &P,
        tunnel: &T,
        schedule_message: S,
    ) {
        if !matches!(self.phase, Phase::Playing) {
            return;
        }

        let state = playback.state();
        if state == PlayerState::Ended {
            self.complete(tunnel);
            return;
        }

        let outcome = self
            .scheduler
            .poll(playback.current_time(), state, &self.session);

        for id in outcome.missed {
            if self.session.record_missed(id) {
                tunnel.send_update(&UpdateMessage::CheckpointMissed { checkpoint: id });
            }
        }

        if let Some(id) = outcome.fire {
            self.fire_checkpoint(id, playback, tunnel, schedule_message);
        }
    }

    /// Pauses playback and presents a checkpoint's question
    fn fire_checkpoint<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        id: CheckpointId,
        playback: &P,
        tunnel: &T,
        mut schedule_message: S,
    ) {
        let Some(checkpoint) = self.scheduler.playlist().get(id) else {
            return;
        };
        let question = checkpoint.question().to_owned();
        let options = checkpoint.options().to_vec();
        let index = self.scheduler.playlist().index_of(id).unwrap_or(0);
        let count = self.scheduler.playlist().len();

        playback.pause();
        self.session.set_current(id);
        self.phase = Phase::AwaitingGesture { checkpoint: id };
        tracing::info!(checkpoint = %id, index, "checkpoint fired");

        if let Some(timeout) = self.options.answer_timeout {
            schedule_message(AlarmMessage::AnswerTimeout { checkpoint: id }, timeout);
        }

        tunnel.send_update(&UpdateMessage::QuestionPresented {
            checkpoint: id,
            index,
            count,
            question,
            options,
        });
    }

    /// Feeds one raw classifier sample through the debouncer
    ///
    /// Most samples are dropped; at most one confirmation per debounce
    /// window reaches the machine.
    pub fn receive_sample<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        sample: GestureSample,
        playback: &P,
        tunnel: &T,
        schedule_message: S,
    ) {
        if let Some(confirmed) = self.debouncer.observe(sample) {
            self.apply_confirmed(confirmed, playback, tunnel, schedule_message);
        }
    }

    /// Dispatches a confirmed gesture event
    ///
    /// Confirmations tally regardless of correctness, but only drive a
    /// transition when the phase asks for one: a raised hand starts a
    /// waiting session, and an answerable gesture answers the pending
    /// checkpoint. Everything else is a no-op.
    pub fn apply_confirmed<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        confirmed: GestureConfirmed,
        playback: &P,
        tunnel: &T,
        schedule_message: S,
    ) {
        if matches!(
            self.phase,
            Phase::Idle | Phase::Completed | Phase::Errored { .. }
        ) {
            return;
        }

        self.session.record_gesture(confirmed.gesture);
        tunnel.send_update(&UpdateMessage::GestureObserved {
            gesture: confirmed.gesture,
            count: self.session.gesture_counts()[confirmed.gesture],
        });

        match self.phase {
            Phase::WaitingToStart if confirmed.gesture == Gesture::RaiseHand => {
                self.begin_playing(playback, tunnel);
            }
            Phase::AwaitingGesture { checkpoint } if confirmed.gesture.is_answerable() => {
                self.resolve(
                    checkpoint,
                    Some(confirmed.gesture),
                    playback,
                    tunnel,
                    schedule_message,
                );
            }
            _ => (),
        }
    }

    /// Answers the pending checkpoint from the consumer's fallback input
    ///
    /// Used in degraded (camera-less) sessions. Accepted only while a
    /// checkpoint awaits an answer and only for answerable gestures;
    /// the debouncer is bypassed and no tally is recorded.
    pub fn answer_with<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        gesture: Gesture,
        playback: &P,
        tunnel: &T,
        schedule_message: S,
    ) {
        if let Phase::AwaitingGesture { checkpoint } = self.phase {
            if gesture.is_answerable() {
                self.resolve(checkpoint, Some(gesture), playback, tunnel, schedule_message);
            }
        }
    }

    /// Resolves a checkpoint with a chosen gesture or a timeout
    fn resolve<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        id: CheckpointId,
        chosen: Option<Gesture>,
        _playback: &P,
        tunnel: &T,
        mut schedule_message: S,
    ) {
        let correct = chosen
            .and_then(|gesture| {
                self.scheduler
                    .playlist()
                    .get(id)
                    .and_then(|c| c.option_for_gesture(gesture).map(|o| c.is_correct(o.id())))
            })
            .unwrap_or(false);

        if !self.session.record_answer(id, correct) {
            return;
        }
        self.session.clear_current();

        let outcome = AnswerOutcome { chosen, correct };
        self.phase = Phase::Feedback {
            checkpoint: id,
            outcome,
        };
        tracing::info!(checkpoint = %id, correct, "answer judged");

        schedule_message(
            AlarmMessage::FeedbackElapsed { checkpoint: id },
            self.options.feedback_delay,
        );

        tunnel.send_update(&UpdateMessage::AnswerJudged {
            checkpoint: id,
            chosen,
            correct,
            score: self.session.score(),
        });
    }

    /// Handles a scheduled alarm
    ///
    /// Alarms carry the checkpoint they were scheduled for; if the
    /// phase has moved on since scheduling, the alarm is stale and is
    /// ignored.
    pub fn receive_alarm<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: AlarmMessage,
        playback: &P,
        tunnel: &T,
        schedule_message: S,
    ) {
        match message {
            AlarmMessage::AnswerTimeout { checkpoint } => match self.phase {
                Phase::AwaitingGesture {
                    checkpoint: pending,
                } if pending == checkpoint => {
                    tracing::info!(checkpoint = %checkpoint, "answer timed out");
                    self.resolve(checkpoint, None, playback, tunnel, schedule_message);
                }
                _ => (),
            },
            AlarmMessage::FeedbackElapsed { checkpoint } => match self.phase {
                Phase::Feedback {
                    checkpoint: shown, ..
                } if shown == checkpoint => {
                    if self.scheduler.exhausted(&self.session)
                        && playback.state() == PlayerState::Ended
                    {
                        self.complete(tunnel);
                    } else {
                        self.phase = Phase::Playing;
                        playback.play();
                        tunnel.send_update(&UpdateMessage::Resumed);
                    }
                }
                _ => (),
            },
        }
    }

    /// Handles an event from the playback surface
    ///
    /// `Ended` completes the quiz when playback was running (remaining
    /// checkpoints can never fire and are marked missed). An error moves
    /// the machine to `Errored`; from then on it stops commanding
    /// playback until an explicit start.
    pub fn receive_player_event<T: Tunnel>(&mut self, event: PlayerEvent, tunnel: &T) {
        match event {
            PlayerEvent::StateChange(PlayerState::Ended) => {
                if matches!(self.phase, Phase::Playing) {
                    self.complete(tunnel);
                }
            }
            PlayerEvent::StateChange(_) => (),
            PlayerEvent::Error(code) => {
                if matches!(self.phase, Phase::Idle | Phase::Completed) {
                    return;
                }
                tracing::error!(code = code.code(), "playback surface error");
                self.phase = Phase::Errored { code };
                self.session.clear_current();
                tunnel.send_update(&UpdateMessage::Fault(Fault::Playback { code }));
            }
        }
    }

    /// Reports that the gesture source could not initialize
    ///
    /// The session continues in degraded mode: checkpoints still fire,
    /// and answers come through [`answer_with`](Self::answer_with).
    pub fn camera_unavailable<T: Tunnel>(&mut self, error: &CameraError, tunnel: &T) {
        tracing::warn!(%error, "gesture source unavailable, degrading");
        tunnel.send_update(&UpdateMessage::Fault(Fault::CameraUnavailable {
            reason: error.to_string(),
        }));
    }

    /// Handles the consumer's skip command
    ///
    /// Seeks directly into the checkpoint's window and fires it early.
    /// Only valid while playing and only for checkpoints that have not
    /// been resolved or missed.
    pub fn skip_to_checkpoint<P: PlaybackHandle, T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        id: CheckpointId,
        playback: &P,
        tunnel: &T,
        schedule_message: S,
    ) {
        if !matches!(self.phase, Phase::Playing) {
            return;
        }
        if !self.scheduler.eligible(id, &self.session) {
            return;
        }
        if let Some(checkpoint) = self.scheduler.playlist().get(id) {
            playback.seek(checkpoint.trigger_time());
        }
        self.fire_checkpoint(id, playback, tunnel, schedule_message);
    }

    /// Finalizes the quiz: freezes results and reports the summary
    fn complete<T: Tunnel>(&mut self, tunnel: &T) {
        let unresolved = self
            .scheduler
            .playlist()
            .checkpoints()
            .iter()
            .map(crate::checkpoint::Checkpoint::id)
            .filter(|id| !self.session.is_completed(*id) && !self.session.is_missed(*id))
            .collect_vec();
        for id in unresolved {
            if self.session.record_missed(id) {
                tunnel.send_update(&UpdateMessage::CheckpointMissed { checkpoint: id });
            }
        }

        let summary = self
            .session
            .freeze_summary(self.scheduler.playlist().len())
            .clone();
        self.phase = Phase::Completed;
        tracing::info!(score = summary.score, "quiz completed");
        tunnel.send_update(&UpdateMessage::Summary(summary));
    }

    /// Tears the session down
    ///
    /// Destroys the session, discards in-flight debounce timestamps,
    /// and returns to `Idle`. No checkpoint or gesture processing
    /// happens afterwards; any alarm still in flight becomes stale.
    pub fn stop(&mut self) {
        tracing::info!("session stopped");
        self.debouncer.reset();
        self.session = Session::new();
        self.phase = Phase::Idle;
    }

    /// Returns the message necessary to synchronize a consumer's view
    pub fn state_message(&self) -> SyncMessage {
        match self.phase {
            Phase::Idle => SyncMessage::Idle,
            Phase::WaitingToStart => SyncMessage::WaitingToStart {
                snapshot: self.session.snapshot(),
            },
            Phase::Playing => SyncMessage::Playing {
                snapshot: self.session.snapshot(),
            },
            Phase::AwaitingGesture { checkpoint } => {
                let (question, options) = self
                    .scheduler
                    .playlist()
                    .get(checkpoint)
                    .map(|c| (c.question().to_owned(), c.options().to_vec()))
                    .unwrap_or_default();
                SyncMessage::AwaitingGesture {
                    snapshot: self.session.snapshot(),
                    checkpoint,
                    index: self
                        .scheduler
                        .playlist()
                        .index_of(checkpoint)
                        .unwrap_or(0),
                    count: self.scheduler.playlist().len(),
                    question,
                    options,
                }
            }
            Phase::Feedback {
                checkpoint,
                outcome,
            } => SyncMessage::Feedback {
                snapshot: self.session.snapshot(),
                checkpoint,
                outcome,
            },
            Phase::Completed => SyncMessage::Completed {
                summary: self
                    .session
                    .summary()
                    .cloned()
                    .unwrap_or_else(|| {
                        self.session
                            .freeze_summary(self.scheduler.playlist().len())
                            .clone()
                    }),
            },
            Phase::Errored { code } => SyncMessage::Errored {
                fault: Fault::Playback { code },
            },
        }
    }
}
