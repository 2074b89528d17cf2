//! Event serialization and resource lifecycle
//!
//! Two independently-clocked producers feed a quiz: the scheduler's
//! timer tick and the gesture source's frame callback. Letting both
//! mutate session state directly is the primary correctness risk of
//! this design, so the [`Engine`] funnels everything through a single
//! [`Event`] queue drained one message at a time by the sole owner of
//! the [`Quiz`]. Producers only ever enqueue; they never block the
//! drain and never observe partial transitions.
//!
//! The engine also owns the camera lifecycle through [`CameraLease`]:
//! acquired when a source is attached, released on every exit path
//! including teardown and drop, so a stuck camera indicator cannot
//! outlive the session.

use std::{collections::VecDeque, time::Duration};

use crate::{
    checkpoint::{CheckpointId, Gesture},
    gesture::{CameraError, GestureSample, GestureSource},
    playback::{PlaybackHandle, PlayerEvent},
    quiz::{AlarmMessage, Quiz},
    tunnel::Tunnel,
};

/// Commands arriving from the consumer boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create the session, or begin/resume playback
    Start,
    /// Tear the session down
    Stop,
    /// Force-seek into a checkpoint's window and fire it early
    SkipTo(CheckpointId),
    /// Fallback answer input for degraded (camera-less) sessions
    Answer(Gesture),
}

/// A unit of work for the single-consumer queue
#[derive(Debug, Clone, Copy, derive_more::From)]
pub enum Event {
    /// The scheduler's polling tick elapsed
    #[from(ignore)]
    Tick,
    /// The gesture source classified a frame
    Sample(GestureSample),
    /// The playback surface reported a state change or error
    Player(PlayerEvent),
    /// A scheduled alarm came due
    Alarm(AlarmMessage),
    /// The consumer issued a command
    Command(Command),
}

/// Scoped ownership of a running gesture source
///
/// Acquiring the lease starts the source; dropping it (or calling
/// [`release`](Self::release)) stops it. Holding camera access in a
/// guard ties its lifetime to the session that needed it.
pub struct CameraLease<G: GestureSource> {
    source: G,
    active: bool,
}

impl<G: GestureSource> CameraLease<G> {
    /// Starts the source and takes ownership of it
    ///
    /// # Errors
    ///
    /// Returns the source's [`CameraError`] if it cannot start; the
    /// source is dropped in that case.
    pub fn acquire(mut source: G) -> Result<Self, CameraError> {
        source.start()?;
        Ok(Self {
            source,
            active: true,
        })
    }

    /// Stops the source if it is still running
    pub fn release(&mut self) {
        if self.active {
            self.source.stop();
            self.active = false;
        }
    }
}

impl<G: GestureSource> Drop for CameraLease<G> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Single-consumer driver binding a [`Quiz`] to its collaborators
///
/// The embedding runtime enqueues events from its timer, its frame
/// callback, and its UI layer, then calls [`pump`](Self::pump) from one
/// place. Alarms requested during processing are collected and handed
/// back through [`take_scheduled`](Self::take_scheduled); the runtime
/// arranges the timers and enqueues [`Event::Alarm`] when they fire.
/// After [`shutdown`](Self::shutdown) all further events are discarded.
pub struct Engine<P: PlaybackHandle, T: Tunnel, G: GestureSource> {
    /// The state machine and session
    quiz: Quiz,
    /// Command surface over the external player
    playback: P,
    /// Outbound consumer messages
    tunnel: T,
    /// Camera lease, present while a source is attached
    camera: Option<CameraLease<G>>,
    /// Pending events in arrival order
    queue: VecDeque<Event>,
    /// Alarms requested by the machine, awaiting runtime timers
    scheduled: Vec<(AlarmMessage, Duration)>,
    /// Set once torn down; everything afterwards is a no-op
    shut_down: bool,
}

impl<P: PlaybackHandle, T: Tunnel, G: GestureSource> Engine<P, T, G> {
    /// Creates an engine around a quiz and its boundaries
    pub fn new(quiz: Quiz, playback: P, tunnel: T) -> Self {
        Self {
            quiz,
            playback,
            tunnel,
            camera: None,
            queue: VecDeque::new(),
            scheduled: Vec::new(),
            shut_down: false,
        }
    }

    /// The quiz this engine drives
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Whether a camera lease is currently held
    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    /// Attaches and starts a gesture source
    ///
    /// On failure the session degrades rather than halting: the fault
    /// is reported to the consumer and checkpoints will expect answers
    /// through [`Command::Answer`].
    ///
    /// # Errors
    ///
    /// Returns the [`CameraError`] that prevented the source from
    /// starting.
    pub fn attach_camera(&mut self, source: G) -> Result<(), CameraError> {
        match CameraLease::acquire(source) {
            Ok(lease) => {
                self.camera = Some(lease);
                Ok(())
            }
            Err(error) => {
                self.quiz.camera_unavailable(&error, &self.tunnel);
                Err(error)
            }
        }
    }

    /// Adds an event to the queue
    ///
    /// Safe to call from any producer at any time; events arriving
    /// after shutdown are discarded.
    pub fn enqueue(&mut self, event: Event) {
        if self.shut_down {
            tracing::trace!(?event, "discarding event after shutdown");
            return;
        }
        self.queue.push_back(event);
    }

    /// Drains the queue, processing events strictly one at a time
    pub fn pump(&mut self) {
        while let Some(event) = self.queue.pop_front() {
            if self.shut_down {
                return;
            }
            self.dispatch(event);
        }
    }

    /// Hands back the alarms the machine requested
    ///
    /// The runtime owns the actual timers; when one fires it enqueues
    /// the alarm as an [`Event::Alarm`].
    pub fn take_scheduled(&mut self) -> Vec<(AlarmMessage, Duration)> {
        std::mem::take(&mut self.scheduled)
    }

    /// Sends the full current view to the consumer
    pub fn sync_consumer(&self) {
        self.tunnel.send_state(&self.quiz.state_message());
    }

    /// Tears everything down synchronously
    ///
    /// Discards queued events and pending alarm requests, releases the
    /// camera, and destroys the session. No checkpoint or gesture
    /// processing occurs afterwards; alarms already handed to the
    /// runtime become stale no-ops if delivered anyway.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        tracing::info!("engine shutting down");
        self.shut_down = true;
        self.queue.clear();
        self.scheduled.clear();
        if let Some(mut lease) = self.camera.take() {
            lease.release();
        }
        self.quiz.stop();
    }

    /// Applies one event to the machine
    fn dispatch(&mut self, event: Event) {
        if matches!(event, Event::Command(Command::Stop)) {
            self.shutdown();
            return;
        }

        let Self {
            quiz,
            playback,
            tunnel,
            scheduled,
            ..
        } = self;

        match event {
            Event::Tick => {
                quiz.tick(playback, tunnel, |m, d| scheduled.push((m, d)));
            }
            Event::Sample(sample) => {
                quiz.receive_sample(sample, playback, tunnel, |m, d| scheduled.push((m, d)));
            }
            Event::Player(player_event) => {
                quiz.receive_player_event(player_event, tunnel);
            }
            Event::Alarm(alarm) => {
                quiz.receive_alarm(alarm, playback, tunnel, |m, d| scheduled.push((m, d)));
            }
            Event::Command(Command::Start) => {
                quiz.start(playback, tunnel);
            }
            Event::Command(Command::SkipTo(id)) => {
                quiz.skip_to_checkpoint(id, playback, tunnel, |m, d| scheduled.push((m, d)));
            }
            Event::Command(Command::Answer(gesture)) => {
                quiz.answer_with(gesture, playback, tunnel, |m, d| scheduled.push((m, d)));
            }
            Event::Command(Command::Stop) => unreachable!("handled above"),
        }
    }
}
