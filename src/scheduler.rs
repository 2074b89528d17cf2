//! Checkpoint scheduling against polled playback time
//!
//! The external playback surface only exposes time as a pollable getter,
//! not a precise "time reached" callback, so the engine compares the
//! playback position against each checkpoint's trigger window on a fixed
//! tick. The tick costs a few hundred milliseconds of latency but works
//! with any third-party player.
//!
//! The scheduler is a pure decision function: [`poll`](CheckpointScheduler::poll)
//! inspects the session and reports what should happen; the quiz machine
//! applies the outcome. Eligibility is computed solely from resolved-set
//! membership, never from time monotonicity, so rewinds and jitter
//! cannot re-trigger a resolved checkpoint.

use std::time::Duration;

use crate::{
    checkpoint::{CheckpointId, Playlist},
    playback::PlayerState,
    session::Session,
};

/// Outcome of one scheduler poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Poll {
    /// Checkpoints whose entire window was jumped over since the last
    /// poll; permanently ineligible, never scored
    pub missed: Vec<CheckpointId>,
    /// The checkpoint that should fire on this tick, if any
    pub fire: Option<CheckpointId>,
}

impl Poll {
    /// Whether this poll requires no action
    pub fn is_idle(&self) -> bool {
        self.missed.is_empty() && self.fire.is_none()
    }
}

/// Decides when checkpoints fire, at most once each
pub struct CheckpointScheduler {
    /// The validated, ordered checkpoint list for this session
    playlist: Playlist,
}

impl CheckpointScheduler {
    /// Creates a scheduler over a validated playlist
    pub fn new(playlist: Playlist) -> Self {
        Self { playlist }
    }

    /// The playlist this scheduler runs against
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Evaluates one polling tick
    ///
    /// Fires only while playback is advancing and no checkpoint is
    /// pending. When several checkpoints qualify the earliest trigger
    /// time wins; the playlist's non-overlap invariant makes this case
    /// unreachable in practice, but the tie-break keeps firing
    /// deterministic regardless.
    ///
    /// Checkpoints whose window lies entirely behind the current
    /// position (a seek or lag spike jumped over them) are reported
    /// missed exactly once and are never retried.
    pub fn poll(&self, position: Duration, state: PlayerState, session: &Session) -> Poll {
        if state != PlayerState::Playing || session.current().is_some() {
            return Poll::default();
        }

        let mut outcome = Poll::default();

        for checkpoint in self.playlist.checkpoints() {
            let id = checkpoint.id();
            if session.is_completed(id) || session.is_missed(id) {
                continue;
            }

            if checkpoint.window_end() <= position {
                tracing::warn!(checkpoint = %id, "trigger window jumped over, skipping");
                outcome.missed.push(id);
            } else if outcome.fire.is_none() && checkpoint.window_contains(position) {
                tracing::debug!(checkpoint = %id, ?position, "checkpoint eligible to fire");
                outcome.fire = Some(id);
            }
        }

        outcome
    }

    /// Whether a checkpoint may still fire (not yet resolved or missed)
    pub fn eligible(&self, id: CheckpointId, session: &Session) -> bool {
        self.playlist.get(id).is_some() && !session.is_completed(id) && !session.is_missed(id)
    }

    /// Whether every checkpoint has been resolved or missed
    pub fn exhausted(&self, session: &Session) -> bool {
        self.playlist
            .checkpoints()
            .iter()
            .all(|c| session.is_completed(c.id()) || session.is_missed(c.id()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::checkpoint::{AnswerOption, Checkpoint, Gesture};

    fn checkpoint_at(secs: u64) -> Checkpoint {
        let options = vec![
            AnswerOption::new(Gesture::Jump, "a"),
            AnswerOption::new(Gesture::Squat, "b"),
            AnswerOption::new(Gesture::Clap, "c"),
        ];
        let correct = options[0].id();
        Checkpoint::new(
            Duration::from_secs(secs),
            Duration::from_secs(2),
            "q",
            options,
            correct,
        )
        .unwrap()
    }

    fn scheduler_with(seconds: &[u64]) -> CheckpointScheduler {
        CheckpointScheduler::new(
            Playlist::new(seconds.iter().map(|s| checkpoint_at(*s)).collect()).unwrap(),
        )
    }

    #[test]
    fn test_fires_inside_window() {
        let scheduler = scheduler_with(&[10, 30]);
        let session = Session::new();

        let poll = scheduler.poll(
            Duration::from_millis(10_500),
            PlayerState::Playing,
            &session,
        );
        assert_eq!(
            poll.fire,
            Some(scheduler.playlist().checkpoints()[0].id())
        );
        assert!(poll.missed.is_empty());
    }

    #[test]
    fn test_does_not_fire_before_window() {
        let scheduler = scheduler_with(&[10]);
        let session = Session::new();

        let poll = scheduler.poll(Duration::from_secs(9), PlayerState::Playing, &session);
        assert!(poll.is_idle());
    }

    #[test]
    fn test_does_not_fire_unless_playing() {
        let scheduler = scheduler_with(&[10]);
        let session = Session::new();

        for state in [
            PlayerState::Paused,
            PlayerState::Buffering,
            PlayerState::Unstarted,
            PlayerState::Ended,
        ] {
            let poll = scheduler.poll(Duration::from_millis(10_500), state, &session);
            assert!(poll.is_idle(), "fired while {state:?}");
        }
    }

    #[test]
    fn test_does_not_fire_while_pending() {
        let scheduler = scheduler_with(&[10]);
        let mut session = Session::new();
        session.set_current(scheduler.playlist().checkpoints()[0].id());

        let poll = scheduler.poll(
            Duration::from_millis(10_500),
            PlayerState::Playing,
            &session,
        );
        assert!(poll.is_idle());
    }

    #[test]
    fn test_completed_checkpoint_never_refires() {
        let scheduler = scheduler_with(&[10]);
        let id = scheduler.playlist().checkpoints()[0].id();
        let mut session = Session::new();
        session.record_answer(id, true);

        // Rewound playback sits inside the window again
        let poll = scheduler.poll(
            Duration::from_millis(10_500),
            PlayerState::Playing,
            &session,
        );
        assert!(poll.is_idle());
    }

    #[test]
    fn test_jumped_window_is_reported_missed() {
        let scheduler = scheduler_with(&[10, 30]);
        let first = scheduler.playlist().checkpoints()[0].id();
        let session = Session::new();

        // A seek landed past the first window, before the second
        let poll = scheduler.poll(Duration::from_secs(20), PlayerState::Playing, &session);
        assert_eq!(poll.missed, vec![first]);
        assert_eq!(poll.fire, None);
    }

    #[test]
    fn test_jump_can_miss_and_fire_in_one_poll() {
        let scheduler = scheduler_with(&[10, 30]);
        let first = scheduler.playlist().checkpoints()[0].id();
        let second = scheduler.playlist().checkpoints()[1].id();
        let session = Session::new();

        // A seek landed inside the second window without visiting the first
        let poll = scheduler.poll(
            Duration::from_millis(30_500),
            PlayerState::Playing,
            &session,
        );
        assert_eq!(poll.missed, vec![first]);
        assert_eq!(poll.fire, Some(second));
    }

    #[test]
    fn test_missed_checkpoint_never_fires_after_rewind() {
        let scheduler = scheduler_with(&[10]);
        let id = scheduler.playlist().checkpoints()[0].id();
        let mut session = Session::new();
        session.record_missed(id);

        let poll = scheduler.poll(
            Duration::from_millis(10_500),
            PlayerState::Playing,
            &session,
        );
        assert!(poll.is_idle());
    }

    #[test]
    fn test_eligible_and_exhausted() {
        let scheduler = scheduler_with(&[10, 30]);
        let first = scheduler.playlist().checkpoints()[0].id();
        let second = scheduler.playlist().checkpoints()[1].id();
        let mut session = Session::new();

        assert!(scheduler.eligible(first, &session));
        assert!(!scheduler.exhausted(&session));

        session.record_answer(first, true);
        assert!(!scheduler.eligible(first, &session));
        assert!(!scheduler.exhausted(&session));

        session.record_missed(second);
        assert!(scheduler.exhausted(&session));
    }

    #[test]
    fn test_unknown_checkpoint_is_not_eligible() {
        let scheduler = scheduler_with(&[10]);
        let session = Session::new();
        assert!(!scheduler.eligible(CheckpointId::new(), &session));
    }
}
