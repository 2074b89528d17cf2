//! Session state and score tracking
//!
//! This module holds the mutable per-quiz record: cumulative score, the
//! set of resolved checkpoints, and per-gesture tallies. A [`Session`]
//! is created when a quiz starts and destroyed when it ends or is
//! abandoned; exactly one exists per active quiz and the quiz machine is
//! its sole mutator. All functions here are plain state updates with no
//! side effects beyond the owned session.

use std::collections::HashSet;

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{CheckpointId, Gesture};

/// Mutable record of one quiz run
///
/// Membership in `completed` is the sole source of "fire at most once"
/// truth: the scheduler recomputes checkpoint eligibility purely from
/// this set, never from time monotonicity, so rewinds and stale polls
/// cannot re-trigger a resolved checkpoint.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Session {
    /// Cumulative score; increments only on correct answers
    score: u64,
    /// Checkpoints resolved by an answer or timeout (correct or not)
    completed: HashSet<CheckpointId>,
    /// Checkpoints whose entire window was jumped over; never scored
    missed: HashSet<CheckpointId>,
    /// Confirmed (debounced) gesture occurrences, independent of
    /// correctness, for telemetry and scoreboard display
    gesture_counts: EnumMap<Gesture, u64>,
    /// The checkpoint currently awaiting an answer, if any
    current: Option<CheckpointId>,
    /// Final summary, frozen exactly once when the quiz completes
    #[serde(skip)]
    final_summary: once_cell_serde::sync::OnceCell<FinalSummary>,
}

/// Read-only view of a session for the UI and telemetry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Cumulative score
    pub score: u64,
    /// Number of checkpoints resolved by an answer or timeout
    pub completed: usize,
    /// Number of checkpoints skipped by time jumps
    pub missed: usize,
    /// Confirmed gesture occurrences per type
    pub gesture_counts: EnumMap<Gesture, u64>,
    /// The checkpoint currently awaiting an answer, if any
    pub current: Option<CheckpointId>,
}

/// Frozen results of a completed quiz
///
/// Computed once when the machine reaches its terminal state; later
/// reads return the same values regardless of any stray events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSummary {
    /// Final score
    pub score: u64,
    /// Checkpoints resolved by an answer or timeout
    pub completed: usize,
    /// Checkpoints skipped by time jumps
    pub missed: usize,
    /// Total checkpoints the playlist carried
    pub total: usize,
    /// Confirmed gesture occurrences per type
    pub gesture_counts: EnumMap<Gesture, u64>,
}

impl Session {
    /// Creates an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative score so far
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Whether a checkpoint has been resolved by an answer or timeout
    pub fn is_completed(&self, id: CheckpointId) -> bool {
        self.completed.contains(&id)
    }

    /// Whether a checkpoint was skipped by a time jump
    pub fn is_missed(&self, id: CheckpointId) -> bool {
        self.missed.contains(&id)
    }

    /// Number of checkpoints resolved or skipped so far
    pub fn resolved_count(&self) -> usize {
        self.completed.len() + self.missed.len()
    }

    /// The checkpoint currently awaiting an answer, if any
    pub fn current(&self) -> Option<CheckpointId> {
        self.current
    }

    /// Marks a checkpoint as the one awaiting an answer
    pub fn set_current(&mut self, id: CheckpointId) {
        self.current = Some(id);
    }

    /// Clears the awaiting-answer marker
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Counts one confirmed gesture occurrence
    pub fn record_gesture(&mut self, gesture: Gesture) {
        self.gesture_counts[gesture] += 1;
    }

    /// Confirmed gesture occurrences per type
    pub fn gesture_counts(&self) -> &EnumMap<Gesture, u64> {
        &self.gesture_counts
    }

    /// Records the resolution of a checkpoint
    ///
    /// Adds the checkpoint to `completed` and increments the score if
    /// the answer was correct. Recording is idempotent: a checkpoint
    /// already in `completed` is left untouched and not re-scored.
    ///
    /// # Returns
    ///
    /// `true` if the checkpoint was newly resolved, `false` if it had
    /// already been recorded.
    pub fn record_answer(&mut self, id: CheckpointId, correct: bool) -> bool {
        if !self.completed.insert(id) {
            return false;
        }
        if correct {
            self.score += 1;
        }
        true
    }

    /// Records a checkpoint whose window was jumped over entirely
    ///
    /// Missed checkpoints count toward exhaustion but are never scored
    /// and never retried.
    ///
    /// # Returns
    ///
    /// `true` if the checkpoint was newly marked missed.
    pub fn record_missed(&mut self, id: CheckpointId) -> bool {
        if self.completed.contains(&id) {
            return false;
        }
        self.missed.insert(id)
    }

    /// Read-only view for the UI and telemetry
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score,
            completed: self.completed.len(),
            missed: self.missed.len(),
            gesture_counts: self.gesture_counts,
            current: self.current,
        }
    }

    /// Freezes and returns the final summary
    ///
    /// The first call computes the summary from the session as it stands;
    /// every later call returns the same frozen values.
    pub fn freeze_summary(&self, total: usize) -> &FinalSummary {
        self.final_summary.get_or_init(|| FinalSummary {
            score: self.score,
            completed: self.completed.len(),
            missed: self.missed.len(),
            total,
            gesture_counts: self.gesture_counts,
        })
    }

    /// The frozen summary, if the quiz has completed
    pub fn summary(&self) -> Option<&FinalSummary> {
        self.final_summary.get()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_record_answer_scores_only_correct() {
        let mut session = Session::new();
        let a = CheckpointId::new();
        let b = CheckpointId::new();

        assert!(session.record_answer(a, true));
        assert!(session.record_answer(b, false));
        assert_eq!(session.score(), 1);
        assert_eq!(session.resolved_count(), 2);
    }

    #[test]
    fn test_record_answer_is_idempotent() {
        let mut session = Session::new();
        let id = CheckpointId::new();

        assert!(session.record_answer(id, true));
        // A rewind must not double-score the same checkpoint
        assert!(!session.record_answer(id, true));
        assert_eq!(session.score(), 1);
        assert_eq!(session.resolved_count(), 1);
    }

    #[test]
    fn test_missed_checkpoints_are_never_scored() {
        let mut session = Session::new();
        let id = CheckpointId::new();

        assert!(session.record_missed(id));
        assert!(!session.record_missed(id));
        assert_eq!(session.score(), 0);
        assert!(session.is_missed(id));
        assert!(!session.is_completed(id));
    }

    #[test]
    fn test_completed_checkpoint_cannot_become_missed() {
        let mut session = Session::new();
        let id = CheckpointId::new();

        session.record_answer(id, true);
        assert!(!session.record_missed(id));
        assert!(!session.is_missed(id));
    }

    #[test]
    fn test_gesture_tallies() {
        let mut session = Session::new();
        session.record_gesture(Gesture::Jump);
        session.record_gesture(Gesture::Jump);
        session.record_gesture(Gesture::Clap);

        assert_eq!(session.gesture_counts()[Gesture::Jump], 2);
        assert_eq!(session.gesture_counts()[Gesture::Clap], 1);
        assert_eq!(session.gesture_counts()[Gesture::Squat], 0);
    }

    #[test]
    fn test_current_checkpoint_marker() {
        let mut session = Session::new();
        let id = CheckpointId::new();

        assert_eq!(session.current(), None);
        session.set_current(id);
        assert_eq!(session.current(), Some(id));
        session.clear_current();
        assert_eq!(session.current(), None);
    }

    #[test]
    fn test_summary_freezes_once() {
        let mut session = Session::new();
        let id = CheckpointId::new();
        session.record_answer(id, true);

        let frozen = session.freeze_summary(3).clone();
        assert_eq!(frozen.score, 1);
        assert_eq!(frozen.total, 3);

        // Later mutations do not leak into the frozen summary
        session.record_gesture(Gesture::Squat);
        assert_eq!(session.freeze_summary(3), &frozen);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut session = Session::new();
        let id = CheckpointId::new();
        session.record_answer(id, true);
        session.record_gesture(Gesture::Jump);
        session.record_missed(CheckpointId::new());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.score, 1);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.missed, 1);
        assert_eq!(snapshot.gesture_counts[Gesture::Jump], 1);
        assert_eq!(snapshot.current, None);
    }
}
