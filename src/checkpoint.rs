//! Checkpoint and playlist definitions
//!
//! This module defines the immutable quiz data: timestamped checkpoints,
//! their answer options, and the gesture vocabulary used to answer them.
//! A [`Playlist`] is the validated, ordered collection of checkpoints a
//! session runs against; it is fixed at session start and never mutated.

use std::{fmt::Display, str::FromStr, time::Duration};

use enum_map::Enum;
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use crate::constants;

/// A unique identifier for a checkpoint
///
/// Checkpoint ids are stable for the lifetime of a session and are the
/// sole key used to decide whether a checkpoint has already fired.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct CheckpointId(Uuid);

impl CheckpointId {
    /// Creates a new random checkpoint id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CheckpointId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CheckpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CheckpointId {
    type Err = uuid::Error;

    /// Parses a checkpoint id from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A unique identifier for an answer option within a checkpoint
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct OptionId(Uuid);

impl OptionId {
    /// Creates a new random option id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OptionId {
    type Err = uuid::Error;

    /// Parses an option id from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A physical movement classified from the camera feed
///
/// The three answerable gestures map one-to-one onto a checkpoint's
/// answer options. `RaiseHand` gates session start and `None` is the
/// classifier's idle output; neither can answer a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gesture {
    /// Both feet leave the ground
    Jump,
    /// Knees bent below the squat threshold
    Squat,
    /// Both wrists brought together at chest height
    Clap,
    /// One wrist raised above the shoulder
    RaiseHand,
    /// No recognizable movement in the frame
    #[serde(rename = "none")]
    Idle,
}

impl Gesture {
    /// Whether this gesture can be mapped to an answer option
    pub fn is_answerable(self) -> bool {
        matches!(self, Self::Jump | Self::Squat | Self::Clap)
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

/// Validates the trigger window of a checkpoint
fn validate_window(val: &Duration) -> ValidationResult {
    validate_duration::<
        { constants::checkpoint::MIN_WINDOW },
        { constants::checkpoint::MAX_WINDOW },
    >("window", val)
}

/// One of the three answer choices presented at a checkpoint
///
/// Each option is answered by performing its gesture rather than by
/// pointing at it; the label text is opaque to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerOption {
    /// Unique identifier of this option within the session
    #[garde(skip)]
    id: OptionId,
    /// The gesture that selects this option
    #[garde(skip)]
    gesture: Gesture,
    /// Display text for the option (opaque to the engine)
    #[garde(length(max = constants::checkpoint::MAX_LABEL_LENGTH))]
    label: String,
}

impl AnswerOption {
    /// Creates a new answer option selected by the given gesture
    pub fn new(gesture: Gesture, label: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(),
            gesture,
            label: label.into(),
        }
    }

    /// Returns the option's unique identifier
    pub fn id(&self) -> OptionId {
        self.id
    }

    /// Returns the gesture that selects this option
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Returns the display text of this option
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A timestamped pause-and-question point in the video timeline
///
/// A checkpoint becomes eligible to fire while playback time is inside
/// `[trigger_time, trigger_time + window)`. Firing pauses the video and
/// presents the question; the checkpoint is resolved by exactly one
/// debounced gesture (or a timeout) and never fires again.
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Checkpoint {
    /// Unique identifier, stable across the session
    #[garde(skip)]
    id: CheckpointId,
    /// Playback time at which the checkpoint should fire
    #[garde(skip)]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    trigger_time: Duration,
    /// Tolerance past `trigger_time` during which firing is still valid
    #[garde(custom(|v, _| validate_window(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    window: Duration,
    /// The question text (opaque to the engine)
    #[garde(length(max = constants::checkpoint::MAX_QUESTION_LENGTH))]
    question: String,
    /// The three answer options, each selected by a distinct gesture
    #[garde(length(min = constants::checkpoint::OPTION_COUNT, max = constants::checkpoint::OPTION_COUNT), dive)]
    options: Vec<AnswerOption>,
    /// The id of the correct option
    #[garde(skip)]
    correct_option: OptionId,
}

/// Errors arising from structurally invalid checkpoints or playlists
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Error {
    /// A checkpoint does not carry exactly three options
    #[error("checkpoint must carry exactly {} options", constants::checkpoint::OPTION_COUNT)]
    WrongOptionCount,
    /// An option uses a gesture that cannot answer a question
    #[error("gesture {0:?} cannot be used to answer")]
    UnanswerableGesture(Gesture),
    /// Two options within one checkpoint share the same gesture
    #[error("gesture {0:?} selects more than one option")]
    DuplicateGesture(Gesture),
    /// The correct option id does not belong to the checkpoint
    #[error("correct option is not one of the checkpoint's options")]
    UnknownCorrectOption,
    /// Checkpoints are not strictly ordered by trigger time
    #[error("checkpoints are not strictly ordered by trigger time")]
    Unordered,
    /// A checkpoint's window reaches into the next checkpoint's window
    #[error("checkpoint window overlaps the next checkpoint")]
    OverlappingWindows,
}

impl Checkpoint {
    /// Creates a checkpoint after checking its structural invariants
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the option count is not exactly three, an
    /// option uses an unanswerable gesture, two options share a gesture,
    /// or `correct_option` does not name one of the options.
    pub fn new(
        trigger_time: Duration,
        window: Duration,
        question: impl Into<String>,
        options: Vec<AnswerOption>,
        correct_option: OptionId,
    ) -> Result<Self, Error> {
        if options.len() != constants::checkpoint::OPTION_COUNT {
            return Err(Error::WrongOptionCount);
        }
        for (i, option) in options.iter().enumerate() {
            if !option.gesture.is_answerable() {
                return Err(Error::UnanswerableGesture(option.gesture));
            }
            if options[..i].iter().any(|o| o.gesture == option.gesture) {
                return Err(Error::DuplicateGesture(option.gesture));
            }
        }
        if !options.iter().any(|o| o.id == correct_option) {
            return Err(Error::UnknownCorrectOption);
        }

        Ok(Self {
            id: CheckpointId::new(),
            trigger_time,
            window,
            question: question.into(),
            options,
            correct_option,
        })
    }

    /// Returns the checkpoint's unique identifier
    pub fn id(&self) -> CheckpointId {
        self.id
    }

    /// Returns the playback time at which the checkpoint fires
    pub fn trigger_time(&self) -> Duration {
        self.trigger_time
    }

    /// Returns the trigger tolerance window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the question text
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the answer options in display order
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    /// Returns the id of the correct option
    pub fn correct_option(&self) -> OptionId {
        self.correct_option
    }

    /// End of the eligibility window (exclusive)
    pub fn window_end(&self) -> Duration {
        self.trigger_time + self.window
    }

    /// Whether a playback position falls inside `[trigger, trigger + window)`
    pub fn window_contains(&self, position: Duration) -> bool {
        position >= self.trigger_time && position < self.window_end()
    }

    /// Looks up the option selected by a gesture, if any
    pub fn option_for_gesture(&self, gesture: Gesture) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.gesture == gesture)
    }

    /// Whether the given option id is the correct answer
    pub fn is_correct(&self, option: OptionId) -> bool {
        self.correct_option == option
    }
}

/// The validated, ordered set of checkpoints a session runs against
///
/// Construction enforces the scheduler's two structural invariants:
/// trigger times strictly increase, and no checkpoint's window reaches
/// into the next checkpoint's window (a checkpoint can therefore never
/// still be pending when its successor becomes eligible).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Playlist {
    /// Checkpoints in ascending trigger-time order
    #[garde(length(max = constants::checkpoint::MAX_CHECKPOINT_COUNT), dive)]
    checkpoints: Vec<Checkpoint>,
}

impl Playlist {
    /// Creates a playlist after checking ordering and overlap invariants
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unordered`] if trigger times do not strictly
    /// increase, or [`Error::OverlappingWindows`] if a window reaches
    /// past the next checkpoint's trigger time.
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<Self, Error> {
        for (earlier, later) in checkpoints.iter().tuple_windows() {
            if earlier.trigger_time >= later.trigger_time {
                return Err(Error::Unordered);
            }
            if earlier.window_end() > later.trigger_time {
                return Err(Error::OverlappingWindows);
            }
        }

        Ok(Self { checkpoints })
    }

    /// Returns the checkpoints in ascending trigger-time order
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Returns the number of checkpoints
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Whether the playlist contains no checkpoints
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Looks up a checkpoint by id
    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.id == id)
    }

    /// Position of a checkpoint within the playlist (0-based)
    pub fn index_of(&self, id: CheckpointId) -> Option<usize> {
        self.checkpoints.iter().position(|c| c.id == id)
    }
}

/// Errors from parsing an author-supplied checkpoint timestamp
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The timestamp did not have `MM:SS` or `H:MM:SS` shape
    #[error("timestamp must look like MM:SS or H:MM:SS")]
    Malformed,
    /// A minutes or seconds component was 60 or more
    #[error("minutes and seconds components must be below 60")]
    ComponentOutOfRange,
}

/// Parses an author-supplied `"H:MM:SS"` or `"MM:SS"` timestamp
///
/// Quiz authors annotate checkpoints with colon-separated clock strings;
/// the engine works in [`Duration`]s.
///
/// # Errors
///
/// Returns a [`TimestampError`] if the string is not colon-separated
/// numbers in clock form or a minutes/seconds component is 60 or more.
pub fn parse_timestamp(s: &str) -> Result<Duration, TimestampError> {
    let parts: Vec<u64> = s
        .split(':')
        .map(|part| part.parse::<u64>().map_err(|_| TimestampError::Malformed))
        .collect::<Result<_, _>>()?;

    let (hours, minutes, seconds) = match parts[..] {
        [m, s] => (0, m, s),
        [h, m, s] => (h, m, s),
        _ => return Err(TimestampError::Malformed),
    };

    if minutes >= 60 || seconds >= 60 {
        return Err(TimestampError::ComponentOutOfRange);
    }

    Ok(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn three_options() -> Vec<AnswerOption> {
        vec![
            AnswerOption::new(Gesture::Jump, "Jungle, Big Hill, Benny's Barn"),
            AnswerOption::new(Gesture::Squat, "River, Mountain, Tico's Tree"),
            AnswerOption::new(Gesture::Clap, "Bridge, Tunnel, Flowery Garden"),
        ]
    }

    fn checkpoint_at(secs: u64) -> Checkpoint {
        let options = three_options();
        let correct = options[0].id();
        Checkpoint::new(
            Duration::from_secs(secs),
            Duration::from_secs(2),
            "Where do we go to find the sneezes?",
            options,
            correct,
        )
        .unwrap()
    }

    #[test]
    fn test_checkpoint_new_valid() {
        let checkpoint = checkpoint_at(506);
        assert_eq!(checkpoint.trigger_time(), Duration::from_secs(506));
        assert_eq!(checkpoint.options().len(), 3);
        assert!(checkpoint.is_correct(checkpoint.options()[0].id()));
    }

    #[test]
    fn test_checkpoint_rejects_wrong_option_count() {
        let mut options = three_options();
        let correct = options[0].id();
        options.pop();
        let result = Checkpoint::new(
            Duration::from_secs(10),
            Duration::from_secs(2),
            "q",
            options,
            correct,
        );
        assert_eq!(result.unwrap_err(), Error::WrongOptionCount);
    }

    #[test]
    fn test_checkpoint_rejects_duplicate_gesture() {
        let mut options = three_options();
        let correct = options[0].id();
        options[2] = AnswerOption::new(Gesture::Jump, "dup");
        let result = Checkpoint::new(
            Duration::from_secs(10),
            Duration::from_secs(2),
            "q",
            options,
            correct,
        );
        assert_eq!(result.unwrap_err(), Error::DuplicateGesture(Gesture::Jump));
    }

    #[test]
    fn test_checkpoint_rejects_unanswerable_gesture() {
        let mut options = three_options();
        let correct = options[0].id();
        options[1] = AnswerOption::new(Gesture::RaiseHand, "nope");
        let result = Checkpoint::new(
            Duration::from_secs(10),
            Duration::from_secs(2),
            "q",
            options,
            correct,
        );
        assert_eq!(
            result.unwrap_err(),
            Error::UnanswerableGesture(Gesture::RaiseHand)
        );
    }

    #[test]
    fn test_checkpoint_rejects_foreign_correct_option() {
        let options = three_options();
        let result = Checkpoint::new(
            Duration::from_secs(10),
            Duration::from_secs(2),
            "q",
            options,
            OptionId::new(),
        );
        assert_eq!(result.unwrap_err(), Error::UnknownCorrectOption);
    }

    #[test]
    fn test_window_contains_is_half_open() {
        let checkpoint = checkpoint_at(10);
        assert!(!checkpoint.window_contains(Duration::from_millis(9_999)));
        assert!(checkpoint.window_contains(Duration::from_secs(10)));
        assert!(checkpoint.window_contains(Duration::from_millis(11_999)));
        assert!(!checkpoint.window_contains(Duration::from_secs(12)));
    }

    #[test]
    fn test_option_for_gesture() {
        let checkpoint = checkpoint_at(10);
        assert!(checkpoint.option_for_gesture(Gesture::Squat).is_some());
        assert!(checkpoint.option_for_gesture(Gesture::RaiseHand).is_none());
        assert!(checkpoint.option_for_gesture(Gesture::Idle).is_none());
    }

    #[test]
    fn test_playlist_orders_and_rejects_overlap() {
        let playlist = Playlist::new(vec![checkpoint_at(10), checkpoint_at(30)]).unwrap();
        assert_eq!(playlist.len(), 2);

        let unordered = Playlist::new(vec![checkpoint_at(30), checkpoint_at(10)]);
        assert_eq!(unordered.unwrap_err(), Error::Unordered);

        // 10s + 2s window reaches past an 11s trigger
        let overlapping = Playlist::new(vec![checkpoint_at(10), checkpoint_at(11)]);
        assert_eq!(overlapping.unwrap_err(), Error::OverlappingWindows);
    }

    #[test]
    fn test_playlist_lookup() {
        let first = checkpoint_at(10);
        let first_id = first.id();
        let playlist = Playlist::new(vec![first, checkpoint_at(30)]).unwrap();

        assert_eq!(playlist.index_of(first_id), Some(0));
        assert!(playlist.get(first_id).is_some());
        assert!(playlist.get(CheckpointId::new()).is_none());
        assert_eq!(playlist.index_of(CheckpointId::new()), None);
    }

    #[test]
    fn test_gesture_answerability() {
        assert!(Gesture::Jump.is_answerable());
        assert!(Gesture::Squat.is_answerable());
        assert!(Gesture::Clap.is_answerable());
        assert!(!Gesture::RaiseHand.is_answerable());
        assert!(!Gesture::Idle.is_answerable());
    }

    #[test]
    fn test_parse_timestamp_clock_forms() {
        assert_eq!(parse_timestamp("0:08:26"), Ok(Duration::from_secs(506)));
        assert_eq!(parse_timestamp("12:40"), Ok(Duration::from_secs(760)));
        assert_eq!(parse_timestamp("1:00:00"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("506"), Err(TimestampError::Malformed));
        assert_eq!(parse_timestamp("a:bc"), Err(TimestampError::Malformed));
        assert_eq!(
            parse_timestamp("0:61:00"),
            Err(TimestampError::ComponentOutOfRange)
        );
    }

    #[test]
    fn test_checkpoint_id_round_trip() {
        let id = CheckpointId::new();
        let parsed: CheckpointId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_checkpoint_garde_validation() {
        let checkpoint = checkpoint_at(10);
        assert!(checkpoint.validate().is_ok());

        let options = three_options();
        let correct = options[0].id();
        let tiny_window = Checkpoint::new(
            Duration::from_secs(10),
            Duration::from_millis(100),
            "q",
            options,
            correct,
        )
        .unwrap();
        assert!(tiny_window.validate().is_err());
    }
}
