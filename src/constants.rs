//! Configuration constants for the hopquiz engine
//!
//! This module contains the tuning bounds and default values used
//! throughout the engine. The exact numbers (tick interval, debounce
//! window, feedback delay) were tuned empirically; they are exposed as
//! configuration bounded by these limits rather than hardcoded behavior.

/// Checkpoint and playlist configuration constants
pub mod checkpoint {
    /// Number of answer options every checkpoint must carry
    pub const OPTION_COUNT: usize = 3;
    /// Maximum number of checkpoints allowed in a single playlist
    pub const MAX_CHECKPOINT_COUNT: usize = 100;
    /// Maximum length of a checkpoint question in characters
    pub const MAX_QUESTION_LENGTH: usize = 200;
    /// Maximum length of an answer option label in characters
    pub const MAX_LABEL_LENGTH: usize = 100;
    /// Minimum trigger window in milliseconds
    pub const MIN_WINDOW: u64 = 500;
    /// Maximum trigger window in milliseconds
    pub const MAX_WINDOW: u64 = 30_000;
    /// Default trigger window in milliseconds
    pub const DEFAULT_WINDOW: u64 = 2_000;
}

/// Checkpoint scheduler polling constants
pub mod scheduler {
    /// Minimum polling tick in milliseconds
    pub const MIN_TICK: u64 = 100;
    /// Maximum polling tick in milliseconds; ticks coarser than a
    /// checkpoint's window can skip the window entirely
    pub const MAX_TICK: u64 = 2_000;
    /// Default polling tick in milliseconds
    pub const DEFAULT_TICK: u64 = 500;
}

/// Gesture debouncing constants
pub mod debounce {
    /// Minimum debounce interval in milliseconds
    pub const MIN_INTERVAL: u64 = 250;
    /// Maximum debounce interval in milliseconds
    pub const MAX_INTERVAL: u64 = 5_000;
    /// Default debounce interval in milliseconds
    pub const DEFAULT_INTERVAL: u64 = 1_000;
    /// Default minimum classifier confidence for a sample to count
    pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.6;
}

/// Feedback display constants
pub mod feedback {
    /// Minimum feedback display delay in milliseconds
    pub const MIN_DELAY: u64 = 500;
    /// Maximum feedback display delay in milliseconds
    pub const MAX_DELAY: u64 = 10_000;
    /// Default feedback display delay in milliseconds
    pub const DEFAULT_DELAY: u64 = 2_500;
}

/// Answer timeout constants
pub mod answer {
    /// Minimum answer timeout in milliseconds
    pub const MIN_TIMEOUT: u64 = 3_000;
    /// Maximum answer timeout in milliseconds
    pub const MAX_TIMEOUT: u64 = 120_000;
}
