//! Consumer-facing message tunnel
//!
//! This module defines the trait for delivering engine output to the
//! consumer (the UI layer rendering cards, overlays, and scoreboards).
//! The tunnel abstraction keeps the engine independent of how the
//! consumer is wired up; implementations might dispatch into a component
//! tree, a channel, or a test recorder. The engine never blocks on a
//! tunnel call.

use crate::quiz::{SyncMessage, UpdateMessage};

/// Trait for sending engine output to the consumer
pub trait Tunnel {
    /// Sends an update message to the consumer
    ///
    /// Update messages notify the consumer about a change that affects
    /// its current view: a question firing, an answer being judged, a
    /// tally moving.
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_update(&self, message: &UpdateMessage);

    /// Sends a full state synchronization message to the consumer
    ///
    /// Sync messages carry the complete current view, typically used
    /// when a consumer attaches or re-attaches mid-session.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);
}
