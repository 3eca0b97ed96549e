//! Outbound notices to cooking clients.
//!
//! The service never knows how a client is connected. It hands short text
//! notices to a [`Notifier`], which must return immediately: delivery is
//! fire-and-forget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::core::TaskKey;

/// Sent when no step is left and no timer is pending.
pub const ALL_DONE: &str = "all dishes done";

/// Sent when polling stops on a blockable step that was not started.
pub const AWAITING_START: &str = "waiting — call start";

/// Prefix of the notice sent when a blockable step's wait completes.
pub const BLOCK_FINISHED_PREFIX: &str = "BLOCK_FINISHED: ";

/// Remaining-time notice for a pending timer.
pub fn pending_message(key: TaskKey, remaining_secs: u64) -> String {
    format!("{key} wait, left: {remaining_secs} seconds")
}

/// Completion notice carrying the serialized step.
pub fn block_finished_message(step_json: &str) -> String {
    format!("{BLOCK_FINISHED_PREFIX}{step_json}")
}

/// Delivery endpoint for session notices.
///
/// Implementations must not block: log and drop instead of waiting.
pub trait Notifier: Send + Sync {
    fn notify(&self, session_id: &str, message: &str);
}

/// A notice addressed to one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub session_id: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn is_block_finished(&self) -> bool {
        self.message.starts_with(BLOCK_FINISHED_PREFIX)
    }
}

/// Forwards notices into a bounded channel drained by a transport.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver a transport reads from.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Notice>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, session_id: &str, message: &str) {
        match self.sender.try_send(Notice::new(session_id, message)) {
            Ok(()) => {}
            Err(TrySendError::Full(notice)) => {
                tracing::warn!(
                    session = %notice.session_id,
                    message = %notice.message,
                    "Notice buffer full, dropping notice"
                );
            }
            Err(TrySendError::Closed(notice)) => {
                tracing::debug!(
                    session = %notice.session_id,
                    "Notice receiver closed, dropping notice"
                );
            }
        }
    }
}

/// Writes notices to the log; useful when no client transport is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, session_id: &str, message: &str) {
        tracing::info!(session = %session_id, "{message}");
    }
}
