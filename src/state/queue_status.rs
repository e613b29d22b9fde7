/// Queue status definitions for crawl items
///
/// A queue item moves `pending → processing → {completed | failed | disallowed}`,
/// and `failed → pending` when a retry sweep resets it.
use std::fmt;

/// Represents the current status of a queue item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueueStatus {
    // ===== Active States =====
    /// Waiting to be claimed once its hostname is out of cooldown
    Pending,

    /// Claimed by the crawl loop
    Processing,

    // ===== Terminal States =====
    /// Fetched and persisted; never reconsidered
    Completed,

    /// Forbidden by the site's robots policy; never retried
    Disallowed,

    // ===== Retryable States =====
    /// Fetch or processing failed; reset to pending after the backoff window
    Failed,
}

impl QueueStatus {
    /// Returns true if the item will never be dispatched again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Disallowed)
    }

    /// Returns true if the state machine permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Processing, Self::Disallowed)
                | (Self::Failed, Self::Pending)
        )
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Disallowed => "disallowed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "disallowed" => Some(Self::Disallowed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::Disallowed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
