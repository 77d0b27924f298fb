//! This module defines the expiry status buckets derived from a termination
//! date.

use serde::{Deserialize, Serialize};

/// Expiry bucket for a document, derived from the company termination date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    /// Termination is more than the warning window away.
    OnTime,
    /// Termination is due within the warning window (inclusive of today).
    Warning,
    /// Termination has passed.
    Expired,
    /// The termination date was absent or unreadable.
    Invalid,
}

impl DocStatus {
    /// Human-readable label for dashboards and alert entries.
    pub fn label(&self) -> &'static str {
        match self {
            DocStatus::OnTime => "On time",
            DocStatus::Warning => "Due within 90 days",
            DocStatus::Expired => "Expired",
            DocStatus::Invalid => "Invalid date",
        }
    }
}

/// Result of classifying a termination date against a reference day.
///
/// Computed fresh on every query; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The status bucket.
    pub status: DocStatus,

    /// Signed whole days until termination (negative once overdue).
    /// `None` exactly when `status` is [`DocStatus::Invalid`].
    pub days_remaining: Option<i64>,
}
