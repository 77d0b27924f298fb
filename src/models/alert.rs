//! This module defines the alert output types produced by the aggregator and
//! the key that identifies a throttle slot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{classification::DocStatus, company::DocumentKind};

/// Identifies one throttle slot: a (company, document kind) pair.
///
/// Distinct pairs never collide when rendered: ids are opaque strings and the
/// kind suffix set is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    /// Identifier of the company the document belongs to.
    pub company_id: String,

    /// The document kind.
    pub kind: DocumentKind,
}

impl AlertKey {
    /// Creates a key for the given company and document kind.
    pub fn new(company_id: impl Into<String>, kind: DocumentKind) -> Self {
        Self { company_id: company_id.into(), kind }
    }
}

impl fmt::Display for AlertKey {
    /// Renders the stored key form: `<companyId>_<kind>`, kind lowercase.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.company_id, self.kind)
    }
}

/// One expiry alert ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEntry {
    /// The throttle slot this alert belongs to.
    pub key: AlertKey,

    /// Display name of the company.
    pub company_name: String,

    /// The document the alert is about.
    pub kind: DocumentKind,

    /// Warning or expired; on-time documents never produce entries.
    pub status: DocStatus,

    /// Human-readable status label.
    pub label: String,

    /// Signed whole days until termination (negative once overdue).
    pub days_remaining: i64,
}

/// Document counters reflecting true current state, independent of whether
/// the matching alerts were suppressed by the cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    /// Documents due within the warning window.
    pub warning: usize,

    /// Documents past their termination date.
    pub expired: usize,
}

/// Aggregation output: the throttled alert list plus the raw counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertReport {
    /// Alerts eligible for display today, in company-then-kind order.
    pub alerts: Vec<AlertEntry>,

    /// Counters over every qualifying document.
    pub counts: AlertCounts,
}
