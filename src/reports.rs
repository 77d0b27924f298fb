//! Period filtering and the control-panel indicator summary.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    engine::classifier,
    models::{Company, DocStatus, DocumentKind},
};

/// Indicator totals for a filtered set of companies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ControlSummary {
    /// Companies and branches in the period.
    pub companies: usize,

    /// PCMSO documents on file.
    pub pcmso: usize,

    /// LTCAT documents on file.
    pub ltcat: usize,

    /// PGR documents on file.
    pub pgr: usize,

    /// Companies whose termination has not passed (or cannot be read).
    pub active: usize,

    /// Companies whose termination has passed.
    pub expired: usize,
}

/// Keeps companies registered inside the optional `[from, to]` range.
///
/// With no bounds set, this is the identity.
pub fn filter_by_created(
    companies: &[Company],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<&Company> {
    companies
        .iter()
        .filter(|company| {
            if from.is_some_and(|from| company.created_at < from) {
                return false;
            }
            if to.is_some_and(|to| company.created_at > to) {
                return false;
            }
            true
        })
        .collect()
}

/// Computes the control-panel indicators for `today`.
///
/// Active/expired are company-level tallies: a company counts as expired only
/// when its termination date classifies as expired; everything else, an
/// unreadable date included, counts as active.
pub fn control_summary(companies: &[&Company], today: NaiveDate) -> ControlSummary {
    let mut summary = ControlSummary { companies: companies.len(), ..Default::default() };

    for company in companies {
        if company.documents.has(DocumentKind::Pcmso) {
            summary.pcmso += 1;
        }
        if company.documents.has(DocumentKind::Ltcat) {
            summary.ltcat += 1;
        }
        if company.documents.has(DocumentKind::Pgr) {
            summary.pgr += 1;
        }

        let classification = classifier::classify(company.termination_date.as_deref(), today);
        if classification.status == DocStatus::Expired {
            summary.expired += 1;
        } else {
            summary.active += 1;
        }
    }

    summary
}
