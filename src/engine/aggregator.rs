//! Aggregation of per-document expiry alerts across all tracked companies.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    engine::{classifier, throttler::AlertThrottler},
    models::{
        AlertCounts, AlertEntry, AlertKey, AlertReport, Classification, Company, DocStatus,
        DocumentKind,
    },
    persistence::traits::KeyValueStore,
};

/// Walks every company and document slot, classifies expiry against a
/// reference day, and filters the resulting alerts through the throttler.
pub struct AlertAggregator<T: KeyValueStore> {
    /// Decides which qualifying alerts are actually surfaced today.
    throttler: Arc<AlertThrottler<T>>,
}

impl<T: KeyValueStore> AlertAggregator<T> {
    /// Creates an aggregator over the given throttler.
    pub fn new(throttler: Arc<AlertThrottler<T>>) -> Self {
        Self { throttler }
    }

    /// Produces the alert list and expiry counters for `today`.
    ///
    /// Counters cover every warning/expired document regardless of
    /// throttling, so they reflect true current state independent of alert
    /// fatigue. The alert list keeps company-then-kind traversal order; no
    /// urgency sorting is applied. Companies without a usable termination
    /// date are skipped silently.
    ///
    /// This method never records an exposure. Marking alerts as shown is the
    /// consumer's responsibility at the moment of actual display, so that
    /// computing a report does not by itself start a cooldown.
    pub async fn aggregate(&self, companies: &[Company], today: NaiveDate) -> AlertReport {
        let mut alerts = Vec::new();
        let mut counts = AlertCounts::default();

        for company in companies {
            let Some(termination) = company.termination_date.as_deref() else {
                continue;
            };

            for kind in DocumentKind::ALL {
                if !company.documents.has(kind) {
                    continue;
                }

                let classification = classifier::classify(Some(termination), today);
                let days_remaining = match classification {
                    Classification { status: DocStatus::Warning, days_remaining: Some(days) } => {
                        counts.warning += 1;
                        days
                    }
                    Classification { status: DocStatus::Expired, days_remaining: Some(days) } => {
                        counts.expired += 1;
                        days
                    }
                    // On-time and unreadable dates generate no alert and no
                    // throttle query.
                    _ => continue,
                };

                let key = AlertKey::new(&company.id, kind);
                let eligible = match self.throttler.should_show(&key, today).await {
                    Ok(eligible) => eligible,
                    Err(e) => {
                        tracing::error!(
                            key = %key,
                            error = %e,
                            "Failed to read throttle state, failing open."
                        );
                        true
                    }
                };
                if !eligible {
                    continue;
                }

                alerts.push(AlertEntry {
                    key,
                    company_name: company.name.clone(),
                    kind,
                    status: classification.status,
                    label: classification.status.label().to_string(),
                    days_remaining,
                });
            }
        }

        tracing::debug!(
            alerts = alerts.len(),
            warning = counts.warning,
            expired = counts.expired,
            "Aggregated expiry alerts."
        );
        AlertReport { alerts, counts }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        persistence::{error::PersistenceError, traits::MockKeyValueStore},
        test_helpers::CompanyBuilder,
    };

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn iso(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    fn create_aggregator(state_repo: MockKeyValueStore) -> AlertAggregator<MockKeyValueStore> {
        AlertAggregator::new(Arc::new(AlertThrottler::new(Arc::new(state_repo))))
    }

    #[tokio::test]
    async fn test_warning_document_produces_alert_and_count() {
        let today = day(2026, 3, 2);
        let companies = vec![CompanyBuilder::new("c1", "Acme")
            .termination_date(&iso(today + Duration::days(5)))
            .document(DocumentKind::Pcmso, 2026)
            .build()];

        let mut state_repo = MockKeyValueStore::new();
        state_repo.expect_get_json_state::<String>().times(1).returning(|_| Ok(None));

        let report = create_aggregator(state_repo).aggregate(&companies, today).await;

        assert_eq!(report.counts, AlertCounts { warning: 1, expired: 0 });
        assert_eq!(report.alerts.len(), 1);
        let alert = &report.alerts[0];
        assert_eq!(alert.key.to_string(), "c1_pcmso");
        assert_eq!(alert.status, DocStatus::Warning);
        assert_eq!(alert.days_remaining, 5);
        assert_eq!(alert.company_name, "Acme");
    }

    #[tokio::test]
    async fn test_suppressed_alert_still_counts() {
        let today = day(2026, 3, 2);
        let companies = vec![CompanyBuilder::new("c2", "Beta")
            .termination_date(&iso(today - Duration::days(10)))
            .document(DocumentKind::Ltcat, 2025)
            .build()];

        // Shown yesterday, so the cooldown suppresses the entry.
        let mut state_repo = MockKeyValueStore::new();
        state_repo
            .expect_get_json_state::<String>()
            .times(1)
            .returning(|_| Ok(Some("2026-03-01".to_string())));

        let report = create_aggregator(state_repo).aggregate(&companies, today).await;

        assert!(report.alerts.is_empty());
        assert_eq!(report.counts, AlertCounts { warning: 0, expired: 1 });
    }

    #[tokio::test]
    async fn test_on_time_documents_skip_the_throttler() {
        let today = day(2026, 3, 2);
        let companies = vec![CompanyBuilder::new("c3", "Gamma")
            .termination_date(&iso(today + Duration::days(200)))
            .document(DocumentKind::Pgr, 2026)
            .build()];

        // No expectations registered: any throttle query would panic.
        let state_repo = MockKeyValueStore::new();
        let report = create_aggregator(state_repo).aggregate(&companies, today).await;

        assert!(report.alerts.is_empty());
        assert_eq!(report.counts, AlertCounts::default());
    }

    #[tokio::test]
    async fn test_missing_and_malformed_dates_are_skipped() {
        let today = day(2026, 3, 2);
        let companies = vec![
            CompanyBuilder::new("c4", "NoDate").document(DocumentKind::Pcmso, 2026).build(),
            CompanyBuilder::new("c5", "BadDate")
                .termination_date("soon")
                .document(DocumentKind::Pcmso, 2026)
                .build(),
        ];

        let state_repo = MockKeyValueStore::new();
        let report = create_aggregator(state_repo).aggregate(&companies, today).await;

        assert!(report.alerts.is_empty());
        assert_eq!(report.counts, AlertCounts::default());
    }

    #[tokio::test]
    async fn test_documentless_slots_produce_nothing() {
        let today = day(2026, 3, 2);
        let companies = vec![CompanyBuilder::new("c6", "Empty")
            .termination_date(&iso(today + Duration::days(5)))
            .build()];

        let state_repo = MockKeyValueStore::new();
        let report = create_aggregator(state_repo).aggregate(&companies, today).await;

        assert!(report.alerts.is_empty());
        assert_eq!(report.counts, AlertCounts::default());
    }

    #[tokio::test]
    async fn test_alerts_keep_company_then_kind_order() {
        let today = day(2026, 3, 2);
        let term = iso(today + Duration::days(30));
        let companies = vec![
            CompanyBuilder::new("c7", "First")
                .termination_date(&term)
                .document(DocumentKind::Ltcat, 2026)
                .document(DocumentKind::Pgr, 2026)
                .build(),
            CompanyBuilder::new("c8", "Second")
                .termination_date(&term)
                .document(DocumentKind::Pcmso, 2026)
                .build(),
        ];

        let mut state_repo = MockKeyValueStore::new();
        state_repo.expect_get_json_state::<String>().times(3).returning(|_| Ok(None));

        let report = create_aggregator(state_repo).aggregate(&companies, today).await;

        let keys: Vec<String> = report.alerts.iter().map(|a| a.key.to_string()).collect();
        assert_eq!(keys, vec!["c7_ltcat", "c7_pgr", "c8_pcmso"]);
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent_without_exposures() {
        let today = day(2026, 3, 2);
        let companies = vec![CompanyBuilder::new("c9", "Stable")
            .termination_date(&iso(today + Duration::days(40)))
            .document(DocumentKind::Pcmso, 2026)
            .build()];

        let mut state_repo = MockKeyValueStore::new();
        state_repo.expect_get_json_state::<String>().times(2).returning(|_| Ok(None));

        let aggregator = create_aggregator(state_repo);
        let first = aggregator.aggregate(&companies, today).await;
        let second = aggregator.aggregate(&companies, today).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_throttle_storage_error_fails_open() {
        let today = day(2026, 3, 2);
        let companies = vec![CompanyBuilder::new("c10", "Flaky")
            .termination_date(&iso(today + Duration::days(5)))
            .document(DocumentKind::Pcmso, 2026)
            .build()];

        let mut state_repo = MockKeyValueStore::new();
        state_repo
            .expect_get_json_state::<String>()
            .times(1)
            .returning(|_| Err(PersistenceError::OperationFailed("no disk".to_string())));

        let report = create_aggregator(state_repo).aggregate(&companies, today).await;

        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.counts.warning, 1);
    }
}
