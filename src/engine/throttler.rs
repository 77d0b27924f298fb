//! Alert display throttling backed by the application state store.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::{
    models::AlertKey,
    persistence::{error::PersistenceError, traits::KeyValueStore},
};

/// Minimum whole days that must elapse before an already-surfaced alert may
/// be shown again.
///
/// A single stored sample per key approximates "at most twice per week"
/// without tracking a rolling history. That is deliberate: this is a
/// sliding-window-of-one-sample throttle, not a rate counter.
pub const COOLDOWN_DAYS: i64 = 3;

const STATE_KEY_PREFIX: &str = "alert_shown:";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decides, per alert key, whether an alert may be surfaced today, and
/// records exposures to suppress re-surfacing within the cooldown window.
///
/// One state row per key, overwritten on every exposure and never deleted;
/// the key universe is bounded by companies times document kinds. No other
/// component touches these rows.
pub struct AlertThrottler<T: KeyValueStore> {
    /// The state repository holding last-shown dates.
    state_repository: Arc<T>,

    /// Per-key locks so concurrent tasks cannot interleave the read and the
    /// overwrite of the same key's record.
    key_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<T: KeyValueStore> AlertThrottler<T> {
    /// Creates a new throttler over the given state repository.
    pub fn new(state_repository: Arc<T>) -> Self {
        Self { state_repository, key_locks: DashMap::new() }
    }

    /// The state row key for an alert key: `alert_shown:<companyId>_<kind>`.
    fn state_key(key: &AlertKey) -> String {
        format!("{STATE_KEY_PREFIX}{key}")
    }

    /// Gets or creates the lock for a specific state key.
    fn get_key_lock(&self, state_key: &str) -> Arc<Mutex<()>> {
        self.key_locks
            .entry(state_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Returns whether the alert for `key` may be shown on `today`.
    ///
    /// True when the key has never been recorded, and true when the stored
    /// date does not parse: unreadable state must never permanently suppress
    /// an alert. Storage failures surface as `Err` so the caller can apply
    /// its own fail-open policy.
    pub async fn should_show(
        &self,
        key: &AlertKey,
        today: NaiveDate,
    ) -> Result<bool, PersistenceError> {
        let state_key = Self::state_key(key);
        let lock = self.get_key_lock(&state_key);
        let _guard = lock.lock().await;

        let Some(raw) = self.state_repository.get_json_state::<String>(&state_key).await? else {
            return Ok(true);
        };

        match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
            Ok(last_shown) => Ok((today - last_shown).num_days() >= COOLDOWN_DAYS),
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    stored = %raw,
                    error = %e,
                    "Unreadable last-shown date, failing open."
                );
                Ok(true)
            }
        }
    }

    /// Records that the alert for `key` was presented on `today`.
    ///
    /// Unconditionally overwrites the stored date; repeated calls on the
    /// same day have no effect beyond the overwrite.
    pub async fn record_shown(
        &self,
        key: &AlertKey,
        today: NaiveDate,
    ) -> Result<(), PersistenceError> {
        let state_key = Self::state_key(key);
        let lock = self.get_key_lock(&state_key);
        let _guard = lock.lock().await;

        let date = today.format(DATE_FORMAT).to_string();
        tracing::debug!(key = %key, date = %date, "Recording alert exposure.");
        self.state_repository.set_json_state(&state_key, &date).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mockall::predicate::eq;

    use super::*;
    use crate::{models::DocumentKind, persistence::traits::MockKeyValueStore};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_key() -> AlertKey {
        AlertKey::new("comp_1", DocumentKind::Pcmso)
    }

    #[tokio::test]
    async fn test_should_show_without_prior_record() {
        let mut state_repo = MockKeyValueStore::new();
        state_repo
            .expect_get_json_state::<String>()
            .with(eq("alert_shown:comp_1_pcmso".to_string()))
            .times(1)
            .returning(|_| Ok(None));

        let throttler = AlertThrottler::new(Arc::new(state_repo));
        let eligible = throttler.should_show(&test_key(), day(2026, 3, 2)).await.unwrap();
        assert!(eligible);
    }

    #[tokio::test]
    async fn test_cooldown_window_boundaries() {
        let shown_on = day(2026, 3, 2);

        for (offset, expected) in [(0, false), (1, false), (2, false), (3, true), (4, true)] {
            let mut state_repo = MockKeyValueStore::new();
            state_repo
                .expect_get_json_state::<String>()
                .times(1)
                .returning(|_| Ok(Some("2026-03-02".to_string())));

            let throttler = AlertThrottler::new(Arc::new(state_repo));
            let today = shown_on + Duration::days(offset);
            let eligible = throttler.should_show(&test_key(), today).await.unwrap();
            assert_eq!(eligible, expected, "offset {offset}");
        }
    }

    #[tokio::test]
    async fn test_malformed_stored_date_fails_open() {
        let mut state_repo = MockKeyValueStore::new();
        state_repo
            .expect_get_json_state::<String>()
            .times(1)
            .returning(|_| Ok(Some("02/03/2026".to_string())));

        let throttler = AlertThrottler::new(Arc::new(state_repo));
        let eligible = throttler.should_show(&test_key(), day(2026, 3, 2)).await.unwrap();
        assert!(eligible);
    }

    #[tokio::test]
    async fn test_storage_error_is_surfaced() {
        let mut state_repo = MockKeyValueStore::new();
        state_repo
            .expect_get_json_state::<String>()
            .times(1)
            .returning(|_| Err(PersistenceError::OperationFailed("disk gone".to_string())));

        let throttler = AlertThrottler::new(Arc::new(state_repo));
        let result = throttler.should_show(&test_key(), day(2026, 3, 2)).await;
        assert!(matches!(result, Err(PersistenceError::OperationFailed(_))));
    }

    #[tokio::test]
    async fn test_record_shown_overwrites_with_today() {
        let mut state_repo = MockKeyValueStore::new();
        state_repo
            .expect_set_json_state::<String>()
            .withf(|key, date| key == "alert_shown:comp_1_pcmso" && date == "2026-03-02")
            .times(1)
            .returning(|_, _| Ok(()));

        let throttler = AlertThrottler::new(Arc::new(state_repo));
        throttler.record_shown(&test_key(), day(2026, 3, 2)).await.unwrap();
    }
}
