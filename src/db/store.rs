use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::config::SIGNAL_TTL_HOURS;
use crate::error::Result;
use crate::types::SignalRow;

/// Sink for ranked signals. Rows are unique per `token_address`.
#[async_trait]
pub trait SignalStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Insert the row, or overwrite every column of the existing row with
    /// the same token address.
    async fn upsert(&self, row: &SignalRow) -> Result<()>;

    /// Remove rows whose `updated_at` is strictly before `cutoff`.
    /// Returns how many rows were removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn count(&self) -> Result<u64>;

    /// Every stored signal, strongest 24h move first.
    async fn list(&self) -> Result<Vec<SignalRow>>;
}

/// Oldest `updated_at` a signal may have and still be kept.
pub fn stale_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(SIGNAL_TTL_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_two_days_back() {
        let now = Utc::now();
        assert_eq!(now - stale_cutoff(now), Duration::hours(48));
    }
}
