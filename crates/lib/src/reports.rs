//! # Sentiment Reports
//!
//! Reports are only written by the aggregator and never changed afterwards.
//! The collection is kept newest first.

use crate::{errors::StoreError, store::Store, types::SentimentReport};

/// All reports, newest first, optionally restricted to the given user ids.
pub async fn list(store: &Store, user_ids: &[String]) -> Result<Vec<SentimentReport>, StoreError> {
    let db = store.snapshot().await?;
    if user_ids.is_empty() {
        return Ok(db.reports);
    }
    Ok(db
        .reports
        .into_iter()
        .filter(|r| user_ids.contains(&r.user_id))
        .collect())
}

/// Prepends a freshly generated report and persists it.
pub async fn record(store: &Store, report: SentimentReport) -> Result<(), StoreError> {
    store
        .transaction(move |db| {
            db.reports.insert(0, report);
            Ok(())
        })
        .await
}
