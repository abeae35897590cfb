// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trail-run filter and importer.
//!
//! Handles the front-end half of a sync:
//! 1. Fetch activities through the relay
//! 2. Keep running sports only
//! 3. Skip days that already have a run
//! 4. Save the rest as trail runs
//!
//! Deduplication is by calendar day only, so two genuine runs on the same
//! day cannot both be imported.

use serde::Serialize;
use std::collections::HashSet;

use crate::db::LocalDb;
use crate::error::ClientError;
use crate::ids;
use crate::models::{Activity, NewTrailRun, TrailRun};
use crate::services::RelayClient;
use crate::time_utils::truncate_to_day;

/// Counts and per-activity errors of one import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub imported: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

/// Convert an activity to trail-run data: day precision, km, meters of gain.
pub fn to_trail_run_data(activity: &Activity) -> Result<NewTrailRun, ClientError> {
    let date = truncate_to_day(&activity.date).ok_or_else(|| {
        ClientError::InvalidResponse(format!("unparseable date {:?}", activity.date))
    })?;

    Ok(NewTrailRun {
        date,
        distance_km: activity.distance_meters.unwrap_or(0.0) / 1000.0,
        elevation_gain_m: activity.ascent_meters.unwrap_or(0.0),
    })
}

/// Imports synced activities into the run store.
#[derive(Clone)]
pub struct TrailRunImporter {
    db: LocalDb,
}

impl TrailRunImporter {
    pub fn new(db: LocalDb) -> Self {
        Self { db }
    }

    /// Import `activities`. Only reading the existing runs can fail the
    /// whole import; a failure on one activity lands in `errors`.
    pub async fn import(&self, activities: &[Activity]) -> Result<SyncResult, ClientError> {
        let existing = self.db.list_runs().await?;
        let mut known_days: HashSet<_> = existing.iter().map(|r| r.date).collect();
        let mut result = SyncResult::default();

        for activity in activities {
            if !activity.is_trail_run() {
                result.skipped += 1;
                continue;
            }

            match self.import_one(activity, &known_days).await {
                Ok(Some(run)) => {
                    known_days.insert(run.date);
                    result.imported += 1;
                }
                Ok(None) => result.skipped += 1,
                Err(e) => {
                    tracing::warn!(activity_id = %activity.id, error = %e, "Import failed");
                    result
                        .errors
                        .push(format!("Failed to import activity {}: {}", activity.id, e));
                }
            }
        }

        tracing::info!(
            imported = result.imported,
            skipped = result.skipped,
            errors = result.errors.len(),
            "Trail run import complete"
        );
        Ok(result)
    }

    async fn import_one(
        &self,
        activity: &Activity,
        known_days: &HashSet<chrono::NaiveDate>,
    ) -> Result<Option<TrailRun>, ClientError> {
        let data = to_trail_run_data(activity)?;
        if known_days.contains(&data.date) {
            return Ok(None);
        }

        let id = ids::run_id().map_err(|_| ClientError::Random)?;
        let run = TrailRun::from_new(id, data);
        self.db.save_run(&run).await?;
        Ok(Some(run))
    }
}

/// Sync use case: stored credentials → relay → importer.
pub struct SyncTrailRuns {
    relay: RelayClient,
    db: LocalDb,
}

impl SyncTrailRuns {
    pub fn new(relay: RelayClient, db: LocalDb) -> Self {
        Self { relay, db }
    }

    /// Run one sync. Never fails: a failure before the import loop is
    /// reported as a single `Sync failed` entry in `errors`.
    pub async fn execute(&self) -> SyncResult {
        match self.try_execute().await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                SyncResult {
                    errors: vec![format!("Sync failed: {}", e)],
                    ..SyncResult::default()
                }
            }
        }
    }

    async fn try_execute(&self) -> Result<SyncResult, ClientError> {
        let credentials = self
            .db
            .get_credentials()
            .await?
            .ok_or(ClientError::NotConfigured)?;
        let (access_token, user_id) = credentials
            .linked_account()
            .ok_or(ClientError::NotConfigured)?;

        let activities = self.relay.fetch_activities(access_token, user_id).await?;
        TrailRunImporter::new(self.db.clone())
            .import(&activities)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn activity(id: &str, date: &str, sport: &str) -> Activity {
        Activity {
            id: id.to_string(),
            date: date.to_string(),
            sport: sport.to_string(),
            distance_meters: Some(12_500.0),
            ascent_meters: None,
            duration: None,
        }
    }

    #[test]
    fn test_to_trail_run_data() {
        let data = to_trail_run_data(&activity("e1", "2024-05-01T08:00:00Z", "RUNNING")).unwrap();
        assert_eq!(data.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(data.distance_km, 12.5);
        assert_eq!(data.elevation_gain_m, 0.0);
    }

    #[tokio::test]
    async fn test_import_twice_stores_once() {
        let db = LocalDb::new_mock();
        let importer = TrailRunImporter::new(db.clone());
        let batch = [activity("e1", "2024-05-01T08:00:00Z", "RUNNING")];

        let first = importer.import(&batch).await.unwrap();
        assert_eq!((first.imported, first.skipped), (1, 0));

        let second = importer.import(&batch).await.unwrap();
        assert_eq!((second.imported, second.skipped), (0, 1));
        assert_eq!(db.list_runs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_running_skipped_and_bad_dates_collected() {
        let db = LocalDb::new_mock();
        let importer = TrailRunImporter::new(db.clone());
        let batch = [
            activity("bike", "2024-05-02T08:00:00Z", "CYCLING"),
            activity("bad", "not-a-date", "TRAIL_RUNNING"),
            activity("ok", "2024-05-03T07:00:00Z", "trail_running"),
        ];

        let result = importer.import(&batch).await.unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Failed to import activity bad"));
    }

    #[tokio::test]
    async fn test_same_day_in_one_batch_imports_once() {
        let db = LocalDb::new_mock();
        let importer = TrailRunImporter::new(db.clone());
        let batch = [
            activity("am", "2024-05-01T06:00:00Z", "RUNNING"),
            activity("pm", "2024-05-01T18:00:00Z", "RUNNING"),
        ];

        let result = importer.import(&batch).await.unwrap();
        assert_eq!((result.imported, result.skipped), (1, 1));
    }
}
